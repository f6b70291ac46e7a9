//! Errors surfaced by the editor wrapper.

use thiserror::Error;

/// Failure to make the editor widget available.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
	/// The widget loader reported a failure.
	#[error("widget load failed: {0}")]
	Failed(String),

	/// Rendering was attempted before the widget was loaded.
	#[error("editor failed to load")]
	NotLoaded,
}
