//! Lazy widget loading and the host that renders it.

use std::sync::Arc;
use std::time::Duration;

use courier_config::EditorConfig;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::options::EditorOptions;

/// Loads the widget module.
#[async_trait::async_trait]
pub trait WidgetLoader: Send + Sync {
	type Widget: Send + Sync + 'static;

	async fn load(&self) -> Result<Self::Widget, LoadError>;
}

/// Receives errors the host cannot surface itself.
pub trait ErrorReporter: Send + Sync {
	fn report(&self, error: &LoadError);
}

/// Retry bounds for [`EditorLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadPolicy {
	/// Retries after the first failed attempt of the first load.
	pub retries: u32,
	/// Delay before the first attempt. Retries follow immediately.
	pub delay: Duration,
}

impl Default for LoadPolicy {
	fn default() -> Self {
		Self::from_config(&EditorConfig::default())
	}
}

impl LoadPolicy {
	pub fn from_config(config: &EditorConfig) -> Self {
		Self {
			retries: config.load_retries,
			delay: config.load_delay(),
		}
	}
}

/// Loads the widget once, with bounded retries, and caches it.
pub struct EditorLoader<L: WidgetLoader> {
	loader: L,
	policy: LoadPolicy,
	widget: Mutex<Option<Arc<L::Widget>>>,
	/// Serializes loads; holds whether the last load gave up.
	gate: tokio::sync::Mutex<bool>,
}

impl<L: WidgetLoader> EditorLoader<L> {
	pub fn new(loader: L, policy: LoadPolicy) -> Self {
		Self {
			loader,
			policy,
			widget: Mutex::new(None),
			gate: tokio::sync::Mutex::new(false),
		}
	}

	/// The widget, if loaded.
	pub fn loaded(&self) -> Option<Arc<L::Widget>> {
		self.widget.lock().clone()
	}

	/// Loads the widget unless already loaded.
	///
	/// The first load waits for the policy delay, then makes one attempt plus
	/// up to `policy.retries` immediate retries. Once that has failed, each
	/// later call makes a single attempt.
	///
	/// # Errors
	///
	/// Returns the last attempt's error when every attempt failed.
	pub async fn ensure_loaded(&self) -> Result<Arc<L::Widget>, LoadError> {
		let mut failed_before = self.gate.lock().await;
		if let Some(widget) = self.loaded() {
			return Ok(widget);
		}

		let attempts = if *failed_before {
			1
		} else {
			tokio::time::sleep(self.policy.delay).await;
			self.policy.retries.saturating_add(1)
		};
		let mut attempt = 1;
		loop {
			match self.loader.load().await {
				Ok(widget) => {
					let widget = Arc::new(widget);
					*self.widget.lock() = Some(Arc::clone(&widget));
					*failed_before = false;
					debug!(attempt, "editor.load.ok");
					return Ok(widget);
				}
				Err(e) => {
					warn!(attempt, attempts, error = %e, "editor.load.retry");
					if attempt >= attempts {
						*failed_before = true;
						return Err(e);
					}
					attempt += 1;
				}
			}
		}
	}
}

/// A rendered editor frame.
#[derive(Debug)]
pub struct RenderedEditor<W> {
	pub widget: Arc<W>,
	pub options: EditorOptions,
	pub focus_wrapper: bool,
}

/// Renders the widget once it is available.
pub struct EditorHost<L: WidgetLoader> {
	loader: Arc<EditorLoader<L>>,
	reporter: Arc<dyn ErrorReporter>,
	options: EditorOptions,
}

impl<L: WidgetLoader> EditorHost<L> {
	pub fn new(loader: Arc<EditorLoader<L>>, reporter: Arc<dyn ErrorReporter>, options: EditorOptions) -> Self {
		Self {
			loader,
			reporter,
			options,
		}
	}

	/// Renders the editor, or nothing if the widget is unavailable.
	///
	/// A missing widget is reported as [`LoadError::NotLoaded`].
	pub fn render(&self) -> Option<RenderedEditor<L::Widget>> {
		let Some(widget) = self.loader.loaded() else {
			self.reporter.report(&LoadError::NotLoaded);
			return None;
		};
		Some(RenderedEditor {
			widget,
			options: self.options.clone(),
			focus_wrapper: self.options.needs_focus_wrapper(),
		})
	}
}
