//! Configuration for courier.
//!
//! Configuration is written in TOML. Every key is optional and falls back to
//! its default; unknown keys are rejected.
//!
//! ```toml
//! [worker]
//! thread-name = "courier-background"
//!
//! [editor]
//! line-height-px = 22
//! max-height-px = 560
//! resize-throttle-ms = 50
//! load-retries = 5
//! load-delay-ms = 100
//!
//! [log]
//! level = "info"
//! ```

pub mod error;

use std::path::Path;
use std::time::Duration;

pub use error::{ConfigError, Result};
use serde::Deserialize;

/// Parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Background context settings.
	pub worker: WorkerConfig,
	/// Editor wrapper settings.
	pub editor: EditorConfig,
	/// Logging settings.
	pub log: LogConfig,
}

/// `[worker]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct WorkerConfig {
	/// Name of the background context's OS thread.
	pub thread_name: String,
}

impl Default for WorkerConfig {
	fn default() -> Self {
		Self {
			thread_name: "courier-background".to_string(),
		}
	}
}

/// `[editor]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct EditorConfig {
	/// Height of one rendered line.
	pub line_height_px: u32,
	/// Upper bound for the editor height.
	pub max_height_px: u32,
	/// Relayout throttle window.
	pub resize_throttle_ms: u64,
	/// Retries after the first failed load attempt.
	pub load_retries: u32,
	/// Delay before the first load attempt. Retries are not delayed.
	pub load_delay_ms: u64,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			line_height_px: 22,
			max_height_px: 560,
			resize_throttle_ms: 50,
			load_retries: 5,
			load_delay_ms: 100,
		}
	}
}

impl EditorConfig {
	/// Relayout throttle window as a [`Duration`].
	pub fn resize_throttle(&self) -> Duration {
		Duration::from_millis(self.resize_throttle_ms)
	}

	/// Load delay as a [`Duration`].
	pub fn load_delay(&self) -> Duration {
		Duration::from_millis(self.load_delay_ms)
	}
}

/// `[log]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
	/// Maximum level emitted.
	pub level: LogLevel,
}

/// Log verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
	Error,
	Warn,
	#[default]
	Info,
	Debug,
	Trace,
}

impl Config {
	/// Parse a TOML string into a [`Config`].
	pub fn from_toml_str(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		Self::from_toml_str(&content)
	}
}
