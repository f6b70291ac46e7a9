//! Error identity across the context boundary.
//!
//! Native error values cannot cross the boundary, so the producing side
//! flattens them into a [`SerializedError`] and the consuming side rebuilds a
//! [`RemoteError`] carrying the same name, message and stack.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Serialized form of an error: `{ name, message, stack, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedError {
	/// Error class name, e.g. `"UnsupportedEncoding"`.
	pub name: String,
	/// Human-readable message.
	pub message: String,
	/// Producer-side trace, if any.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stack: Option<String>,
	/// Any additional fields the producer attached.
	#[serde(flatten)]
	pub extra: Map<String, JsonValue>,
}

impl SerializedError {
	/// Creates a serialized error without a stack.
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
			stack: None,
			extra: Map::new(),
		}
	}

	/// Serializes an error value, recording its `source()` chain as the stack.
	pub fn from_error(name: impl Into<String>, error: &(dyn std::error::Error + 'static)) -> Self {
		let mut stack = String::new();
		let mut source = error.source();
		while let Some(cause) = source {
			if !stack.is_empty() {
				stack.push('\n');
			}
			stack.push_str("caused by: ");
			stack.push_str(&cause.to_string());
			source = cause.source();
		}

		Self {
			name: name.into(),
			message: error.to_string(),
			stack: (!stack.is_empty()).then_some(stack),
			extra: Map::new(),
		}
	}

	/// Sets the stack.
	#[must_use]
	pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
		self.stack = Some(stack.into());
		self
	}

	/// Attaches an additional field.
	#[must_use]
	pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.extra.insert(key.into(), value.into());
		self
	}
}

/// Error reconstructed on the consuming side of the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError {
	name: String,
	message: String,
	stack: Option<String>,
	extra: Map<String, JsonValue>,
}

impl RemoteError {
	/// Error class name from the producing side.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Message from the producing side.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Producer-side trace, if one was sent.
	pub fn stack(&self) -> Option<&str> {
		self.stack.as_deref()
	}

	/// Looks up an additional field.
	pub fn field(&self, key: &str) -> Option<&JsonValue> {
		self.extra.get(key)
	}
}

impl From<SerializedError> for RemoteError {
	fn from(err: SerializedError) -> Self {
		Self {
			name: err.name,
			message: err.message,
			stack: err.stack,
			extra: err.extra,
		}
	}
}

impl fmt::Display for RemoteError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.name, self.message)
	}
}

impl std::error::Error for RemoteError {}
