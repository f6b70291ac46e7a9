//! Background execution context for expensive, blocking operations.
//!
//! The foreground holds a [`WorkerApi`]; every call is multiplexed over a
//! single channel to a background context started with [`spawn_background`]:
//! - [`WorkerApi::decode_body`]: Undo HTTP content codings, transferring the encoded body
//! - [`WorkerApi::test_encodings`]: Report the body size under each known coding
//! - [`WorkerApi::build_api_metadata`]: Normalize an OpenAPI document
//!
//! Failures inside the background context come back as
//! [`courier_rpc::Error::Remote`] with the original error name and message.

#![warn(missing_docs)]

pub mod api;
pub mod api_metadata;
pub mod codec;
pub mod context;
pub mod handler;
pub mod protocol;
mod spawn;

pub use api::{DecodedBody, WorkerApi};
pub use api_metadata::{ApiError, ApiMetadata, OperationMetadata, PathMatcher};
pub use codec::{CodecError, Encoding};
pub use context::{BackgroundHandle, serve, spawn_background};
pub use protocol::{BackgroundRequest, BackgroundResult};

use courier_rpc::SerializedError;

/// Failures inside the background context.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
	/// A content coding failed.
	#[error(transparent)]
	Codec(#[from] CodecError),
	/// The API document could not be normalized.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// The handler task panicked or was cancelled.
	#[error("background task failed: {0}")]
	Task(String),
}

impl WorkerError {
	/// Error class name carried across the boundary.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Codec(CodecError::UnsupportedEncoding(_)) => "UnsupportedEncoding",
			Self::Codec(CodecError::Corrupt { .. }) => "CorruptInput",
			Self::Codec(CodecError::Encode { .. }) => "EncodeFailed",
			Self::Api(ApiError::InvalidSpec(_)) => "InvalidSpec",
			Self::Api(ApiError::InvalidPath { .. }) => "InvalidPath",
			Self::Task(_) => "TaskFailed",
		}
	}

	/// Serializes the error for the trip back to the foreground.
	pub fn to_serialized(&self) -> SerializedError {
		let serialized = SerializedError::from_error(self.name(), self);
		match self {
			Self::Codec(CodecError::Corrupt { encoding, .. } | CodecError::Encode { encoding, .. }) => {
				serialized.with_field("encoding", *encoding)
			}
			Self::Codec(CodecError::UnsupportedEncoding(name)) => serialized.with_field("encoding", name.as_str()),
			Self::Api(ApiError::InvalidPath { path, .. }) => serialized.with_field("path", path.as_str()),
			Self::Api(ApiError::InvalidSpec(_)) | Self::Task(_) => serialized,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serialized_error_keeps_cause_and_fields() {
		let err = WorkerError::from(Encoding::Gzip.decode(b"nope").unwrap_err());
		let serialized = err.to_serialized();

		assert_eq!(serialized.name, "CorruptInput");
		assert_eq!(serialized.message, "corrupt gzip data");
		assert!(serialized.stack.as_deref().is_some_and(|s| s.starts_with("caused by: ")));
		assert_eq!(serialized.extra.get("encoding"), Some(&serde_json::json!("gzip")));
	}
}
