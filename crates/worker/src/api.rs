//! Typed calls into the background context.

use std::collections::BTreeMap;

use courier_rpc::{ClientSocket, Error, Result, TransferableBuffer};
use serde_json::Value as JsonValue;

use crate::api_metadata::ApiMetadata;
use crate::protocol::{BackgroundRequest, BackgroundResult};

/// Encoded and decoded forms of a body, tracked independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBody {
	/// The body as received.
	pub encoded: TransferableBuffer,
	/// The body with all content codings removed.
	pub decoded: TransferableBuffer,
}

/// Typed facade over the request multiplexer.
#[derive(Debug, Clone)]
pub struct WorkerApi {
	socket: ClientSocket<BackgroundRequest, BackgroundResult>,
}

impl WorkerApi {
	/// Wraps a socket connected to a background context.
	pub fn new(socket: ClientSocket<BackgroundRequest, BackgroundResult>) -> Self {
		Self { socket }
	}

	/// Decodes a body in the background context.
	///
	/// With no encodings, or only `identity`, the buffer is returned as both
	/// forms without crossing the boundary. Otherwise the encoded bytes are
	/// transferred: `buffer` is left detached and the result holds fresh
	/// buffers for both forms.
	///
	/// # Errors
	///
	/// - [`Error::Detached`] if `buffer` was already transferred.
	/// - [`Error::Remote`] if decoding failed in the background context.
	/// - [`Error::ServiceStopped`] if the background context is gone.
	pub async fn decode_body<S: AsRef<str>>(&self, buffer: &mut TransferableBuffer, encodings: &[S]) -> Result<DecodedBody> {
		if buffer.is_detached() {
			return Err(Error::Detached);
		}

		let trivial = match encodings {
			[] => true,
			[only] => only.as_ref() == "identity",
			_ => false,
		};
		if trivial {
			return Ok(DecodedBody {
				encoded: buffer.clone(),
				decoded: buffer.clone(),
			});
		}

		let request = BackgroundRequest::Decode {
			buffer: buffer.transfer()?,
			encodings: encodings.iter().map(|e| e.as_ref().to_string()).collect(),
		};
		match self.socket.call(request).await? {
			BackgroundResult::Decode {
				input_buffer,
				decoded_buffer,
			} => Ok(DecodedBody {
				encoded: input_buffer.into(),
				decoded: decoded_buffer.into(),
			}),
			other => Err(unexpected("decode", &other)),
		}
	}

	/// Reports the size of `buffer` under each encoding the background knows.
	///
	/// The buffer is shared rather than transferred and stays readable.
	///
	/// # Errors
	///
	/// As [`Self::decode_body`].
	pub async fn test_encodings(&self, buffer: &TransferableBuffer) -> Result<BTreeMap<String, usize>> {
		let request = BackgroundRequest::TestEncodings {
			decoded_buffer: buffer.share()?,
		};
		match self.socket.call(request).await? {
			BackgroundResult::TestEncodings { encoding_sizes } => Ok(encoding_sizes),
			other => Err(unexpected("test-encodings", &other)),
		}
	}

	/// Parses an OpenAPI document into normalized metadata.
	///
	/// # Errors
	///
	/// - [`Error::Remote`] if the document is invalid.
	/// - [`Error::ServiceStopped`] if the background context is gone.
	pub async fn build_api_metadata(&self, spec: JsonValue) -> Result<ApiMetadata> {
		match self.socket.call(BackgroundRequest::BuildApi { spec }).await? {
			BackgroundResult::BuildApi { api } => Ok(api),
			other => Err(unexpected("build-api", &other)),
		}
	}
}

fn unexpected(kind: &str, result: &BackgroundResult) -> Error {
	let got = match result {
		BackgroundResult::Decode { .. } => "decode",
		BackgroundResult::TestEncodings { .. } => "test-encodings",
		BackgroundResult::BuildApi { .. } => "build-api",
	};
	Error::Protocol(format!("expected a {kind} result, got {got}"))
}
