//! Request dispatch inside the background context.

use crate::WorkerError;
use crate::api_metadata::build_api_metadata;
use crate::codec::{decode, encoding_sizes};
use crate::protocol::{BackgroundRequest, BackgroundResult};

/// Handles one request synchronously. Runs on a blocking thread.
pub fn handle(request: BackgroundRequest) -> Result<BackgroundResult, WorkerError> {
	match request {
		BackgroundRequest::Decode { buffer, encodings } => {
			let decoded = decode(&buffer, &encodings)?;
			Ok(BackgroundResult::Decode {
				input_buffer: buffer,
				decoded_buffer: decoded.into(),
			})
		}
		BackgroundRequest::TestEncodings { decoded_buffer } => Ok(BackgroundResult::TestEncodings {
			encoding_sizes: encoding_sizes(&decoded_buffer)?,
		}),
		BackgroundRequest::BuildApi { spec } => Ok(BackgroundResult::BuildApi {
			api: build_api_metadata(&spec)?,
		}),
	}
}

#[cfg(test)]
mod tests {
	use bytes::Bytes;
	use serde_json::json;

	use super::*;
	use crate::codec::Encoding;

	#[test]
	fn decode_hands_back_the_input() {
		let gz = Bytes::from(Encoding::Gzip.encode(b"payload").unwrap());
		let result = handle(BackgroundRequest::Decode {
			buffer: gz.clone(),
			encodings: vec!["gzip".into()],
		})
		.unwrap();

		match result {
			BackgroundResult::Decode {
				input_buffer,
				decoded_buffer,
			} => {
				assert_eq!(input_buffer, gz);
				assert_eq!(&decoded_buffer[..], b"payload");
			}
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn failures_carry_their_error_name() {
		let err = handle(BackgroundRequest::Decode {
			buffer: Bytes::from_static(b"abc"),
			encodings: vec!["zstd".into()],
		})
		.unwrap_err();
		assert_eq!(err.name(), "UnsupportedEncoding");

		let err = handle(BackgroundRequest::BuildApi { spec: json!(null) }).unwrap_err();
		assert_eq!(err.name(), "InvalidSpec");
	}
}
