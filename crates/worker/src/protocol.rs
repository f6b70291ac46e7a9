//! Request and result shapes understood by the background context.

use std::collections::BTreeMap;

use bytes::Bytes;
use courier_rpc::Payload;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::api_metadata::ApiMetadata;

/// A request handled by the background context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackgroundRequest {
	/// Undo the given content encodings.
	Decode {
		/// Encoded bytes, owned by the background once sent.
		buffer: Bytes,
		/// Content encodings in the order they were applied.
		encodings: Vec<String>,
	},
	/// Report the size of the buffer under each known encoding.
	#[serde(rename_all = "camelCase")]
	TestEncodings {
		/// Decoded bytes to measure.
		decoded_buffer: Bytes,
	},
	/// Parse an OpenAPI document into normalized metadata.
	BuildApi {
		/// The OpenAPI document.
		spec: JsonValue,
	},
}

impl Payload for BackgroundRequest {
	fn kind(&self) -> &'static str {
		match self {
			Self::Decode { .. } => "decode",
			Self::TestEncodings { .. } => "test-encodings",
			Self::BuildApi { .. } => "build-api",
		}
	}

	fn transferred_len(&self) -> usize {
		match self {
			Self::Decode { buffer, .. } => buffer.len(),
			Self::TestEncodings { .. } | Self::BuildApi { .. } => 0,
		}
	}
}

/// A result produced by the background context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackgroundResult {
	/// Result of [`BackgroundRequest::Decode`].
	#[serde(rename_all = "camelCase")]
	Decode {
		/// The original bytes, handed back since the request consumed them.
		input_buffer: Bytes,
		/// The decoded bytes.
		decoded_buffer: Bytes,
	},
	/// Result of [`BackgroundRequest::TestEncodings`].
	#[serde(rename_all = "camelCase")]
	TestEncodings {
		/// Encoded size in bytes, keyed by encoding name.
		encoding_sizes: BTreeMap<String, usize>,
	},
	/// Result of [`BackgroundRequest::BuildApi`].
	BuildApi {
		/// The normalized API metadata.
		api: ApiMetadata,
	},
}
