//! Boundary message shapes and correlation IDs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::remote::SerializedError;
use crate::{Error, Result};

/// Correlation ID matching a response to its originating request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Simple counter-based ID generator.
///
/// IDs are handed out sequentially and never reused for the lifetime of the
/// generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterIdGen(pub u64);

impl CounterIdGen {
	/// Creates a new counter starting at 0.
	#[must_use]
	pub const fn new() -> Self {
		Self(0)
	}

	/// Generates the next unique ID and increments the counter.
	#[allow(clippy::should_implement_trait, reason = "convention")]
	pub fn next(&mut self) -> RequestId {
		let id = self.0;
		self.0 += 1;
		RequestId(id)
	}
}

/// Request payloads that can be multiplexed over a [`Channel`](crate::Channel).
pub trait Payload: Send + 'static {
	/// Short request type name, as carried in the `type` field on the wire.
	fn kind(&self) -> &'static str;

	/// Number of bytes whose ownership moves to the peer with this payload.
	fn transferred_len(&self) -> usize {
		0
	}
}

/// A request crossing the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request<P> {
	/// Correlation ID assigned by the main loop.
	pub id: RequestId,
	/// Request body, flattened next to the ID.
	#[serde(flatten)]
	pub payload: P,
}

/// A response crossing the boundary.
///
/// Exactly one response is produced per request. It carries either an
/// `error` or a `result`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<R> {
	/// ID of the request this response answers.
	pub id: RequestId,
	/// Failure reported by the peer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<SerializedError>,
	/// Result fields, flattened next to the ID.
	#[serde(flatten)]
	pub result: Option<R>,
}

impl<R> Response<R> {
	/// Creates a successful response.
	pub fn ok(id: RequestId, result: R) -> Self {
		Self {
			id,
			error: None,
			result: Some(result),
		}
	}

	/// Creates an error response.
	pub fn err(id: RequestId, error: SerializedError) -> Self {
		Self {
			id,
			error: Some(error),
			result: None,
		}
	}

	/// Converts the response into its result, failing on an error response.
	pub fn into_result(self) -> Result<R> {
		if let Some(error) = self.error {
			return Err(Error::Remote(error.into()));
		}
		self.result
			.ok_or_else(|| Error::Protocol(format!("response {} carries neither result nor error", self.id)))
	}
}
