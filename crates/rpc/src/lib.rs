//! Request multiplexing between two isolated execution contexts.
//!
//! This crate provides the foreground half of a request/response bridge:
//! * [`MainLoop`]: Owns the pending-call table and routes responses by correlation ID
//! * [`ClientSocket`]: Cheap cloneable handle for issuing requests into the main loop
//! * [`Channel`]: The boundary between contexts, injected into the main loop
//! * [`TransferableBuffer`]: Binary payloads whose ownership moves wholesale across the boundary
//! * [`SerializedError`]: Error identity as it crosses the boundary, rebuilt as [`RemoteError`]
//!
//! Responses for distinct requests may complete in any order; routing depends
//! only on the response ID. No timeout is imposed: a request that is never
//! answered stays pending until the channel closes.

#![warn(missing_docs)]

pub mod channel;
pub mod mainloop;
pub mod protocol;
pub mod remote;
pub mod transfer;

pub use channel::{Channel, LocalChannel, LocalPeer, Responder, local};
pub use mainloop::{ClientSocket, MainLoop};
pub use protocol::{CounterIdGen, Payload, Request, RequestId, Response};
pub use remote::{RemoteError, SerializedError};
pub use transfer::TransferableBuffer;

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Possible errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// The main loop or the peer context stopped.
	#[error("service stopped")]
	ServiceStopped,
	/// The peer context reported a failure while handling the request.
	#[error("{0}")]
	Remote(#[from] RemoteError),
	/// The peer violated the request/response protocol.
	#[error("protocol error: {0}")]
	Protocol(String),
	/// A buffer was used after its ownership had been transferred away.
	#[error("buffer was already transferred")]
	Detached,
	/// A boundary message could not be decoded.
	#[error("deserialization failed: {0}")]
	Deserialize(#[from] serde_json::Error),
}
