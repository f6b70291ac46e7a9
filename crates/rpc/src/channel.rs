//! The boundary between the foreground and background contexts.

use std::future::Future;

use tokio::sync::mpsc;

use crate::protocol::{Request, Response};
use crate::{Error, Result};

/// Foreground end of a context boundary.
///
/// The main loop posts requests through it and receives every inbound
/// response from it. Implementations decide how values cross; the in-process
/// [`LocalChannel`] moves them without copying.
pub trait Channel: Send + 'static {
	/// Request payload type.
	type Payload: Send + 'static;

	/// Response result type.
	type Output: Send + 'static;

	/// Posts a request to the peer context.
	fn post(&mut self, request: Request<Self::Payload>) -> Result<()>;

	/// Waits for the next inbound response. Returns `None` once the peer is gone.
	fn recv(&mut self) -> impl Future<Output = Option<Response<Self::Output>>> + Send;
}

/// Creates a connected in-process channel pair.
pub fn local<P, R>() -> (LocalChannel<P, R>, LocalPeer<P, R>)
where
	P: Send + 'static,
	R: Send + 'static,
{
	let (request_tx, request_rx) = mpsc::unbounded_channel();
	let (response_tx, response_rx) = mpsc::unbounded_channel();
	(
		LocalChannel {
			outbound: request_tx,
			inbound: response_rx,
		},
		LocalPeer {
			requests: request_rx,
			responder: Responder { tx: response_tx },
		},
	)
}

/// Foreground end of an in-process channel.
#[derive(Debug)]
pub struct LocalChannel<P, R> {
	outbound: mpsc::UnboundedSender<Request<P>>,
	inbound: mpsc::UnboundedReceiver<Response<R>>,
}

impl<P, R> Channel for LocalChannel<P, R>
where
	P: Send + 'static,
	R: Send + 'static,
{
	type Payload = P;
	type Output = R;

	fn post(&mut self, request: Request<P>) -> Result<()> {
		self.outbound.send(request).map_err(|_| Error::ServiceStopped)
	}

	async fn recv(&mut self) -> Option<Response<R>> {
		self.inbound.recv().await
	}
}

/// Background end of an in-process channel.
#[derive(Debug)]
pub struct LocalPeer<P, R> {
	/// Requests posted by the foreground, in send order.
	pub requests: mpsc::UnboundedReceiver<Request<P>>,
	/// Handle for answering requests.
	pub responder: Responder<R>,
}

/// Cloneable reply handle for the background end.
#[derive(Debug)]
pub struct Responder<R> {
	tx: mpsc::UnboundedSender<Response<R>>,
}

impl<R> Clone for Responder<R> {
	fn clone(&self) -> Self {
		Self { tx: self.tx.clone() }
	}
}

impl<R> Responder<R> {
	/// Sends a response back to the foreground.
	///
	/// # Errors
	///
	/// Returns [`Error::ServiceStopped`] if the foreground end was dropped.
	pub fn reply(&self, response: Response<R>) -> Result<()> {
		self.tx.send(response).map_err(|_| Error::ServiceStopped)
	}

	/// Returns `true` if the foreground end was dropped.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}
