//! Request multiplexer main loop.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::channel::Channel;
use crate::protocol::{CounterIdGen, Payload, Request, RequestId, Response};
use crate::{Error, Result};

type ResponseTx<R> = oneshot::Sender<Result<Response<R>>>;

/// A request submitted by a [`ClientSocket`], awaiting an ID.
struct OutgoingRequest<P, R> {
	payload: P,
	response_tx: ResponseTx<R>,
}

/// Multiplexes concurrent requests over a single [`Channel`].
///
/// The loop assigns each request the next correlation ID, records a one-shot
/// continuation for it and posts it to the peer. Each inbound response
/// fulfils and removes exactly one continuation, so responses may arrive in
/// any order relative to each other.
pub struct MainLoop<C: Channel> {
	/// The injected context boundary.
	channel: C,
	/// Receiver for requests from client sockets.
	rx: mpsc::UnboundedReceiver<OutgoingRequest<C::Payload, C::Output>>,
	/// Generator for outgoing request IDs.
	id_gen: CounterIdGen,
	/// Pending outgoing requests awaiting responses.
	outgoing: HashMap<RequestId, ResponseTx<C::Output>>,
}

impl<C> MainLoop<C>
where
	C: Channel,
	C::Payload: Payload,
{
	/// Creates a main loop over `channel` and a socket for issuing requests.
	#[must_use]
	pub fn new(channel: C) -> (Self, ClientSocket<C::Payload, C::Output>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let this = Self {
			channel,
			rx,
			id_gen: CounterIdGen::new(),
			outgoing: HashMap::new(),
		};
		(this, ClientSocket { tx })
	}

	/// Drives the main loop.
	///
	/// Runs until the peer closes the channel, or until every socket is dropped
	/// and no request is pending. Requests still pending when the channel
	/// closes fail with [`Error::ServiceStopped`].
	pub async fn run(mut self) -> Result<()> {
		let mut accepting = true;

		loop {
			if !accepting && self.outgoing.is_empty() {
				debug!("rpc.mainloop.idle_shutdown");
				break;
			}

			tokio::select! {
				biased;

				resp = self.channel.recv() => match resp {
					Some(resp) => self.dispatch_response(resp),
					None => {
						debug!(pending = self.outgoing.len(), "rpc.channel.closed");
						break;
					}
				},

				req = self.rx.recv(), if accepting => match req {
					Some(req) => self.dispatch_request(req),
					None => accepting = false,
				},
			}
		}

		for (_, tx) in self.outgoing.drain() {
			let _ = tx.send(Err(Error::ServiceStopped));
		}
		Ok(())
	}

	/// Assigns an ID to a request and posts it to the peer.
	fn dispatch_request(&mut self, req: OutgoingRequest<C::Payload, C::Output>) {
		let OutgoingRequest { payload, response_tx } = req;
		let id = self.id_gen.next();

		trace!(
			id = %id,
			kind = payload.kind(),
			transferred = payload.transferred_len(),
			"rpc.send"
		);

		match self.channel.post(Request { id, payload }) {
			Ok(()) => {
				let prev = self.outgoing.insert(id, response_tx);
				debug_assert!(prev.is_none(), "duplicate pending request id {id}");
			}
			Err(e) => {
				let _ = response_tx.send(Err(e));
			}
		}
	}

	/// Routes a response to the continuation registered under its ID.
	fn dispatch_response(&mut self, resp: Response<C::Output>) {
		match self.outgoing.remove(&resp.id) {
			Some(tx) => {
				trace!(id = %resp.id, failed = resp.error.is_some(), "rpc.response");
				// The caller may have stopped waiting.
				let _ = tx.send(Ok(resp));
			}
			None => warn!(id = %resp.id, "rpc.response.unknown_id"),
		}
	}
}

/// Handle for issuing requests into a [`MainLoop`].
#[derive(Debug)]
pub struct ClientSocket<P, R> {
	tx: mpsc::UnboundedSender<OutgoingRequest<P, R>>,
}

impl<P, R> Clone for ClientSocket<P, R> {
	fn clone(&self) -> Self {
		Self { tx: self.tx.clone() }
	}
}

impl<P, R> ClientSocket<P, R> {
	/// Creates a socket whose main loop has already stopped.
	#[must_use]
	pub fn new_closed() -> Self {
		let (tx, _) = mpsc::unbounded_channel();
		Self { tx }
	}

	/// Sends a request and waits for its response.
	///
	/// # Errors
	///
	/// - [`Error::Remote`] when the peer answered with an error; the error's
	///   name, message and stack are rebuilt from the serialized form.
	/// - [`Error::ServiceStopped`] when the main loop or the peer is gone.
	pub async fn request(&self, payload: P) -> Result<Response<R>> {
		let (response_tx, response_rx) = oneshot::channel();
		self.tx
			.send(OutgoingRequest { payload, response_tx })
			.map_err(|_| Error::ServiceStopped)?;

		let mut resp = response_rx.await.map_err(|_| Error::ServiceStopped)??;
		if let Some(error) = resp.error.take() {
			return Err(Error::Remote(error.into()));
		}
		Ok(resp)
	}

	/// Sends a request and returns its result.
	///
	/// # Errors
	///
	/// As [`Self::request`], plus [`Error::Protocol`] for a response without a result.
	pub async fn call(&self, payload: P) -> Result<R> {
		self.request(payload).await?.into_result()
	}

	/// Returns `true` if the main loop has stopped accepting requests.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}

#[cfg(test)]
mod tests;
