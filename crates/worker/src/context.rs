//! The background execution context.
//!
//! The context owns a dedicated OS thread running a current-thread tokio
//! runtime. It shares nothing with the foreground: requests arrive over the
//! channel, each is handled on its own blocking task, and responses are sent
//! back as soon as they complete, so completions interleave freely.

use std::thread::JoinHandle;

use courier_rpc::{LocalPeer, MainLoop, Payload, Request, Responder, Response, local};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::WorkerError;
use crate::api::WorkerApi;
use crate::handler::handle;
use crate::protocol::{BackgroundRequest, BackgroundResult};
use crate::spawn::{spawn_foreground, spawn_named_thread};

/// Handle to a running background context.
#[derive(Debug)]
pub struct BackgroundHandle {
	thread: JoinHandle<()>,
}

impl BackgroundHandle {
	/// Waits for the background thread to exit.
	///
	/// The context exits once every [`WorkerApi`] clone is dropped and its
	/// in-flight requests have completed.
	pub fn join(self) {
		if self.thread.join().is_err() {
			error!("worker.context.panicked");
		}
	}
}

/// Starts a background context on a thread named `thread_name`.
///
/// The foreground main loop is spawned onto the current tokio runtime, or a
/// shared fallback runtime when called outside one.
///
/// # Errors
///
/// Returns an error if the OS thread cannot be spawned.
pub fn spawn_background(thread_name: &str) -> std::io::Result<(WorkerApi, BackgroundHandle)> {
	let (channel, peer) = local::<BackgroundRequest, BackgroundResult>();

	let thread = spawn_named_thread(thread_name, move || {
		let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
			Ok(rt) => rt,
			Err(e) => {
				error!(error = %e, "worker.context.runtime_failed");
				return;
			}
		};
		runtime.block_on(serve(peer));
		debug!("worker.context.exit");
	})?;

	let (main_loop, socket) = MainLoop::new(channel);
	spawn_foreground(async move {
		if let Err(e) = main_loop.run().await {
			error!(error = %e, "worker.mainloop.failed");
		}
	});

	Ok((WorkerApi::new(socket), BackgroundHandle { thread }))
}

/// Serves requests from `peer` until the foreground hangs up.
pub async fn serve(peer: LocalPeer<BackgroundRequest, BackgroundResult>) {
	let LocalPeer {
		mut requests,
		responder,
	} = peer;
	let mut tasks = JoinSet::new();

	loop {
		tokio::select! {
			req = requests.recv() => match req {
				Some(req) => {
					tasks.spawn(handle_and_reply(req, responder.clone()));
				}
				None => break,
			},

			Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
				if let Err(e) = joined {
					error!(error = %e, "worker.task.join_failed");
				}
			}
		}
	}

	while let Some(joined) = tasks.join_next().await {
		if let Err(e) = joined {
			error!(error = %e, "worker.task.join_failed");
		}
	}
}

async fn handle_and_reply(req: Request<BackgroundRequest>, responder: Responder<BackgroundResult>) {
	let Request { id, payload } = req;
	let kind = payload.kind();
	debug!(id = %id, kind, transferred = payload.transferred_len(), "worker.request");

	let outcome = match tokio::task::spawn_blocking(move || handle(payload)).await {
		Ok(outcome) => outcome,
		Err(join) => Err(WorkerError::Task(join.to_string())),
	};

	let response = match outcome {
		Ok(result) => Response::ok(id, result),
		Err(e) => {
			warn!(id = %id, kind, error = %e, "worker.request.failed");
			Response::err(id, e.to_serialized())
		}
	};

	if responder.reply(response).is_err() {
		debug!(id = %id, "worker.reply.dropped");
	}
}
