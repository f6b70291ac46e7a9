use super::*;
use crate::channel::{LocalPeer, local};
use crate::remote::SerializedError;

#[derive(Debug, Clone, PartialEq)]
struct Echo(u32);

impl Payload for Echo {
	fn kind(&self) -> &'static str {
		"echo"
	}
}

fn spawn_loop() -> (ClientSocket<Echo, u32>, LocalPeer<Echo, u32>) {
	let (channel, peer) = local::<Echo, u32>();
	let (main_loop, socket) = MainLoop::new(channel);
	tokio::spawn(main_loop.run());
	(socket, peer)
}

#[tokio::test]
async fn closed_client_socket() {
	let socket = ClientSocket::<Echo, u32>::new_closed();
	assert!(socket.is_closed());
	assert!(matches!(socket.request(Echo(1)).await, Err(Error::ServiceStopped)));
}

#[tokio::test]
async fn ids_are_assigned_in_send_order() {
	let (socket, mut peer) = spawn_loop();

	let a = tokio::spawn({
		let socket = socket.clone();
		async move { socket.call(Echo(10)).await }
	});
	let first = peer.requests.recv().await.unwrap();
	let b = tokio::spawn({
		let socket = socket.clone();
		async move { socket.call(Echo(20)).await }
	});
	let second = peer.requests.recv().await.unwrap();

	assert_eq!(first.id, RequestId(0));
	assert_eq!(second.id, RequestId(1));

	// Answer out of order.
	peer.responder.reply(Response::ok(second.id, second.payload.0 + 1)).unwrap();
	peer.responder.reply(Response::ok(first.id, first.payload.0 + 1)).unwrap();

	assert_eq!(a.await.unwrap().unwrap(), 11);
	assert_eq!(b.await.unwrap().unwrap(), 21);
}

#[tokio::test]
async fn error_response_rejects_with_rebuilt_error() {
	let (socket, mut peer) = spawn_loop();

	let call = tokio::spawn(async move { socket.request(Echo(1)).await });
	let req = peer.requests.recv().await.unwrap();
	peer.responder
		.reply(Response::err(req.id, SerializedError::new("RangeError", "too big").with_stack("at handler")))
		.unwrap();

	match call.await.unwrap() {
		Err(Error::Remote(remote)) => {
			assert_eq!(remote.name(), "RangeError");
			assert_eq!(remote.message(), "too big");
			assert_eq!(remote.stack(), Some("at handler"));
		}
		other => panic!("unexpected outcome: {other:?}"),
	}
}

#[tokio::test]
async fn unknown_response_ids_are_dropped() {
	let (socket, mut peer) = spawn_loop();

	let call = tokio::spawn(async move { socket.call(Echo(5)).await });
	let req = peer.requests.recv().await.unwrap();

	peer.responder.reply(Response::ok(RequestId(999), 0)).unwrap();
	peer.responder.reply(Response::ok(req.id, 6)).unwrap();

	assert_eq!(call.await.unwrap().unwrap(), 6);
}

#[tokio::test]
async fn each_response_fulfils_only_once() {
	let (socket, mut peer) = spawn_loop();

	let call = tokio::spawn({
		let socket = socket.clone();
		async move { socket.call(Echo(1)).await }
	});
	let req = peer.requests.recv().await.unwrap();
	peer.responder.reply(Response::ok(req.id, 1)).unwrap();
	assert_eq!(call.await.unwrap().unwrap(), 1);

	// A duplicate for the same ID no longer has a listener, and the next
	// request gets a fresh ID.
	peer.responder.reply(Response::ok(req.id, 100)).unwrap();
	let call = tokio::spawn(async move { socket.call(Echo(2)).await });
	let next = peer.requests.recv().await.unwrap();
	assert_eq!(next.id, RequestId(1));
	peer.responder.reply(Response::ok(next.id, 2)).unwrap();
	assert_eq!(call.await.unwrap().unwrap(), 2);
}

#[tokio::test]
async fn peer_shutdown_fails_pending_requests() {
	let (socket, mut peer) = spawn_loop();

	let call = tokio::spawn({
		let socket = socket.clone();
		async move { socket.request(Echo(1)).await }
	});
	let _req = peer.requests.recv().await.unwrap();
	drop(peer);

	assert!(matches!(call.await.unwrap(), Err(Error::ServiceStopped)));
	assert!(matches!(socket.request(Echo(2)).await, Err(Error::ServiceStopped)));
}

#[tokio::test]
async fn unanswered_request_stays_pending() {
	let (socket, mut peer) = spawn_loop();

	let call = tokio::spawn(async move { socket.request(Echo(1)).await });
	let _req = peer.requests.recv().await.unwrap();

	let waited = tokio::time::timeout(std::time::Duration::from_millis(50), call).await;
	assert!(waited.is_err(), "no timeout is imposed by the multiplexer");
}
