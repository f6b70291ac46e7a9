//! Response routing is a pure function of the correlation ID.

use courier_rpc::{MainLoop, Payload, Response, local};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Square(u64);

impl Payload for Square {
	fn kind(&self) -> &'static str {
		"square"
	}
}

/// Issues one call per value, lets the peer answer in `order`, and returns
/// what each caller received.
fn run_permuted(values: Vec<u64>, order: Vec<usize>) -> Vec<u64> {
	let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
	rt.block_on(async move {
		let (channel, mut peer) = local::<Square, u64>();
		let (main_loop, socket) = MainLoop::new(channel);
		tokio::spawn(main_loop.run());

		let n = values.len();
		let calls: Vec<_> = values
			.into_iter()
			.map(|v| {
				let socket = socket.clone();
				tokio::spawn(async move { socket.call(Square(v)).await })
			})
			.collect();

		let mut received = Vec::with_capacity(n);
		for _ in 0..n {
			received.push(peer.requests.recv().await.unwrap());
		}
		for idx in order {
			let req = &received[idx];
			peer.responder.reply(Response::ok(req.id, req.payload.0 * req.payload.0)).unwrap();
		}

		let mut results = Vec::with_capacity(n);
		for call in calls {
			results.push(call.await.unwrap().unwrap());
		}
		results
	})
}

fn values_and_order() -> impl Strategy<Value = (Vec<u64>, Vec<usize>)> {
	prop::collection::vec(0u64..10_000, 1..24).prop_flat_map(|values| {
		let order: Vec<usize> = (0..values.len()).collect();
		(Just(values), Just(order).prop_shuffle())
	})
}

proptest! {
	#[test]
	fn every_caller_gets_its_own_response((values, order) in values_and_order()) {
		let expected: Vec<u64> = values.iter().map(|v| v * v).collect();
		prop_assert_eq!(run_permuted(values, order), expected);
	}
}

#[test]
fn reverse_completion_order() {
	let values: Vec<u64> = (1..=8).collect();
	let order: Vec<usize> = (0..8).rev().collect();
	assert_eq!(run_permuted(values, order), vec![1, 4, 9, 16, 25, 36, 49, 64]);
}
