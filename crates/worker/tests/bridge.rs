//! End-to-end calls through a real background context.

use courier_rpc::{Error, TransferableBuffer};
use courier_worker::{Encoding, spawn_background};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn gzip_body_round_trips_and_detaches_the_original() {
	let (api, handle) = spawn_background("courier-test-decode").unwrap();
	let encoded = Encoding::Gzip.encode(b"hello from the background").unwrap();
	let mut body = TransferableBuffer::from(encoded.clone());

	let out = api.decode_body(&mut body, &["gzip"]).await.unwrap();

	assert!(body.is_detached());
	assert_eq!(out.encoded.as_bytes(), &encoded[..]);
	assert_eq!(out.decoded.as_bytes(), b"hello from the background");

	drop(api);
	tokio::task::spawn_blocking(move || handle.join()).await.unwrap();
}

#[tokio::test]
async fn layered_encodings_are_undone_in_reverse() {
	let (api, _handle) = spawn_background("courier-test-layers").unwrap();
	let once = Encoding::Deflate.encode(b"layered").unwrap();
	let twice = Encoding::Brotli.encode(&once).unwrap();

	let mut body = TransferableBuffer::from(twice);
	let out = api.decode_body(&mut body, &["deflate", "br"]).await.unwrap();
	assert_eq!(out.decoded.as_bytes(), b"layered");
}

#[tokio::test]
async fn background_failures_keep_their_identity() {
	let (api, _handle) = spawn_background("courier-test-errors").unwrap();
	let mut body = TransferableBuffer::from(b"abc".to_vec());

	let err = api.decode_body(&mut body, &["zstd"]).await.unwrap_err();
	let Error::Remote(remote) = err else {
		panic!("expected a remote error, got {err:?}");
	};
	assert_eq!(remote.name(), "UnsupportedEncoding");
	assert_eq!(remote.message(), "unsupported content encoding: zstd");
	assert_eq!(remote.field("encoding"), Some(&json!("zstd")));

	let err = api.build_api_metadata(json!("not a document")).await.unwrap_err();
	assert!(matches!(err, Error::Remote(ref r) if r.name() == "InvalidSpec"));
}

#[tokio::test]
async fn zeros_compress_under_every_encoding() {
	let (api, _handle) = spawn_background("courier-test-sizes").unwrap();
	let body = TransferableBuffer::from(vec![0u8; 1000]);

	let sizes = api.test_encodings(&body).await.unwrap();

	assert!(!body.is_detached());
	let names: Vec<_> = sizes.keys().map(String::as_str).collect();
	assert_eq!(names, vec!["br", "deflate", "gzip", "identity"]);
	assert_eq!(sizes["identity"], 1000);
	for (name, size) in &sizes {
		assert!(*size <= 1000, "{name} produced {size} bytes");
	}
}

#[tokio::test]
async fn builds_api_metadata() {
	let (api, _handle) = spawn_background("courier-test-api").unwrap();
	let spec = json!({
		"info": { "title": "Things", "version": "2" },
		"paths": { "/things/{id}": { "get": { "operationId": "getThing" } } }
	});

	let meta = api.build_api_metadata(spec).await.unwrap();
	assert_eq!(meta.title, "Things");
	let op = meta.find_operation("GET", "/things/9").unwrap();
	assert_eq!(op.operation_id.as_deref(), Some("getThing"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_calls_each_get_their_own_answer() {
	let (api, _handle) = spawn_background("courier-test-concurrent").unwrap();

	let calls: Vec<_> = (0..16u8)
		.map(|i| {
			let api = api.clone();
			tokio::spawn(async move {
				let payload = vec![i; 64 + i as usize];
				let encoded = Encoding::Gzip.encode(&payload).unwrap();
				let mut body = TransferableBuffer::from(encoded);
				let out = api.decode_body(&mut body, &["gzip"]).await.unwrap();
				(payload, out.decoded.into_bytes())
			})
		})
		.collect();

	for call in calls {
		let (sent, got) = call.await.unwrap();
		assert_eq!(&got[..], &sent[..]);
	}
}
