//! Transferable buffers.
//!
//! A [`TransferableBuffer`] is either readable or detached. Transferring it
//! moves the bytes out and leaves the sender holding a zero-length, detached
//! buffer; the receiver becomes the sole owner of the bytes.

use std::ops::Deref;

use bytes::Bytes;

use crate::{Error, Result};

/// Binary payload with transfer-of-ownership semantics.
///
/// Cloning shares the same immutable allocation, like handing out another
/// reference to the same buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferableBuffer {
	bytes: Bytes,
	detached: bool,
}

impl TransferableBuffer {
	/// Wraps bytes in a readable buffer.
	pub fn new(bytes: impl Into<Bytes>) -> Self {
		Self {
			bytes: bytes.into(),
			detached: false,
		}
	}

	/// Returns the readable bytes. Empty once detached.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Returns the number of readable bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Returns `true` if there are no readable bytes.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Returns `true` once ownership has been transferred away.
	pub fn is_detached(&self) -> bool {
		self.detached
	}

	/// Moves the bytes out for transfer, detaching this buffer.
	///
	/// # Errors
	///
	/// Returns [`Error::Detached`] if the buffer was already transferred.
	pub fn transfer(&mut self) -> Result<Bytes> {
		if self.detached {
			return Err(Error::Detached);
		}
		self.detached = true;
		Ok(std::mem::take(&mut self.bytes))
	}

	/// Returns a shared handle to the bytes without transferring ownership.
	///
	/// # Errors
	///
	/// Returns [`Error::Detached`] if the buffer was already transferred.
	pub fn share(&self) -> Result<Bytes> {
		if self.detached {
			return Err(Error::Detached);
		}
		Ok(self.bytes.clone())
	}

	/// Returns `true` if both buffers view the exact same allocation.
	pub fn shares_allocation(&self, other: &Self) -> bool {
		!self.detached
			&& !other.detached
			&& self.bytes.len() == other.bytes.len()
			&& std::ptr::eq(self.bytes.as_ptr(), other.bytes.as_ptr())
	}

	/// Consumes the buffer, returning its bytes.
	pub fn into_bytes(self) -> Bytes {
		self.bytes
	}
}

impl Deref for TransferableBuffer {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		self.as_bytes()
	}
}

impl From<Bytes> for TransferableBuffer {
	fn from(bytes: Bytes) -> Self {
		Self::new(bytes)
	}
}

impl From<Vec<u8>> for TransferableBuffer {
	fn from(bytes: Vec<u8>) -> Self {
		Self::new(bytes)
	}
}

impl From<&'static [u8]> for TransferableBuffer {
	fn from(bytes: &'static [u8]) -> Self {
		Self::new(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transfer_detaches_sender() {
		let mut buf = TransferableBuffer::from(b"hello".to_vec());
		let moved = buf.transfer().unwrap();

		assert_eq!(&moved[..], b"hello");
		assert!(buf.is_detached());
		assert!(buf.is_empty());
		assert_eq!(buf.as_bytes(), b"");
	}

	#[test]
	fn second_transfer_fails() {
		let mut buf = TransferableBuffer::from(b"abc".to_vec());
		buf.transfer().unwrap();
		assert!(matches!(buf.transfer(), Err(Error::Detached)));
		assert!(matches!(buf.share(), Err(Error::Detached)));
	}

	#[test]
	fn clones_share_allocation() {
		let buf = TransferableBuffer::from(vec![1u8; 64]);
		let alias = buf.clone();
		let copy = TransferableBuffer::from(vec![1u8; 64]);

		assert!(buf.shares_allocation(&alias));
		assert!(!buf.shares_allocation(&copy));
		assert_eq!(buf, copy);
	}

	#[test]
	fn share_keeps_sender_readable() {
		let buf = TransferableBuffer::from(vec![7u8; 8]);
		let shared = buf.share().unwrap();
		assert_eq!(shared.len(), 8);
		assert!(!buf.is_detached());
		assert_eq!(buf.len(), 8);
	}
}
