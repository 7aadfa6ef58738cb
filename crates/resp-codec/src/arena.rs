//! Allocation scope for trees decoded from a reader.

use std::io::Read;

use bytes::Bytes;
use bytes::BytesMut;

use crate::error::DecodeError;

/// Minimum size of a fresh arena chunk.
const CHUNK_SIZE: usize = 4096;

/// Bump arena backing the byte payloads of one decoded tree.
///
/// Payloads are carved off the front of the current chunk as frozen `Bytes`,
/// so small fields share one allocation. A chunk is freed once the arena and
/// every payload carved from it are dropped, which for a decoded tree means
/// when its root is dropped.
///
/// At most one payload is pending at a time: bytes are appended with
/// [`Arena::push`], then either kept with [`Arena::finish`] or thrown away with
/// [`Arena::rewind`], which gives the space back to the next payload.
#[derive(Debug, Default)]
pub struct Arena {
	chunk: BytesMut,
}

impl Arena {
	pub fn new() -> Self {
		Self::default()
	}

	/// Append bytes to the pending payload.
	pub fn push(&mut self, bytes: &[u8]) {
		self.make_room(bytes.len());
		self.chunk.extend_from_slice(bytes);
	}

	/// The pending payload so far.
	pub fn pending(&self) -> &[u8] {
		&self.chunk
	}

	/// Keep the pending payload.
	pub fn finish(&mut self) -> Bytes {
		self.chunk.split().freeze()
	}

	/// Drop the pending payload and reuse its space.
	pub fn rewind(&mut self) {
		self.chunk.clear();
	}

	/// Read exactly `len` bytes from `reader` into a new payload.
	pub fn fill_from<R: Read>(&mut self, reader: &mut R, len: usize) -> Result<Bytes, DecodeError> {
		debug_assert!(self.chunk.is_empty(), "payload already pending");
		self.make_room(len);
		self.chunk.resize(len, 0);
		if let Err(e) = reader.read_exact(&mut self.chunk) {
			self.rewind();
			return Err(e.into());
		}
		Ok(self.finish())
	}

	fn make_room(&mut self, additional: usize) {
		if self.chunk.capacity() - self.chunk.len() < additional {
			self.chunk.reserve(additional.max(CHUNK_SIZE));
		}
	}
}
