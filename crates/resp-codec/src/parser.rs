//! Recursive-descent RESP decoder.
//!
//! One walk, two byte sources: a bounded in-memory buffer whose payloads are
//! handed out as zero-copy slices, and a pull-based reader whose payloads are
//! copied into a per-decode [`Arena`]. Either way every byte payload of the
//! resulting tree lives in one allocation scope, released when the root value
//! is dropped.
//!
//! Recursion depth follows the nesting depth of the input and is bounded only
//! by the thread's stack. Callers reading from untrusted peers on small stacks
//! should run the decoder on a thread sized accordingly.

use std::io;
use std::io::BufRead;

use bytes::Bytes;
use bytes::BytesMut;
use log::trace;
use memchr::memchr;

use crate::arena::Arena;
use crate::config::DecodeConfig;
use crate::copy;
use crate::error::DecodeError;
use crate::types::RespValue;
use crate::utils::*;

/// Children preallocated for an aggregate before any of them is read, so a
/// hostile count cannot reserve memory up front.
const PREALLOC_LIMIT: usize = 1024;

/// Decodes single RESP units under a fixed [`DecodeConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
	config: DecodeConfig,
}

impl Decoder {
	pub fn new(config: DecodeConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &DecodeConfig {
		&self.config
	}

	/// Decode a buffer holding exactly one unit.
	///
	/// Payloads in the returned tree are slices of `buf`. Bytes left after the
	/// unit fail with [`DecodeError::TrailingData`].
	pub fn decode(&self, buf: Bytes) -> Result<RespValue, DecodeError> {
		let mut src = SliceSource { buf, pos: 0 };
		let result = decode_value(&mut src, self.config.max_size).and_then(|value| {
			match src.buf.len() - src.pos {
				0 => Ok(value),
				rest => Err(DecodeError::TrailingData(rest)),
			}
		});
		self.trace_rejected(&result);
		result
	}

	/// Copy `buf` into a fresh buffer and decode it. See [`Decoder::decode`].
	pub fn decode_slice(&self, buf: &[u8]) -> Result<RespValue, DecodeError> {
		self.decode(Bytes::copy_from_slice(buf))
	}

	/// Decode one unit from `reader`, leaving it positioned right after it.
	pub fn decode_from<R: BufRead>(&self, reader: &mut R) -> Result<RespValue, DecodeError> {
		let mut src = ReaderSource {
			reader,
			arena: Arena::new(),
		};
		let result = decode_value(&mut src, self.config.max_size);
		self.trace_rejected(&result);
		result
	}

	/// Split the first complete unit off the front of a connection buffer and
	/// decode it.
	///
	/// Returns `Ok(None)` and leaves `buf` untouched while it holds only part
	/// of a unit. The unit is measured with [`StreamCopier`](crate::StreamCopier),
	/// which does not look inside integer, double or verbatim payloads, so a
	/// unit that is complete but malformed is split off `buf` before its
	/// decode error is returned.
	pub fn decode_frame(&self, buf: &mut BytesMut) -> Result<Option<RespValue>, DecodeError> {
		let mut rest: &[u8] = &buf[..];
		match copy::copy_unit(&mut rest, &mut io::sink(), self.config.max_size) {
			Ok(_) => {}
			Err(DecodeError::Truncated) => return Ok(None),
			Err(e) => {
				trace!("rejected frame: {e}");
				return Err(e);
			}
		}
		let consumed = buf.len() - rest.len();
		let frame = buf.split_to(consumed).freeze();
		self.decode(frame).map(Some)
	}

	fn trace_rejected(&self, result: &Result<RespValue, DecodeError>) {
		if let Err(e) = result {
			trace!(
				"rejected unit ({:?}, max_size {}): {e}",
				e.class(),
				self.config.max_size
			);
		}
	}
}

/// Decode a buffer holding exactly one unit, bounding each field by `max_size`.
pub fn decode(buf: Bytes, max_size: usize) -> Result<RespValue, DecodeError> {
	Decoder::new(DecodeConfig::new().max_size(max_size)).decode(buf)
}

/// Like [`decode`], for a borrowed buffer.
pub fn decode_slice(buf: &[u8], max_size: usize) -> Result<RespValue, DecodeError> {
	Decoder::new(DecodeConfig::new().max_size(max_size)).decode_slice(buf)
}

/// Decode one unit from `reader`, bounding each field by `max_size`.
pub fn decode_from<R: BufRead>(reader: &mut R, max_size: usize) -> Result<RespValue, DecodeError> {
	Decoder::new(DecodeConfig::new().max_size(max_size)).decode_from(reader)
}

/// Where the decoder pulls bytes from.
trait Source {
	fn read_byte(&mut self) -> Result<u8, DecodeError>;

	/// Read a line and keep it as a payload.
	fn read_line(&mut self, max_size: usize) -> Result<Bytes, DecodeError>;

	/// Read a line and hand it to `parse` without keeping it.
	fn parse_line<T, F>(&mut self, max_size: usize, parse: F) -> Result<T, DecodeError>
	where
		F: FnOnce(&[u8]) -> Result<T, DecodeError>;

	fn read_payload(&mut self, len: usize) -> Result<Bytes, DecodeError>;

	fn discard(&mut self, n: usize) -> Result<(), DecodeError>;
}

struct SliceSource {
	buf: Bytes,
	pos: usize,
}

impl SliceSource {
	/// Locate the current line as `start..end`, and step past its terminator.
	fn take_line(&mut self, max_size: usize) -> Result<(usize, usize), DecodeError> {
		let rest = &self.buf[self.pos..];
		let window = &rest[..rest.len().min(max_size.saturating_add(1))];
		let end = match memchr(CR, window) {
			Some(i) => i,
			None if rest.len() > max_size => {
				return Err(DecodeError::SizeLimit {
					len: window.len(),
					max: max_size,
				});
			}
			None => return Err(DecodeError::Truncated),
		};
		// CR plus the byte after it
		if end + 2 > rest.len() {
			return Err(DecodeError::Truncated);
		}
		let start = self.pos;
		self.pos += end + 2;
		Ok((start, start + end))
	}
}

impl Source for SliceSource {
	fn read_byte(&mut self) -> Result<u8, DecodeError> {
		let byte = *self.buf.get(self.pos).ok_or(DecodeError::Truncated)?;
		self.pos += 1;
		Ok(byte)
	}

	fn read_line(&mut self, max_size: usize) -> Result<Bytes, DecodeError> {
		let (start, end) = self.take_line(max_size)?;
		Ok(self.buf.slice(start..end))
	}

	fn parse_line<T, F>(&mut self, max_size: usize, parse: F) -> Result<T, DecodeError>
	where
		F: FnOnce(&[u8]) -> Result<T, DecodeError>,
	{
		let (start, end) = self.take_line(max_size)?;
		parse(&self.buf[start..end])
	}

	fn read_payload(&mut self, len: usize) -> Result<Bytes, DecodeError> {
		if self.buf.len() - self.pos < len {
			return Err(DecodeError::Truncated);
		}
		let payload = self.buf.slice(self.pos..self.pos + len);
		self.pos += len;
		Ok(payload)
	}

	fn discard(&mut self, n: usize) -> Result<(), DecodeError> {
		if self.buf.len() - self.pos < n {
			return Err(DecodeError::Truncated);
		}
		self.pos += n;
		Ok(())
	}
}

struct ReaderSource<'r, R> {
	reader: &'r mut R,
	arena: Arena,
}

impl<R: BufRead> ReaderSource<'_, R> {
	fn scan_into_arena(&mut self, max_size: usize) -> Result<(), DecodeError> {
		let arena = &mut self.arena;
		let result = scan_line(self.reader, max_size, |chunk| {
			arena.push(chunk);
			Ok(())
		});
		if result.is_err() {
			self.arena.rewind();
		}
		result
	}
}

impl<R: BufRead> Source for ReaderSource<'_, R> {
	fn read_byte(&mut self) -> Result<u8, DecodeError> {
		read_byte(self.reader)
	}

	fn read_line(&mut self, max_size: usize) -> Result<Bytes, DecodeError> {
		self.scan_into_arena(max_size)?;
		Ok(self.arena.finish())
	}

	fn parse_line<T, F>(&mut self, max_size: usize, parse: F) -> Result<T, DecodeError>
	where
		F: FnOnce(&[u8]) -> Result<T, DecodeError>,
	{
		self.scan_into_arena(max_size)?;
		let parsed = parse(self.arena.pending());
		self.arena.rewind();
		parsed
	}

	fn read_payload(&mut self, len: usize) -> Result<Bytes, DecodeError> {
		self.arena.fill_from(self.reader, len)
	}

	fn discard(&mut self, n: usize) -> Result<(), DecodeError> {
		discard(self.reader, n)
	}
}

fn decode_value<S: Source>(src: &mut S, max_size: usize) -> Result<RespValue, DecodeError> {
	match src.read_byte()? {
		SIMPLE_STRING => Ok(RespValue::SimpleString(src.read_line(max_size)?)),
		ERROR => Ok(RespValue::Error(src.read_line(max_size)?)),
		BIG_NUMBER => Ok(RespValue::BigNumber(src.read_line(max_size)?)),
		INTEGER => Ok(RespValue::Integer(
			src.parse_line(numeric_line_limit(max_size), parse_integer)?,
		)),
		DOUBLE => Ok(RespValue::Double(src.parse_line(max_size, parse_double)?)),
		BULK_STRING => Ok(read_blob(src, max_size)?.map_or(RespValue::Null, RespValue::BulkString)),
		BULK_ERROR => Ok(read_blob(src, max_size)?.map_or(RespValue::Null, RespValue::BulkError)),
		VERBATIM_STRING => read_blob(src, max_size)?.map_or(Ok(RespValue::Null), split_verbatim),
		ARRAY => decode_sequence(src, max_size, RespValue::Array),
		SET => decode_sequence(src, max_size, RespValue::Set),
		PUSH => decode_sequence(src, max_size, RespValue::Push),
		MAP => decode_map(src, max_size),
		NULL => {
			src.discard(2)?;
			Ok(RespValue::Null)
		}
		BOOLEAN => {
			let value = match src.read_byte()? {
				b't' => true,
				b'f' => false,
				other => return Err(DecodeError::BadBoolean(other)),
			};
			src.discard(2)?;
			Ok(RespValue::Boolean(value))
		}
		other => Err(DecodeError::BadTag(other)),
	}
}

/// Read a length or count field; `None` is the RESP2 null marker.
fn read_length<S: Source>(src: &mut S, max_size: usize) -> Result<Option<usize>, DecodeError> {
	match src.parse_line(numeric_line_limit(max_size), parse_integer)? {
		-1 => Ok(None),
		n if n < -1 => Err(DecodeError::BadLength(n)),
		n => bounded(n, max_size).map(Some),
	}
}

fn bounded(n: i64, max_size: usize) -> Result<usize, DecodeError> {
	let len = usize::try_from(n).unwrap_or(usize::MAX);
	if len > max_size {
		return Err(DecodeError::SizeLimit { len, max: max_size });
	}
	Ok(len)
}

/// Read a length-prefixed payload; `None` is the RESP2 null marker.
fn read_blob<S: Source>(src: &mut S, max_size: usize) -> Result<Option<Bytes>, DecodeError> {
	let Some(len) = read_length(src, max_size)? else {
		return Ok(None);
	};
	let data = src.read_payload(len)?;
	src.discard(2)?;
	Ok(Some(data))
}

/// `fmt:payload`, or a plain bulk string when too short to carry a format.
fn split_verbatim(data: Bytes) -> Result<RespValue, DecodeError> {
	if data.len() < 4 {
		return Ok(RespValue::BulkString(data));
	}
	if data[3] != b':' {
		return Err(DecodeError::BadVerbatim);
	}
	Ok(RespValue::VerbatimString {
		format: [data[0], data[1], data[2]],
		data: data.slice(4..),
	})
}

fn decode_sequence<S, F>(src: &mut S, max_size: usize, wrap: F) -> Result<RespValue, DecodeError>
where
	S: Source,
	F: FnOnce(Vec<RespValue>) -> RespValue,
{
	let Some(count) = read_length(src, max_size)? else {
		return Ok(RespValue::Null);
	};
	let mut items = Vec::with_capacity(count.min(PREALLOC_LIMIT));
	for _ in 0..count {
		items.push(decode_value(src, max_size)?);
	}
	Ok(wrap(items))
}

fn decode_map<S: Source>(src: &mut S, max_size: usize) -> Result<RespValue, DecodeError> {
	let count = match src.parse_line(numeric_line_limit(max_size), parse_integer)? {
		n if n < 0 => return Err(DecodeError::BadLength(n)),
		n => bounded(n, max_size)?,
	};
	let mut pairs = Vec::with_capacity(count.min(PREALLOC_LIMIT));
	for _ in 0..count {
		let key = decode_value(src, max_size)?;
		let value = decode_value(src, max_size)?;
		pairs.push((key, value));
	}
	Ok(RespValue::Map(pairs))
}
