//! Structural relay of one RESP unit from a reader to a writer.
//!
//! The copier walks the same tags and length/count fields as the decoder and
//! applies the same bounds to them, but never builds a value: line and payload
//! bytes go straight from the reader's buffer to the writer. It is the tool
//! for finding unit boundaries on a live connection, and for proxying replies
//! without paying for a tree.
//!
//! Terminators are rewritten to CRLF; every other byte is forwarded as read,
//! so RESP2 null lengths and zero-padded lengths stay as they were. Integer,
//! double and verbatim payloads are relayed without being validated. Length
//! and count lines are parsed in a fixed stack buffer that skips leading
//! zeros, so they accept exactly what the decoder accepts. If the walk fails
//! part way, the writer has already received the bytes before the failure,
//! and errors raised by the writer are always reported as
//! [`DecodeError::Io`].

use std::io;
use std::io::BufRead;
use std::io::Write;

use log::trace;

use crate::config::DecodeConfig;
use crate::error::DecodeError;
use crate::utils::*;

/// Relays single RESP units under a fixed [`DecodeConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamCopier {
	config: DecodeConfig,
}

impl StreamCopier {
	pub fn new(config: DecodeConfig) -> Self {
		Self { config }
	}

	/// Forward exactly one unit from `reader` to `writer`.
	///
	/// Returns the number of bytes written. The reader is left positioned
	/// right after the unit.
	pub fn copy_unit<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<u64, DecodeError>
	where
		R: BufRead,
		W: Write,
	{
		let mut relay = Relay {
			reader,
			writer,
			max_size: self.config.max_size,
			written: 0,
		};
		match relay.unit() {
			Ok(()) => {
				trace!("relayed unit of {} bytes", relay.written);
				Ok(relay.written)
			}
			Err(e) => {
				trace!("relay aborted after {} bytes: {e}", relay.written);
				Err(e)
			}
		}
	}
}

/// Forward exactly one unit from `reader` to `writer`, bounding each field by
/// `max_size`.
pub fn copy_unit<R, W>(reader: &mut R, writer: &mut W, max_size: usize) -> Result<u64, DecodeError>
where
	R: BufRead,
	W: Write,
{
	StreamCopier::new(DecodeConfig::new().max_size(max_size)).copy_unit(reader, writer)
}

/// Room for any i64 literal once leading zeros are dropped.
const CONTROL_LINE_CAP: usize = 32;

/// A length or count line, parsed on the stack while it is relayed.
#[derive(Default)]
struct ControlLine {
	/// Sign and significant digits
	digits: [u8; CONTROL_LINE_CAP],
	len: usize,
	/// Past the sign and leading zeros
	significant: bool,
	/// Leading zeros were skipped
	zeros: bool,
	overflow: bool,
	/// Line as read, clipped, for error messages
	raw: [u8; CONTROL_LINE_CAP],
	raw_len: usize,
	clipped: bool,
}

impl ControlLine {
	fn push(&mut self, chunk: &[u8]) {
		let keep = chunk.len().min(CONTROL_LINE_CAP - self.raw_len);
		self.raw[self.raw_len..self.raw_len + keep].copy_from_slice(&chunk[..keep]);
		self.raw_len += keep;
		self.clipped |= keep < chunk.len();

		for &byte in chunk {
			if !self.significant {
				match byte {
					b'+' | b'-' if self.len == 0 && !self.zeros => {
						self.digits[0] = byte;
						self.len = 1;
						continue;
					}
					b'0' => {
						self.zeros = true;
						continue;
					}
					_ => {
						self.significant = true;
						// "0x1" and "0-1" must stay invalid
						if self.zeros && !byte.is_ascii_digit() {
							self.digits[self.len] = b'0';
							self.len += 1;
						}
					}
				}
			}
			if self.len == CONTROL_LINE_CAP {
				self.overflow = true;
				return;
			}
			self.digits[self.len] = byte;
			self.len += 1;
		}
	}

	fn value(&self) -> Result<i64, DecodeError> {
		if self.overflow {
			return Err(self.invalid());
		}
		let mut digits = self.digits;
		let mut len = self.len;
		if !self.significant && self.zeros {
			digits[len] = b'0';
			len += 1;
		}
		parse_integer(&digits[..len]).map_err(|_| self.invalid())
	}

	fn invalid(&self) -> DecodeError {
		let mut text = String::from_utf8_lossy(&self.raw[..self.raw_len]).into_owned();
		if self.clipped {
			text.push_str("...");
		}
		DecodeError::BadInteger(text)
	}
}

struct Relay<'a, R, W> {
	reader: &'a mut R,
	writer: &'a mut W,
	max_size: usize,
	written: u64,
}

impl<R: BufRead, W: Write> Relay<'_, R, W> {
	fn unit(&mut self) -> Result<(), DecodeError> {
		let tag = read_byte(self.reader)?;
		match tag {
			SIMPLE_STRING | ERROR | DOUBLE | BIG_NUMBER => {
				self.emit(&[tag])?;
				self.line(self.max_size)
			}
			INTEGER => {
				self.emit(&[tag])?;
				self.line(numeric_line_limit(self.max_size))
			}
			BULK_STRING | BULK_ERROR | VERBATIM_STRING => match self.length(tag)? {
				Some(len) => self.payload(len),
				None => Ok(()),
			},
			ARRAY | SET | PUSH => {
				if let Some(count) = self.length(tag)? {
					for _ in 0..count {
						self.unit()?;
					}
				}
				Ok(())
			}
			MAP => {
				let count = match self.control(tag)? {
					n if n < 0 => return Err(DecodeError::BadLength(n)),
					n => self.bounded(n)?,
				};
				for _ in 0..count {
					self.unit()?;
					self.unit()?;
				}
				Ok(())
			}
			NULL => {
				discard(self.reader, 2)?;
				self.emit(&[NULL])?;
				self.emit(CRLF)
			}
			BOOLEAN => {
				let value = read_byte(self.reader)?;
				if value != b't' && value != b'f' {
					return Err(DecodeError::BadBoolean(value));
				}
				discard(self.reader, 2)?;
				self.emit(&[BOOLEAN, value])?;
				self.emit(CRLF)
			}
			other => Err(DecodeError::BadTag(other)),
		}
	}

	/// Relay a line straight through, then a canonical terminator.
	fn line(&mut self, limit: usize) -> Result<(), DecodeError> {
		self.relay_line(limit, |_| {})?;
		self.emit(CRLF)
	}

	/// Relay a length or count line with its tag; returns its value.
	fn control(&mut self, tag: u8) -> Result<i64, DecodeError> {
		self.emit(&[tag])?;
		let mut line = ControlLine::default();
		self.relay_line(numeric_line_limit(self.max_size), |chunk| line.push(chunk))?;
		let value = line.value()?;
		self.emit(CRLF)?;
		Ok(value)
	}

	/// Forward line content, without its terminator, showing each chunk to
	/// `inspect` first.
	fn relay_line<F>(&mut self, limit: usize, mut inspect: F) -> Result<(), DecodeError>
	where
		F: FnMut(&[u8]),
	{
		let writer = &mut *self.writer;
		let written = &mut self.written;
		scan_line(self.reader, limit, |chunk| {
			inspect(chunk);
			writer.write_all(chunk).map_err(DecodeError::Io)?;
			*written += chunk.len() as u64;
			Ok(())
		})
	}

	/// Length or count with RESP2 null handling; `None` means null.
	fn length(&mut self, tag: u8) -> Result<Option<usize>, DecodeError> {
		match self.control(tag)? {
			-1 => Ok(None),
			n if n < -1 => Err(DecodeError::BadLength(n)),
			n => self.bounded(n).map(Some),
		}
	}

	fn bounded(&self, n: i64) -> Result<usize, DecodeError> {
		let len = usize::try_from(n).unwrap_or(usize::MAX);
		if len > self.max_size {
			return Err(DecodeError::SizeLimit {
				len,
				max: self.max_size,
			});
		}
		Ok(len)
	}

	/// Relay `len` payload bytes in reader-buffer sized chunks.
	fn payload(&mut self, mut len: usize) -> Result<(), DecodeError> {
		while len > 0 {
			let available = match self.reader.fill_buf() {
				Ok(buf) => buf,
				Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			};
			if available.is_empty() {
				return Err(DecodeError::Truncated);
			}
			let step = available.len().min(len);
			self.writer
				.write_all(&available[..step])
				.map_err(DecodeError::Io)?;
			self.reader.consume(step);
			self.written += step as u64;
			len -= step;
		}
		discard(self.reader, 2)?;
		self.emit(CRLF)
	}

	/// Writer failures are never read as truncated input.
	fn emit(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
		self.writer.write_all(bytes).map_err(DecodeError::Io)?;
		self.written += bytes.len() as u64;
		Ok(())
	}
}
