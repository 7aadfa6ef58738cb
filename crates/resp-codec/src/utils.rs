//! Wire constants and helpers shared by the decoder, encoder and stream copier.

use std::fmt;
use std::fmt::Write as _;
use std::io;
use std::io::BufRead;

use memchr::memchr;

use crate::error::DecodeError;

/// CRLF line ending
pub const CRLF: &[u8] = b"\r\n";

/// Line terminator byte searched for by the decoder.
pub const CR: u8 = b'\r';

/// Type markers for RESP2
pub const SIMPLE_STRING: u8 = b'+';
pub const ERROR: u8 = b'-';
pub const INTEGER: u8 = b':';
pub const BULK_STRING: u8 = b'$';
pub const ARRAY: u8 = b'*';

/// Type markers for RESP3
pub const NULL: u8 = b'_';
pub const BOOLEAN: u8 = b'#';
pub const DOUBLE: u8 = b',';
pub const BIG_NUMBER: u8 = b'(';
pub const BULK_ERROR: u8 = b'!';
pub const VERBATIM_STRING: u8 = b'=';
pub const MAP: u8 = b'%';
pub const SET: u8 = b'~';
pub const PUSH: u8 = b'>';

/// Widest text an i64 renders to: `-9223372036854775808`.
const I64_TEXT_LEN: usize = 20;

/// Bound for lines holding an i64 literal (lengths, counts and integers).
///
/// Never below [`I64_TEXT_LEN`], so `-1` and `0` fit under any `max_size`.
/// Leading zeros still count against it.
#[inline]
pub(crate) fn numeric_line_limit(max_size: usize) -> usize {
	max_size.max(I64_TEXT_LEN)
}

/// Parse a signed base-10 integer from a byte slice
#[inline]
pub fn parse_integer(buf: &[u8]) -> Result<i64, DecodeError> {
	std::str::from_utf8(buf)
		.ok()
		.and_then(|s| s.parse::<i64>().ok())
		.ok_or_else(|| DecodeError::BadInteger(String::from_utf8_lossy(buf).into_owned()))
}

/// Parse a double from a byte slice.
///
/// Only the lowercase `inf`, `-inf` and `nan` tokens are accepted for the
/// special values; every other literal must be plain decimal or scientific
/// notation.
pub fn parse_double(buf: &[u8]) -> Result<f64, DecodeError> {
	match buf {
		b"inf" => return Ok(f64::INFINITY),
		b"-inf" => return Ok(f64::NEG_INFINITY),
		b"nan" => return Ok(f64::NAN),
		_ => {}
	}

	let numeric = !buf.is_empty()
		&& buf
			.iter()
			.all(|b| matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E'));

	numeric
		.then(|| std::str::from_utf8(buf).ok())
		.flatten()
		.and_then(|s| s.parse::<f64>().ok())
		.ok_or_else(|| DecodeError::BadDouble(String::from_utf8_lossy(buf).into_owned()))
}

/// ASCII rendering of a number, held inline so encoding never allocates.
pub struct Literal {
	buf: [u8; 32],
	len: usize,
}

impl Literal {
	pub fn integer(i: i64) -> Self {
		let mut lit = Self::empty();
		// 32 bytes hold any i64
		let _ = write!(lit, "{i}");
		lit
	}

	pub fn length(n: usize) -> Self {
		let mut lit = Self::empty();
		let _ = write!(lit, "{n}");
		lit
	}

	/// Scientific notation for finite values, `inf`/`-inf`/`nan` otherwise.
	pub fn double(d: f64) -> Self {
		let mut lit = Self::empty();
		let _ = if d.is_nan() {
			lit.write_str("nan")
		} else if d.is_infinite() {
			lit.write_str(if d.is_sign_positive() { "inf" } else { "-inf" })
		} else {
			write!(lit, "{d:e}")
		};
		lit
	}

	#[inline]
	pub fn as_bytes(&self) -> &[u8] {
		&self.buf[..self.len]
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.len
	}

	fn empty() -> Self {
		Self {
			buf: [0; 32],
			len: 0,
		}
	}
}

impl fmt::Write for Literal {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		let end = self.len + s.len();
		if end > self.buf.len() {
			return Err(fmt::Error);
		}
		self.buf[self.len..end].copy_from_slice(s.as_bytes());
		self.len = end;
		Ok(())
	}
}

/// Read a single byte, failing with `Truncated` at end of input.
pub(crate) fn read_byte<R: BufRead>(reader: &mut R) -> Result<u8, DecodeError> {
	loop {
		let available = match reader.fill_buf() {
			Ok(buf) => buf,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e.into()),
		};
		let Some(&byte) = available.first() else {
			return Err(DecodeError::Truncated);
		};
		reader.consume(1);
		return Ok(byte);
	}
}

/// Drop exactly `n` bytes from the reader.
pub(crate) fn discard<R: BufRead>(reader: &mut R, mut n: usize) -> Result<(), DecodeError> {
	while n > 0 {
		let available = match reader.fill_buf() {
			Ok(buf) => buf,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e.into()),
		};
		if available.is_empty() {
			return Err(DecodeError::Truncated);
		}
		let step = available.len().min(n);
		reader.consume(step);
		n -= step;
	}
	Ok(())
}

/// Stream one line through `sink`, chunk by chunk, as it sits in the reader's
/// buffer.
///
/// The line ends at the first CR; the CR and the single byte after it are
/// consumed but never handed to `sink`. A line longer than `max_size` fails
/// with `SizeLimit` whether or not its terminator was seen.
pub(crate) fn scan_line<R, F>(reader: &mut R, max_size: usize, mut sink: F) -> Result<(), DecodeError>
where
	R: BufRead,
	F: FnMut(&[u8]) -> Result<(), DecodeError>,
{
	let mut scanned = 0usize;
	loop {
		let available = match reader.fill_buf() {
			Ok(buf) => buf,
			Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e.into()),
		};
		if available.is_empty() {
			return Err(DecodeError::Truncated);
		}

		let (chunk, found) = match memchr(CR, available) {
			Some(pos) => (&available[..pos], true),
			None => (available, false),
		};
		scanned += chunk.len();
		if scanned > max_size {
			return Err(DecodeError::SizeLimit {
				len: scanned,
				max: max_size,
			});
		}
		sink(chunk)?;

		let used = chunk.len() + usize::from(found);
		reader.consume(used);
		if found {
			break;
		}
	}
	discard(reader, 1)
}
