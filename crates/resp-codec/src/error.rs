//! Error types for RESP decoding, encoding and stream copying.

use std::io;

use thiserror::Error;

/// Main error type for RESP operations.
#[derive(Error, Debug)]
pub enum RespError {
	/// Error during decoding or stream copying
	#[error("Decode error: {0}")]
	Decode(#[from] DecodeError),

	/// Error during encoding
	#[error("Encode error: {0}")]
	Encode(#[from] EncodeError),
}

/// Errors that can occur while decoding or relaying a RESP unit.
#[derive(Error, Debug)]
pub enum DecodeError {
	/// Unrecognized type marker
	#[error("Invalid type marker: 0x{0:02X}")]
	BadTag(u8),

	/// Malformed or overflowing integer literal (values and length fields)
	#[error("Invalid integer: {0:?}")]
	BadInteger(String),

	/// Malformed double literal
	#[error("Invalid double: {0:?}")]
	BadDouble(String),

	/// Boolean byte other than `t` or `f`
	#[error("Invalid boolean: 0x{0:02X}")]
	BadBoolean(u8),

	/// Verbatim string whose fourth byte is not `:`
	#[error("Verbatim string must have a 3-byte format prefix followed by ':'")]
	BadVerbatim,

	/// Length or count below -1, or a negative map pair count
	#[error("Invalid length: {0}")]
	BadLength(i64),

	/// A length, count or line exceeded the per-field bound
	#[error("Field of {len} bytes exceeds the {max} byte limit")]
	SizeLimit { len: usize, max: usize },

	/// Input ended in the middle of a unit
	#[error("Unexpected end of input")]
	Truncated,

	/// Bytes left over after a complete unit in a bounded buffer
	#[error("{0} trailing bytes after a complete value")]
	TrailingData(usize),

	/// Failure of the underlying reader or writer
	#[error("I/O error: {0}")]
	Io(#[source] io::Error),
}

/// Coarse classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
	/// The peer sent bytes that are not valid RESP.
	Invalid,
	/// The peer declared a field larger than the configured bound.
	SizeLimit,
	/// The byte source or sink failed.
	Io,
}

impl DecodeError {
	pub fn class(&self) -> ErrorClass {
		match self {
			DecodeError::SizeLimit { .. } => ErrorClass::SizeLimit,
			DecodeError::Io(_) => ErrorClass::Io,
			_ => ErrorClass::Invalid,
		}
	}

	/// Returns true if the input ended before the unit was complete.
	#[inline]
	pub fn is_truncated(&self) -> bool {
		matches!(self, DecodeError::Truncated)
	}
}

impl From<io::Error> for DecodeError {
	fn from(e: io::Error) -> Self {
		match e.kind() {
			io::ErrorKind::UnexpectedEof => DecodeError::Truncated,
			_ => DecodeError::Io(e),
		}
	}
}

/// Errors that can occur during RESP encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
	/// Output buffer cannot hold the encoded value; nothing was written
	#[error("Output buffer too small: need {needed} bytes, {available} available")]
	Capacity { needed: usize, available: usize },
}
