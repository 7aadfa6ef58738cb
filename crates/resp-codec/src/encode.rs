//! RESP encoder.
//!
//! Output is canonical: CRLF terminators, `_\r\n` for every null, and
//! scientific notation for finite doubles (`1.23` becomes `,1.23e0\r\n`). The
//! exact output length is computed before anything is written, so a buffer
//! that is too small is left untouched.

use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;

use crate::RespValue;
use crate::error::EncodeError;
use crate::utils::*;

/// Trait for encoding RESP values.
pub trait RespEncoder {
	/// Exact number of bytes [`RespEncoder::encode_to`] writes.
	fn encoded_len(&self) -> usize;

	/// Append the encoding to `buf`, or fail without writing if it does not fit.
	fn encode_to<B: BufMut>(&self, buf: &mut B) -> Result<(), EncodeError>;

	/// Encode into a fresh buffer.
	fn encode(&self) -> Result<Bytes, EncodeError> {
		let mut buf = BytesMut::with_capacity(self.encoded_len());
		self.encode_to(&mut buf)?;
		Ok(buf.freeze())
	}

	/// Encode into the front of `out` and return the number of bytes written.
	fn encode_into(&self, out: &mut [u8]) -> Result<usize, EncodeError> {
		let available = out.len();
		let mut cursor = out;
		self.encode_to(&mut cursor)?;
		Ok(available - cursor.len())
	}
}

impl RespEncoder for RespValue {
	fn encoded_len(&self) -> usize {
		match self {
			RespValue::SimpleString(s) | RespValue::Error(s) | RespValue::BigNumber(s) => {
				line_len(s.len())
			}
			RespValue::Integer(i) => line_len(Literal::integer(*i).len()),
			RespValue::BulkString(s) | RespValue::BulkError(s) => blob_len(s.len()),
			RespValue::VerbatimString { data, .. } => blob_len(data.len() + 4),
			RespValue::Array(items) | RespValue::Set(items) | RespValue::Push(items) => {
				line_len(Literal::length(items.len()).len())
					+ items.iter().map(RespEncoder::encoded_len).sum::<usize>()
			}
			RespValue::Map(pairs) => {
				line_len(Literal::length(pairs.len()).len())
					+ pairs
						.iter()
						.map(|(k, v)| k.encoded_len() + v.encoded_len())
						.sum::<usize>()
			}
			RespValue::Null => line_len(0),
			RespValue::Boolean(_) => line_len(1),
			RespValue::Double(d) => line_len(Literal::double(*d).len()),
		}
	}

	fn encode_to<B: BufMut>(&self, buf: &mut B) -> Result<(), EncodeError> {
		let needed = self.encoded_len();
		let available = buf.remaining_mut();
		if needed > available {
			return Err(EncodeError::Capacity { needed, available });
		}
		write_value(buf, self);
		Ok(())
	}
}

/// Tag, content and CRLF.
#[inline]
fn line_len(content: usize) -> usize {
	1 + content + CRLF.len()
}

/// Length line plus payload and CRLF.
#[inline]
fn blob_len(payload: usize) -> usize {
	line_len(Literal::length(payload).len()) + payload + CRLF.len()
}

fn write_value<B: BufMut>(buf: &mut B, value: &RespValue) {
	match value {
		RespValue::SimpleString(s) => encode_line(buf, SIMPLE_STRING, s),
		RespValue::Error(e) => encode_line(buf, ERROR, e),
		RespValue::BigNumber(n) => encode_line(buf, BIG_NUMBER, n),
		RespValue::Integer(i) => encode_line(buf, INTEGER, Literal::integer(*i).as_bytes()),
		RespValue::Double(d) => encode_line(buf, DOUBLE, Literal::double(*d).as_bytes()),
		RespValue::BulkString(s) => encode_blob(buf, BULK_STRING, s),
		RespValue::BulkError(e) => encode_blob(buf, BULK_ERROR, e),
		RespValue::VerbatimString { format, data } => encode_verbatim_string(buf, format, data),
		RespValue::Array(items) => encode_sequence(buf, ARRAY, items),
		RespValue::Set(items) => encode_sequence(buf, SET, items),
		RespValue::Push(items) => encode_sequence(buf, PUSH, items),
		RespValue::Map(pairs) => encode_map(buf, pairs),
		RespValue::Null => encode_line(buf, NULL, b""),
		RespValue::Boolean(b) => encode_line(buf, BOOLEAN, if *b { b"t" } else { b"f" }),
	}
}

#[inline]
fn encode_line<B: BufMut>(buf: &mut B, marker: u8, content: &[u8]) {
	buf.put_u8(marker);
	buf.put_slice(content);
	buf.put_slice(CRLF);
}

#[inline]
fn encode_length<B: BufMut>(buf: &mut B, marker: u8, length: usize) {
	encode_line(buf, marker, Literal::length(length).as_bytes());
}

#[inline]
fn encode_blob<B: BufMut>(buf: &mut B, marker: u8, data: &[u8]) {
	encode_length(buf, marker, data.len());
	buf.put_slice(data);
	buf.put_slice(CRLF);
}

#[inline]
fn encode_verbatim_string<B: BufMut>(buf: &mut B, format: &[u8; 3], data: &[u8]) {
	encode_length(buf, VERBATIM_STRING, data.len() + 4);
	buf.put_slice(format);
	buf.put_u8(b':');
	buf.put_slice(data);
	buf.put_slice(CRLF);
}

fn encode_sequence<B: BufMut>(buf: &mut B, marker: u8, items: &[RespValue]) {
	encode_length(buf, marker, items.len());
	for item in items {
		write_value(buf, item);
	}
}

fn encode_map<B: BufMut>(buf: &mut B, pairs: &[(RespValue, RespValue)]) {
	encode_length(buf, MAP, pairs.len());
	for (key, value) in pairs {
		write_value(buf, key);
		write_value(buf, value);
	}
}
