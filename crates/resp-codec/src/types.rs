//! RESP data types and value representation.

use bytes::Bytes;

use crate::utils::*;

/// Represents one RESP unit and everything nested inside it.
///
/// Supports both RESP2 and RESP3 types. Byte payloads are `Bytes` views into
/// the allocation scope of the decode that produced them, so a decoded tree is
/// released as a whole when its root is dropped.
///
/// RESP2 null bulk strings and null arrays (`$-1`, `*-1`, ...) are represented
/// by [`RespValue::Null`], the same variant as the RESP3 `_` marker.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
	// RESP2 types
	/// Simple string: `+OK\r\n`
	SimpleString(Bytes),

	/// Error: `-ERR message\r\n`
	Error(Bytes),

	/// Integer: `:1000\r\n`
	Integer(i64),

	/// Bulk string: `$6\r\nfoobar\r\n`
	BulkString(Bytes),

	/// Array: `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`
	Array(Vec<RespValue>),

	/// Null: `$-1\r\n` (RESP2) or `_\r\n` (RESP3)
	Null,

	// RESP3 types
	/// Boolean: `#t\r\n` or `#f\r\n`
	Boolean(bool),

	/// Double: `,3.14\r\n`
	Double(f64),

	/// Big number, kept as its decimal text:
	/// `(3492890328409238509324850943850943825024385\r\n`
	BigNumber(Bytes),

	/// Bulk error: `!21\r\nSYNTAX invalid syntax\r\n`
	BulkError(Bytes),

	/// Verbatim string: `=15\r\ntxt:Some string\r\n`
	///
	/// `data` excludes the `txt:` prefix.
	VerbatimString { format: [u8; 3], data: Bytes },

	/// Map: `%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n`
	///
	/// Pairs keep wire order; duplicate keys are preserved.
	Map(Vec<(RespValue, RespValue)>),

	/// Set: `~5\r\n+orange\r\n+apple\r\n...\r\n`
	Set(Vec<RespValue>),

	/// Push: `>4\r\n+pubsub\r\n+message\r\n...\r\n`
	Push(Vec<RespValue>),
}

impl RespValue {
	/// The wire type marker for this value.
	pub fn tag(&self) -> u8 {
		match self {
			RespValue::SimpleString(_) => SIMPLE_STRING,
			RespValue::Error(_) => ERROR,
			RespValue::Integer(_) => INTEGER,
			RespValue::BulkString(_) => BULK_STRING,
			RespValue::Array(_) => ARRAY,
			RespValue::Null => NULL,
			RespValue::Boolean(_) => BOOLEAN,
			RespValue::Double(_) => DOUBLE,
			RespValue::BigNumber(_) => BIG_NUMBER,
			RespValue::BulkError(_) => BULK_ERROR,
			RespValue::VerbatimString { .. } => VERBATIM_STRING,
			RespValue::Map(_) => MAP,
			RespValue::Set(_) => SET,
			RespValue::Push(_) => PUSH,
		}
	}

	/// Check if the value is an error
	pub fn is_error(&self) -> bool {
		matches!(self, RespValue::Error(_) | RespValue::BulkError(_))
	}

	/// Check if the value is null
	pub fn is_null(&self) -> bool {
		matches!(self, RespValue::Null)
	}

	/// Try to convert to a string slice
	pub fn as_str(&self) -> Option<&str> {
		self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
	}

	/// Try to convert to bytes
	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			RespValue::SimpleString(b)
			| RespValue::BulkString(b)
			| RespValue::VerbatimString { data: b, .. } => Some(b),
			_ => None,
		}
	}

	/// Try to convert to integer
	pub fn as_integer(&self) -> Option<i64> {
		match self {
			RespValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	/// Try to convert to array
	pub fn as_array(&self) -> Option<&[RespValue]> {
		match self {
			RespValue::Array(a) => Some(a),
			_ => None,
		}
	}

	/// Try to convert to boolean
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			RespValue::Boolean(b) => Some(*b),
			_ => None,
		}
	}

	/// Try to convert to double
	pub fn as_double(&self) -> Option<f64> {
		match self {
			RespValue::Double(d) => Some(*d),
			_ => None,
		}
	}

	/// Try to convert to map
	pub fn as_map(&self) -> Option<&[(RespValue, RespValue)]> {
		match self {
			RespValue::Map(m) => Some(m),
			_ => None,
		}
	}

	/// Try to convert to a verbatim string's format tag and payload
	pub fn as_verbatim(&self) -> Option<(&[u8; 3], &Bytes)> {
		match self {
			RespValue::VerbatimString { format, data } => Some((format, data)),
			_ => None,
		}
	}

	/// Convert to String with lossy UTF-8 conversion
	pub fn to_string_lossy(&self) -> Option<String> {
		self.as_bytes()
			.map(|b| String::from_utf8_lossy(b).into_owned())
	}

	/// Try to consume and convert to Vec<RespValue>
	pub fn into_vec(self) -> Option<Vec<RespValue>> {
		match self {
			RespValue::Array(a) | RespValue::Set(a) | RespValue::Push(a) => Some(a),
			_ => None,
		}
	}

	// Convenience constructors

	/// Create a simple string value
	pub fn simple_string(s: impl Into<Bytes>) -> Self {
		RespValue::SimpleString(s.into())
	}

	/// Create a bulk string value
	pub fn bulk_string(s: impl Into<Bytes>) -> Self {
		RespValue::BulkString(s.into())
	}

	/// Create an error value
	pub fn error(e: impl Into<Bytes>) -> Self {
		RespValue::Error(e.into())
	}

	/// Create an integer value
	pub fn integer(i: i64) -> Self {
		RespValue::Integer(i)
	}

	/// Create an array value from an iterator
	pub fn array(items: impl IntoIterator<Item = RespValue>) -> Self {
		RespValue::Array(items.into_iter().collect())
	}

	/// Create a map value from an iterator of pairs, keeping their order
	pub fn map(pairs: impl IntoIterator<Item = (RespValue, RespValue)>) -> Self {
		RespValue::Map(pairs.into_iter().collect())
	}

	/// Create a verbatim string value
	pub fn verbatim(format: [u8; 3], data: impl Into<Bytes>) -> Self {
		RespValue::VerbatimString {
			format,
			data: data.into(),
		}
	}

	/// Create a null value
	pub fn null() -> Self {
		RespValue::Null
	}
}

// Convenient From implementations
impl From<&str> for RespValue {
	fn from(s: &str) -> Self {
		RespValue::BulkString(Bytes::copy_from_slice(s.as_bytes()))
	}
}

impl From<String> for RespValue {
	fn from(s: String) -> Self {
		RespValue::BulkString(Bytes::from(s))
	}
}

impl From<&[u8]> for RespValue {
	fn from(b: &[u8]) -> Self {
		RespValue::BulkString(Bytes::copy_from_slice(b))
	}
}

impl From<Vec<u8>> for RespValue {
	fn from(v: Vec<u8>) -> Self {
		RespValue::BulkString(Bytes::from(v))
	}
}

impl From<i64> for RespValue {
	fn from(i: i64) -> Self {
		RespValue::Integer(i)
	}
}

impl From<i32> for RespValue {
	fn from(i: i32) -> Self {
		RespValue::Integer(i64::from(i))
	}
}

impl From<bool> for RespValue {
	fn from(b: bool) -> Self {
		RespValue::Boolean(b)
	}
}

impl From<f64> for RespValue {
	fn from(d: f64) -> Self {
		RespValue::Double(d)
	}
}

impl From<Bytes> for RespValue {
	fn from(b: Bytes) -> Self {
		RespValue::BulkString(b)
	}
}

impl<T: Into<RespValue>> From<Vec<T>> for RespValue {
	fn from(v: Vec<T>) -> Self {
		RespValue::Array(v.into_iter().map(|x| x.into()).collect())
	}
}

impl<T: Into<RespValue>> From<Option<T>> for RespValue {
	fn from(o: Option<T>) -> Self {
		match o {
			Some(v) => v.into(),
			None => RespValue::Null,
		}
	}
}
