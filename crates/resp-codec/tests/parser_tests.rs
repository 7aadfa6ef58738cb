//! Integration tests for the RESP decoder

mod common;

use std::io;
use std::io::BufReader;
use std::io::Read;

use bytes::Bytes;
use bytes::BytesMut;
use resp_codec::DecodeConfig;
use resp_codec::DecodeError;
use resp_codec::Decoder;
use resp_codec::ErrorClass;
use resp_codec::RespValue;
use rstest::rstest;

const MAX: usize = 64 * 1024;

#[test]
fn test_decode_fixtures_from_buffer() {
	for fixture in common::fixtures() {
		let value = resp_codec::decode(Bytes::from_static(fixture.wire), MAX)
			.unwrap_or_else(|e| panic!("{}: {e}", fixture.name));
		assert_eq!(value, fixture.value, "{}", fixture.name);
	}
}

#[test]
fn test_decode_fixtures_from_reader() {
	for capacity in [1, 2, 7, 4096] {
		for fixture in common::fixtures() {
			let mut reader = BufReader::with_capacity(capacity, fixture.wire);
			let value = resp_codec::decode_from(&mut reader, MAX)
				.unwrap_or_else(|e| panic!("{} (capacity {capacity}): {e}", fixture.name));
			assert_eq!(value, fixture.value, "{} (capacity {capacity})", fixture.name);
		}
	}
}

#[test]
fn test_decode_fixtures_back_to_back_from_reader() {
	let fixtures = common::fixtures();
	let wire: Vec<u8> = fixtures.iter().flat_map(|f| f.wire.iter().copied()).collect();
	let mut reader = BufReader::with_capacity(5, &wire[..]);

	for fixture in &fixtures {
		let value = resp_codec::decode_from(&mut reader, MAX).unwrap();
		assert_eq!(value, fixture.value, "{}", fixture.name);
	}
	assert!(matches!(
		resp_codec::decode_from(&mut reader, MAX),
		Err(DecodeError::Truncated)
	));
}

#[test]
fn test_decode_fixtures_as_frames() {
	let decoder = Decoder::new(DecodeConfig::new().max_size(MAX));
	let fixtures = common::fixtures();
	let mut buf = BytesMut::new();
	for fixture in &fixtures {
		buf.extend_from_slice(fixture.wire);
	}

	for fixture in &fixtures {
		let value = decoder.decode_frame(&mut buf).unwrap();
		assert_eq!(value.as_ref(), Some(&fixture.value), "{}", fixture.name);
	}
	assert!(buf.is_empty());
}

#[test]
fn test_decode_frame_byte_by_byte() {
	let decoder = Decoder::default();
	let wire = b"*2\r\n$5\r\nhello\r\n%1\r\n+k\r\n,2.5e0\r\n";
	let mut buf = BytesMut::new();

	for (i, byte) in wire.iter().enumerate() {
		buf.extend_from_slice(&[*byte]);
		let result = decoder.decode_frame(&mut buf).unwrap();
		if i + 1 < wire.len() {
			assert_eq!(result, None, "complete after {} bytes", i + 1);
		} else {
			assert_eq!(
				result,
				Some(RespValue::Array(vec![
					RespValue::bulk_string("hello"),
					RespValue::map([(RespValue::simple_string("k"), RespValue::Double(2.5))]),
				]))
			);
		}
	}
}

#[test]
fn test_parse_redis_set_command() {
	let value = resp_codec::decode_slice(b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n", MAX).unwrap();

	match value {
		RespValue::Array(arr) => {
			assert_eq!(arr.len(), 3);
			assert_eq!(arr[0].as_str(), Some("SET"));
			assert_eq!(arr[1].as_str(), Some("key"));
			assert_eq!(arr[2].as_str(), Some("value"));
		}
		_ => panic!("Expected array"),
	}
}

#[test]
fn test_map_with_n_pairs_decodes_2n_children() {
	let mut wire = b"%3\r\n".to_vec();
	for i in 0..3 {
		wire.extend_from_slice(format!("+k{i}\r\n:{i}\r\n").as_bytes());
	}
	let value = resp_codec::decode_slice(&wire, MAX).unwrap();
	let pairs = value.as_map().unwrap();
	assert_eq!(pairs.len(), 3);
	for (i, (key, val)) in pairs.iter().enumerate() {
		assert_eq!(key.as_str(), Some(format!("k{i}").as_str()));
		assert_eq!(val.as_integer(), Some(i as i64));
	}

	// One value short of 2N children
	wire.truncate(wire.len() - b":2\r\n".len());
	assert!(matches!(
		resp_codec::decode_slice(&wire, MAX),
		Err(DecodeError::Truncated)
	));
}

#[rstest]
#[case(b"$-1\r\n")]
#[case(b"!-1\r\n")]
#[case(b"=-1\r\n")]
#[case(b"*-1\r\n")]
#[case(b"~-1\r\n")]
#[case(b">-1\r\n")]
fn test_null_length_decodes_to_null(#[case] input: &[u8]) {
	assert!(resp_codec::decode_slice(input, MAX).unwrap().is_null());
}

#[rstest]
#[case(b"$-2\r\n")]
#[case(b"!-3\r\n")]
#[case(b"=-100\r\n")]
#[case(b"*-2\r\n")]
#[case(b"~-2\r\n")]
#[case(b">-9223372036854775808\r\n")]
fn test_length_below_null_is_invalid(#[case] input: &[u8]) {
	let err = resp_codec::decode_slice(input, MAX).unwrap_err();
	assert!(matches!(err, DecodeError::BadLength(_)), "{err:?}");
	assert_eq!(err.class(), ErrorClass::Invalid);
}

#[rstest]
#[case(b"$9\r\n")]
#[case(b"!9\r\n")]
#[case(b"=9\r\n")]
#[case(b"*9\r\n")]
#[case(b"~9\r\n")]
#[case(b">9\r\n")]
#[case(b"%9\r\n")]
fn test_length_over_max_size_is_size_limit(#[case] input: &[u8]) {
	let err = resp_codec::decode_slice(input, 8).unwrap_err();
	assert!(matches!(err, DecodeError::SizeLimit { len: 9, max: 8 }), "{err:?}");
	assert_eq!(err.class(), ErrorClass::SizeLimit);
}

#[test]
fn test_size_limit_applies_to_lines() {
	let err = resp_codec::decode_slice(b"+0123456789\r\n", 8).unwrap_err();
	assert_eq!(err.class(), ErrorClass::SizeLimit);

	let mut reader = BufReader::with_capacity(3, &b"(0123456789\r\n"[..]);
	let err = resp_codec::decode_from(&mut reader, 8).unwrap_err();
	assert_eq!(err.class(), ErrorClass::SizeLimit);
}

#[test]
fn test_verbatim_of_length_three_is_bulk_string() {
	let value = resp_codec::decode_slice(b"=3\r\nabc\r\n", MAX).unwrap();
	assert_eq!(value, RespValue::BulkString(Bytes::from_static(b"abc")));
}

#[test]
fn test_empty_verbatim_string() {
	let value = resp_codec::decode_slice(b"=4\r\ntxt:\r\n", MAX).unwrap();
	assert_eq!(value.as_verbatim(), Some((b"txt", &Bytes::new())));
}

#[test]
fn test_integer_overflow_is_invalid() {
	let input = b":-12333333333333333333333333333333333333333333333333333333333333\r\n";
	let err = resp_codec::decode_slice(input, MAX).unwrap_err();
	assert!(matches!(err, DecodeError::BadInteger(_)));
}

#[rstest]
#[case(b":12a\r\n")]
#[case(b":\r\n")]
#[case(b"$abc\r\n")]
#[case(b"*1.5\r\n")]
fn test_malformed_numbers(#[case] input: &[u8]) {
	let err = resp_codec::decode_slice(input, MAX).unwrap_err();
	assert!(matches!(err, DecodeError::BadInteger(_)), "{err:?}");
}

#[test]
fn test_trailing_data_after_unit() {
	let err = resp_codec::decode_slice(b":1\r\n:2\r\n", MAX).unwrap_err();
	assert!(matches!(err, DecodeError::TrailingData(4)));
}

#[test]
fn test_nested_error_aborts_whole_tree() {
	let err = resp_codec::decode_slice(b"*3\r\n:1\r\n*1\r\n#?\r\n:3\r\n", MAX).unwrap_err();
	assert!(matches!(err, DecodeError::BadBoolean(b'?')));
}

#[test]
fn test_decoded_tree_outlives_input_handle() {
	let value = {
		let wire = Bytes::from(b"*1\r\n$3\r\nabc\r\n".to_vec());
		resp_codec::decode(wire, MAX).unwrap()
	};
	assert_eq!(value.as_array().unwrap()[0].as_str(), Some("abc"));
}

#[rstest]
#[case(b"$000000000000000000000000000000000005\r\nhello\r\n")]
#[case(b"*00000000000000000000000000000000000002\r\n:1\r\n:2\r\n")]
#[case(b"%+000000000000000000000000000000000001\r\n+k\r\n_\r\n")]
#[case(b"~-00000000000000000000000000000000000001\r\n")]
fn test_zero_padded_lengths_frame_like_decode(#[case] wire: &[u8]) {
	let expected = resp_codec::decode_slice(wire, MAX).unwrap();

	let mut buf = BytesMut::from(wire);
	let framed = Decoder::default().decode_frame(&mut buf).unwrap();
	assert_eq!(framed, Some(expected));
	assert!(buf.is_empty());

	let mut reader = wire;
	let mut out = Vec::new();
	resp_codec::copy_unit(&mut reader, &mut out, MAX).unwrap();
	assert_eq!(out, wire);
}

#[rstest]
#[case(b"$-1\r\n", 0, RespValue::Null)]
#[case(b"*-1\r\n", 1, RespValue::Null)]
#[case(b"$0\r\n\r\n", 0, RespValue::BulkString(Bytes::new()))]
#[case(b"*0\r\n", 0, RespValue::Array(vec![]))]
#[case(b"%0\r\n", 0, RespValue::Map(vec![]))]
#[case(b":-9223372036854775808\r\n", 0, RespValue::Integer(i64::MIN))]
#[case(b"$1\r\na\r\n", 1, RespValue::bulk_string("a"))]
fn test_tiny_max_size_keeps_numeric_lines(
	#[case] wire: &[u8],
	#[case] max_size: usize,
	#[case] expected: RespValue,
) {
	assert_eq!(resp_codec::decode_slice(wire, max_size).unwrap(), expected);

	let mut reader = BufReader::with_capacity(2, wire);
	assert_eq!(resp_codec::decode_from(&mut reader, max_size).unwrap(), expected);

	let mut buf = BytesMut::from(wire);
	let decoder = Decoder::new(DecodeConfig::new().max_size(max_size));
	assert_eq!(decoder.decode_frame(&mut buf).unwrap(), Some(expected));
}

#[test]
fn test_tiny_max_size_still_bounds_values() {
	assert!(matches!(
		resp_codec::decode_slice(b"$2\r\nab\r\n", 1),
		Err(DecodeError::SizeLimit { len: 2, max: 1 })
	));
	assert!(matches!(
		resp_codec::decode_slice(b"+ab\r\n", 1),
		Err(DecodeError::SizeLimit { len: 2, max: 1 })
	));
}

/// Serves `data`, then fails every later read with `ConnectionReset`.
struct ResetAfter<'a> {
	data: &'a [u8],
}

impl Read for ResetAfter<'_> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.data.is_empty() {
			return Err(io::Error::from(io::ErrorKind::ConnectionReset));
		}
		let n = buf.len().min(self.data.len());
		buf[..n].copy_from_slice(&self.data[..n]);
		self.data = &self.data[n..];
		Ok(n)
	}
}

#[rstest]
#[case(b"$10\r\nhello")]
#[case(b"+hel")]
#[case(b"*2\r\n:1\r\n")]
#[case(b"$1")]
fn test_reader_failure_surfaces_as_io(#[case] data: &[u8]) {
	let mut reader = BufReader::with_capacity(4, ResetAfter { data });
	let err = resp_codec::decode_from(&mut reader, MAX).unwrap_err();
	assert!(
		matches!(&err, DecodeError::Io(e) if e.kind() == io::ErrorKind::ConnectionReset),
		"{err:?}"
	);
	assert_eq!(err.class(), ErrorClass::Io);

	let mut reader = BufReader::with_capacity(4, ResetAfter { data });
	let err = resp_codec::copy_unit(&mut reader, &mut io::sink(), MAX).unwrap_err();
	assert_eq!(err.class(), ErrorClass::Io);
}
