//! Protocol fixtures shared by the decoder, encoder and copier tests.

#![allow(dead_code)]

use bytes::Bytes;
use resp_codec::RespValue;

/// One unit as it appears on the wire, what it decodes to, and what that value
/// encodes back to.
pub struct Fixture {
	pub name: &'static str,
	pub wire: &'static [u8],
	pub value: RespValue,
	pub canonical: &'static [u8],
}

fn fixture(name: &'static str, wire: &'static [u8], value: RespValue) -> Fixture {
	Fixture {
		name,
		wire,
		value,
		canonical: wire,
	}
}

fn normalized(
	name: &'static str,
	wire: &'static [u8],
	value: RespValue,
	canonical: &'static [u8],
) -> Fixture {
	Fixture {
		name,
		wire,
		value,
		canonical,
	}
}

fn s(text: &'static str) -> Bytes {
	Bytes::from_static(text.as_bytes())
}

pub fn fixtures() -> Vec<Fixture> {
	vec![
		fixture("simple_string", b"+OK\r\n", RespValue::SimpleString(s("OK"))),
		fixture(
			"error",
			b"-ERR unknown command\r\n",
			RespValue::Error(s("ERR unknown command")),
		),
		fixture("integer", b":-123\r\n", RespValue::Integer(-123)),
		fixture("integer_max", b":9223372036854775807\r\n", RespValue::Integer(i64::MAX)),
		fixture("bulk_string", b"$5\r\nhello\r\n", RespValue::BulkString(s("hello"))),
		fixture("bulk_string_empty", b"$0\r\n\r\n", RespValue::BulkString(Bytes::new())),
		fixture(
			"bulk_string_binary",
			b"$4\r\n\r\n\0\xff\r\n",
			RespValue::BulkString(Bytes::from_static(b"\r\n\0\xff")),
		),
		fixture(
			"array",
			b"*2\r\n$5\r\nhello\r\n$5\r\nworld\r\n",
			RespValue::Array(vec![
				RespValue::BulkString(s("hello")),
				RespValue::BulkString(s("world")),
			]),
		),
		fixture("array_empty", b"*0\r\n", RespValue::Array(vec![])),
		fixture("null", b"_\r\n", RespValue::Null),
		normalized("resp2_null_bulk", b"$-1\r\n", RespValue::Null, b"_\r\n"),
		normalized("resp2_null_array", b"*-1\r\n", RespValue::Null, b"_\r\n"),
		normalized("resp2_null_set", b"~-1\r\n", RespValue::Null, b"_\r\n"),
		normalized("resp2_null_push", b">-1\r\n", RespValue::Null, b"_\r\n"),
		normalized("resp2_null_bulk_error", b"!-1\r\n", RespValue::Null, b"_\r\n"),
		normalized("resp2_null_verbatim", b"=-1\r\n", RespValue::Null, b"_\r\n"),
		fixture("boolean_true", b"#t\r\n", RespValue::Boolean(true)),
		fixture("boolean_false", b"#f\r\n", RespValue::Boolean(false)),
		normalized("double", b",1.23\r\n", RespValue::Double(1.23), b",1.23e0\r\n"),
		fixture("double_scientific", b",-2.5e-3\r\n", RespValue::Double(-0.0025)),
		fixture("double_inf", b",inf\r\n", RespValue::Double(f64::INFINITY)),
		fixture("double_neg_inf", b",-inf\r\n", RespValue::Double(f64::NEG_INFINITY)),
		fixture(
			"big_number",
			b"(3492890328409238509324850943850943825024385\r\n",
			RespValue::BigNumber(s("3492890328409238509324850943850943825024385")),
		),
		fixture(
			"bulk_error",
			b"!21\r\nSYNTAX invalid syntax\r\n",
			RespValue::BulkError(s("SYNTAX invalid syntax")),
		),
		fixture(
			"verbatim_string",
			b"=15\r\ntxt:Some string\r\n",
			RespValue::verbatim(*b"txt", s("Some string")),
		),
		fixture("verbatim_empty", b"=4\r\ntxt:\r\n", RespValue::verbatim(*b"txt", Bytes::new())),
		normalized(
			"verbatim_short",
			b"=3\r\nabc\r\n",
			RespValue::BulkString(s("abc")),
			b"$3\r\nabc\r\n",
		),
		fixture(
			"map",
			b"%2\r\n+first\r\n:1\r\n+second\r\n:2\r\n",
			RespValue::Map(vec![
				(RespValue::SimpleString(s("first")), RespValue::Integer(1)),
				(RespValue::SimpleString(s("second")), RespValue::Integer(2)),
			]),
		),
		fixture(
			"set",
			b"~2\r\n+orange\r\n+apple\r\n",
			RespValue::Set(vec![
				RespValue::SimpleString(s("orange")),
				RespValue::SimpleString(s("apple")),
			]),
		),
		fixture(
			"push",
			b">3\r\n$7\r\nmessage\r\n$4\r\nnews\r\n$5\r\nhello\r\n",
			RespValue::Push(vec![
				RespValue::BulkString(s("message")),
				RespValue::BulkString(s("news")),
				RespValue::BulkString(s("hello")),
			]),
		),
		fixture(
			"nested",
			b"*3\r\n%1\r\n+k\r\n*1\r\n:1\r\n~0\r\n_\r\n",
			RespValue::Array(vec![
				RespValue::Map(vec![(
					RespValue::SimpleString(s("k")),
					RespValue::Array(vec![RespValue::Integer(1)]),
				)]),
				RespValue::Set(vec![]),
				RespValue::Null,
			]),
		),
		fixture(
			"hello_reply",
			b"%3\r\n$6\r\nserver\r\n$6\r\nvalkey\r\n$5\r\nproto\r\n:3\r\n$7\r\nmodules\r\n*0\r\n",
			RespValue::Map(vec![
				(RespValue::BulkString(s("server")), RespValue::BulkString(s("valkey"))),
				(RespValue::BulkString(s("proto")), RespValue::Integer(3)),
				(RespValue::BulkString(s("modules")), RespValue::Array(vec![])),
			]),
		),
	]
}
