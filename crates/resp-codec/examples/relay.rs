//! Split a fragmented byte stream into RESP units, relay each one to an
//! output stream, and decode a copy of it.

use std::io::BufReader;

use bytes::BytesMut;
use resp_codec::DecodeConfig;
use resp_codec::Decoder;
use resp_codec::RespEncoder;
use resp_codec::RespError;
use resp_codec::RespValue;
use resp_codec::StreamCopier;

fn main() -> Result<(), RespError> {
	println!("--- RESP Relay Example ---");

	// Simulate a TCP stream with fragmented data:
	// - A Simple String: "+OK\r\n"
	// - An Integer: ":1000\r\n"
	// - An Array: "*2\r\n$3\r\nSET\r\n$3\r\nkey\r\n"
	// - A RESP3 Map: "%1\r\n+proto\r\n:3\r\n"
	let data_chunks = vec![
		b"+O".as_slice(),
		b"K\r\n:1".as_slice(),
		b"00".as_slice(),
		b"0\r\n*2\r\n$3\r\nSE".as_slice(),
		b"T\r\n$3\r\nk".as_slice(),
		b"ey\r\n%1\r\n+pro".as_slice(),
		b"to\r\n:3\r\n".as_slice(),
	];

	let config = DecodeConfig::new().max_size(1024);
	let decoder = Decoder::new(config);
	let mut buffer = BytesMut::new();

	println!("--- Framing ---");
	for (i, chunk) in data_chunks.iter().enumerate() {
		println!("[Stream] Received chunk {}: {:?}", i, String::from_utf8_lossy(chunk));
		buffer.extend_from_slice(chunk);

		while let Some(value) = decoder.decode_frame(&mut buffer)? {
			println!("[Decoder] Complete: {:?}", value);
		}
		println!("[Decoder] Waiting for more data ({} bytes buffered)", buffer.len());
	}

	println!("\n--- Relaying ---");
	let wire: Vec<u8> = data_chunks.concat();
	let copier = StreamCopier::new(config);
	let mut reader = BufReader::with_capacity(4, wire.as_slice());
	let mut relayed = Vec::new();
	for _ in 0..4 {
		let written = copier.copy_unit(&mut reader, &mut relayed)?;
		println!("[Copier] Relayed unit of {} bytes", written);
	}
	assert_eq!(relayed, wire);

	println!("\n--- Encoding ---");
	let reply = RespValue::map([(RespValue::simple_string("server"), RespValue::from("resp-codec"))]);
	let encoded = reply.encode()?;
	println!("[Encoder] {:?}", String::from_utf8_lossy(&encoded));

	Ok(())
}
