//! # resp-codec - Redis Serialization Protocol codec
//!
//! Decoding, encoding and structural relaying of RESP2 and RESP3 units, the
//! wire format spoken by Redis and Valkey compatible servers.
//!
//! ## Features
//!
//! - **All 14 wire types**: RESP2 and RESP3, including both null encodings
//! - **Zero-copy decoding**: payloads are `Bytes` slices of the input buffer
//! - **Bounded fields**: every line, length and count is checked against a
//!   caller-supplied `max_size` before anything is allocated for it
//! - **Canonical encoding** into growable or fixed-size buffers
//! - **Stream copying**: forward exactly one unit from a reader to a writer
//!   without building a tree
//!
//! ## Example
//!
//! ```rust
//! use bytes::Bytes;
//! use resp_codec::RespEncoder;
//! use resp_codec::RespValue;
//!
//! let value = resp_codec::decode(Bytes::from_static(b":-123\r\n"), 1024).unwrap();
//! assert_eq!(value, RespValue::Integer(-123));
//! assert_eq!(&value.encode().unwrap()[..], b":-123\r\n");
//! ```
//!
//! ## Limits
//!
//! `max_size` applies to each field on its own. A wide or deep aggregate whose
//! fields each pass the bound can still use unbounded memory in total, and
//! decoding recurses once per nesting level with no depth cap, so a deeply
//! nested input can exhaust the stack before any bound is hit.
//!
//! Length, count and integer lines are bounded by the larger of `max_size` and
//! the 20 bytes an `i64` needs, so null markers and zero lengths decode under
//! any limit.

mod arena;
mod config;
mod copy;
mod encode;
mod error;
mod parser;
mod types;
mod utils;

pub use config::DEFAULT_MAX_SIZE;
pub use config::DecodeConfig;
pub use copy::StreamCopier;
pub use copy::copy_unit;
pub use encode::RespEncoder;
pub use error::DecodeError;
pub use error::EncodeError;
pub use error::ErrorClass;
pub use error::RespError;
pub use parser::Decoder;
pub use parser::decode;
pub use parser::decode_from;
pub use parser::decode_slice;
pub use types::RespValue;
