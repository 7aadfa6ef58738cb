//! Decoder limits.

use serde::Deserialize;
use serde::Serialize;

/// Default per-field bound: 512 MiB, the `proto-max-bulk-len` default of
/// Redis and Valkey servers.
pub const DEFAULT_MAX_SIZE: usize = 512 * 1024 * 1024;

/// Limits applied while decoding or relaying a unit.
///
/// `max_size` bounds every individual line, length and count field. It is not
/// a cap on the whole tree: an aggregate with many children that are each under
/// the bound can still use more memory in total, and nesting depth is limited
/// only by the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
	pub max_size: usize,
}

impl Default for DecodeConfig {
	fn default() -> Self {
		Self::new()
	}
}

impl DecodeConfig {
	pub const fn new() -> Self {
		Self {
			max_size: DEFAULT_MAX_SIZE,
		}
	}

	/// Set the per-field bound.
	pub const fn max_size(mut self, max_size: usize) -> Self {
		self.max_size = max_size;
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default() {
		assert_eq!(DecodeConfig::default().max_size, DEFAULT_MAX_SIZE);
		assert_eq!(DecodeConfig::new().max_size(64).max_size, 64);
	}

	#[test]
	fn test_deserialize() {
		let config: DecodeConfig = serde_json::from_str(r#"{"max_size": 1024}"#).unwrap();
		assert_eq!(config.max_size, 1024);

		// Missing fields fall back to defaults
		let config: DecodeConfig = serde_json::from_str("{}").unwrap();
		assert_eq!(config, DecodeConfig::default());
	}
}
