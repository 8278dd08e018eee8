use std::time::Duration;

pub mod defaults {
	pub const SCRIPT_FILE: &str = "script.txt";
	pub const DATA_FILE: &str = "eeprom.txt";
	pub const SERIAL_PORT: &str = "/dev/ttyUSB0";
	pub const SERIAL_SPEED: u32 = 115_200;
	pub const SIZE_CODE: u32 = 56;

	// all in milliseconds
	pub const SERIAL_TIMEOUT: u64 = 10;
	pub const SERIAL_RESPONSE_TIMEOUT: u64 = 1_000;
	pub const SERIAL_RESPONSE_END_SILENCE: u64 = 100;
	pub const RESET_DELAY: u64 = 1_000;
	pub const SCRIPT_BLANK_LINE_DELAY: u64 = 500;

	pub const RESET_AT_STARTUP: bool = true;
	pub const RESET_AT_END: bool = true;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Timing {
	/// how long a single line read may block
	pub byte_timeout: Duration,
	/// upper bound for a whole command/response exchange
	pub response_timeout: Duration,
	/// gap after the last received line that ends a response
	pub end_silence: Duration,
	pub reset_delay: Duration,
	pub blank_line_delay: Duration,
}

impl Default for Timing {
	fn default() -> Self {
		Timing {
			byte_timeout: Duration::from_millis(defaults::SERIAL_TIMEOUT),
			response_timeout: Duration::from_millis(defaults::SERIAL_RESPONSE_TIMEOUT),
			end_silence: Duration::from_millis(defaults::SERIAL_RESPONSE_END_SILENCE),
			reset_delay: Duration::from_millis(defaults::RESET_DELAY),
			blank_line_delay: Duration::from_millis(defaults::SCRIPT_BLANK_LINE_DELAY),
		}
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Config {
	pub baud_rate: u32,
	pub timing: Timing,
	pub reset_at_startup: bool,
	pub reset_at_end: bool,
}

impl Default for Config {
	fn default() -> Self {
		Config {
			baud_rate: defaults::SERIAL_SPEED,
			timing: Timing::default(),
			reset_at_startup: defaults::RESET_AT_STARTUP,
			reset_at_end: defaults::RESET_AT_END,
		}
	}
}
