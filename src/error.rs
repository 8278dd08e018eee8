use failure::Fail;

#[derive(Debug, Fail)]
pub enum ConnectionError {
	#[fail(display = "failed to open serial port {}: {}", port, reason)]
	Open {
		port: String,
		reason: String,
	},
	#[fail(display = "serial port not open")]
	NotConnected,
}

/// Usage errors; all of them are detected before any device I/O.
#[derive(Debug, Fail)]
pub enum ConfigurationError {
	#[fail(display = "invalid EEPROM size {} (supported: 46, 56, 66)", _0)]
	InvalidSize(u32),
	#[fail(display = "no mode set (use -r, -w or -x)")]
	NoMode,
	#[fail(display = "only one mode allowed, got: {}", _0)]
	ConflictingModes(String),
}

#[derive(Debug, Fail)]
pub enum MalformedData {
	#[fail(display = "unexpected response for address 0x{:x}: {:?}", address, line)]
	Capture {
		address: u16,
		line: String,
	},
	#[fail(display = "line {}: {} ({:?})", line_number, reason, line)]
	Record {
		line_number: usize,
		line: String,
		reason: &'static str,
	},
}
