use std::io::{
	self,
	Read,
	Write,
};
use std::time::Instant;

use serialport::SerialPort;

use super::{
	Connector,
	Link,
	PortSettings,
};
use crate::error::ConnectionError;

pub struct SerialLink {
	port: Box<dyn SerialPort>,
	// read error hit after part of a line arrived; reported by the next read
	pending_error: Option<io::Error>,
}

impl SerialLink {
	pub fn new(port: Box<dyn SerialPort>) -> Self {
		SerialLink {
			port,
			pending_error: None,
		}
	}

	pub fn open(settings: &PortSettings) -> Result<Self, ConnectionError> {
		let port = serialport::new(settings.port.as_str(), settings.baud_rate)
			.timeout(settings.byte_timeout)
			.open()
			.map_err(|e| ConnectionError::Open {
				port: settings.port.clone(),
				reason: e.to_string(),
			})?;

		Ok(SerialLink::new(port))
	}
}

fn decode_line(raw: &[u8]) -> String {
	String::from_utf8_lossy(raw).trim_end_matches(|c: char| c == '\r' || c == '\n').to_string()
}

/// Appends bytes to `raw` up to and including the next `\n`. Stops early
/// when a single read times out or `deadline` passed; on errors `raw` keeps
/// what arrived before.
fn read_raw_line<R>(reader: &mut R, raw: &mut Vec<u8>, deadline: Instant) -> io::Result<()>
where
	R: Read + ?Sized,
{
	let mut byte = [0u8];

	while Instant::now() < deadline {
		match reader.read(&mut byte) {
			Ok(0) => break,
			Ok(_) => {
				raw.push(byte[0]);
				if byte[0] == b'\n' {
					break;
				}
			},
			Err(ref e) if e.kind() == io::ErrorKind::TimedOut => break,
			Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
			Err(e) => return Err(e),
		}
	}

	Ok(())
}

impl Link for SerialLink {
	fn write_line(&mut self, line: &str) -> io::Result<()> {
		let mut raw = Vec::with_capacity(line.len() + 1);
		raw.extend_from_slice(line.as_bytes());
		raw.push(b'\n');
		self.port.write_all(&raw)?;
		self.port.flush()
	}

	// a timeout in the middle of a line returns the partial line (prompts
	// aren't newline terminated)
	fn read_line(&mut self, deadline: Instant) -> io::Result<Option<String>> {
		if let Some(e) = self.pending_error.take() {
			return Err(e);
		}

		let mut raw = Vec::new();
		if let Err(e) = read_raw_line(&mut *self.port, &mut raw, deadline) {
			if raw.is_empty() {
				return Err(e);
			}
			self.pending_error = Some(e);
		}

		if raw.is_empty() {
			Ok(None)
		} else {
			Ok(Some(decode_line(&raw)))
		}
	}
}

pub struct SerialConnector;

impl Connector for SerialConnector {
	type Link = SerialLink;

	fn open(&mut self, settings: &PortSettings) -> Result<Self::Link, ConnectionError> {
		SerialLink::open(settings)
	}
}
