use std::io;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

use crate::error::ConnectionError;

mod serial;
#[cfg(test)]
pub mod sim;

pub use self::serial::{
	SerialConnector,
	SerialLink,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PortSettings {
	pub port: String,
	pub baud_rate: u32,
	pub byte_timeout: Duration,
}

/// Line based access to an open Bus Pirate console.
pub trait Link {
	/// send `line` followed by "\n"
	fn write_line(&mut self, line: &str) -> io::Result<()>;

	/// wait for one line; line terminators are stripped. Gives up when no
	/// byte arrives within the byte timeout or `deadline` passed, returning
	/// the partial line (or `None` if nothing arrived).
	fn read_line(&mut self, deadline: Instant) -> io::Result<Option<String>>;

	fn now(&self) -> Instant {
		Instant::now()
	}

	fn sleep(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

pub trait Connector {
	type Link: Link;

	fn open(&mut self, settings: &PortSettings) -> Result<Self::Link, ConnectionError>;
}
