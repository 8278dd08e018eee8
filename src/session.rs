use std::time::Duration;

use crate::channel::CommandChannel;
use crate::config::Config;
use crate::error::ConnectionError;
use crate::link::{
	Connector,
	Link,
	PortSettings,
};

/// Command that makes the Bus Pirate reboot.
pub const RESET_COMMAND: &str = "#";

/// What scripts and EEPROM operations need from a connected Bus Pirate.
pub trait Console {
	fn send(&mut self, command: &str, capture: bool) -> crate::AResult<Option<String>>;

	/// reset and wait for the board to come back
	fn reset_board(&mut self) -> crate::AResult<()>;

	fn pause(&mut self, duration: Duration) -> crate::AResult<()>;
}

pub struct SerialSession<C: Connector> {
	connector: C,
	config: Config,
	link: Option<C::Link>,
}

impl<C: Connector> SerialSession<C> {
	pub fn new(connector: C, config: Config) -> Self {
		SerialSession {
			connector,
			config,
			link: None,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn is_connected(&self) -> bool {
		self.link.is_some()
	}

	pub fn connect(&mut self, port: &str) -> Result<(), ConnectionError> {
		let settings = PortSettings {
			port: port.to_string(),
			baud_rate: self.config.baud_rate,
			byte_timeout: self.config.timing.byte_timeout,
		};

		if self.link.is_some() {
			self.close();
		}

		info!("Opening serial port {} ({} baud)", settings.port, settings.baud_rate);
		match self.connector.open(&settings) {
			Ok(link) => {
				self.link = Some(link);
				info!("Serial port open");
				Ok(())
			},
			Err(e) => {
				error!("ERROR opening serial port: {}", e);
				Err(e)
			},
		}
	}

	pub fn close(&mut self) {
		if self.link.take().is_some() {
			info!("Closing serial port");
		}
	}

	pub fn channel(&mut self) -> Result<CommandChannel<'_, C::Link>, ConnectionError> {
		let timing = self.config.timing;
		match self.link.as_mut() {
			Some(link) => Ok(CommandChannel::new(link, timing)),
			None => Err(ConnectionError::NotConnected),
		}
	}
}

impl<C: Connector> Console for SerialSession<C> {
	fn send(&mut self, command: &str, capture: bool) -> crate::AResult<Option<String>> {
		self.channel()?.send(command, capture)
	}

	fn reset_board(&mut self) -> crate::AResult<()> {
		info!("Resetting board");
		self.send(RESET_COMMAND, false)?;
		let delay = self.config.timing.reset_delay;
		self.pause(delay)
	}

	fn pause(&mut self, duration: Duration) -> crate::AResult<()> {
		match self.link.as_mut() {
			Some(link) => {
				link.sleep(duration);
				Ok(())
			},
			None => Err(ConnectionError::NotConnected.into()),
		}
	}
}
