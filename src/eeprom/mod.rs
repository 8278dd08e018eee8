//! 93xx series serial EEPROMs (93C46, 93C56, 93C66) through the Bus Pirate
//! raw 2-wire mode.
//!
//! The chips are "Microwire": a start bit, a 2-bit opcode, the address and
//! (for writes) the data word are clocked in while CS is high. We don't
//! drive the pins ourselves; every instruction is a raw-bus transaction
//! the Bus Pirate clocks out:
//! - READ:  `[0b110;3 <address>;8 r:0x1;16]`, answered with a `READ` line
//! - WRITE: `[0b101;3 <address>;8 <data>;16]`
//! - EWEN (erase/write enable): `[0b10011000000;11]`
//!
//! Field widths are the device contract, don't touch them.
//!
//! Organization: "narrow" parts are x8, "wide" parts x16, which doubles
//! the number of addresses for the same size code.

mod bus;
pub mod records;

use std::io::Write;

pub use self::bus::Transaction;
pub use self::records::Record;

use crate::error::{
	ConfigurationError,
	MalformedData,
};
use crate::session::Console;

/// Mode menu answers selecting raw 2-wire and turning the power supply on.
pub const SETUP_COMMANDS: [&str; 5] = ["m7", "1", "1", "2", "W"];

const OPCODE_WIDTH: u8 = 3;
const READ_OPCODE: u32 = 0b110;
const WRITE_OPCODE: u32 = 0b101;
const WRITE_ENABLE: u32 = 0b100_1100_0000;
const WRITE_ENABLE_WIDTH: u8 = 11;
const ADDRESS_WIDTH: u8 = 8;
const DATA_WIDTH: u8 = 16;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Organization {
	/// x8
	Narrow,
	/// x16
	Wide,
}

impl Organization {
	pub fn from_wide(wide: bool) -> Self {
		if wide {
			Organization::Wide
		} else {
			Organization::Narrow
		}
	}
}

pub fn address_count(size_code: u32, organization: Organization) -> Result<usize, ConfigurationError> {
	let (narrow, wide) = match size_code {
		46 => (64, 128),
		56 => (128, 256),
		66 => (256, 512),
		_ => return Err(ConfigurationError::InvalidSize(size_code)),
	};
	match organization {
		Organization::Narrow => Ok(narrow),
		Organization::Wide => Ok(wide),
	}
}

pub fn read_transaction(address: u16) -> Transaction {
	Transaction::new()
		.bits(READ_OPCODE, OPCODE_WIDTH)
		.decimal(address.into(), ADDRESS_WIDTH)
		.read(1, DATA_WIDTH)
}

pub fn write_transaction(record: &Record) -> Transaction {
	Transaction::new()
		.bits(WRITE_OPCODE, OPCODE_WIDTH)
		.hex(record.address.into(), ADDRESS_WIDTH)
		.hex(record.value.into(), DATA_WIDTH)
}

pub fn write_enable_transaction() -> Transaction {
	Transaction::new().bits(WRITE_ENABLE, WRITE_ENABLE_WIDTH)
}

pub fn setup_raw_wire<K: Console + ?Sized>(console: &mut K) -> crate::AResult<()> {
	for command in SETUP_COMMANDS.iter() {
		console.send(command, false)?;
	}
	Ok(())
}

/// Data word from a captured "READ[:] <value>" line.
pub fn parse_capture(address: u16, line: &str) -> Result<u16, MalformedData> {
	line.split_whitespace()
		.nth(1)
		.and_then(records::parse_number)
		.ok_or_else(|| MalformedData::Capture {
			address,
			line: line.to_string(),
		})
}

pub fn read_word<K: Console + ?Sized>(console: &mut K, address: u16) -> crate::AResult<u16> {
	let line = console.send(&read_transaction(address).to_string(), true)?.unwrap_or_default();
	Ok(parse_capture(address, &line)?)
}

/// Reads addresses `0..address_count` in order; every record is written to
/// `sink` as soon as it was read.
pub fn read_all<K, W>(
	console: &mut K,
	address_count: usize,
	sink: &mut W,
) -> crate::AResult<Vec<Record>>
where
	K: Console + ?Sized,
	W: Write + ?Sized,
{
	ensure!(address_count <= 1 << 16, "can't address {} words", address_count);

	setup_raw_wire(console)?;

	let mut result = Vec::with_capacity(address_count);
	for address in 0..address_count {
		let address = address as u16;
		let value = read_word(console, address)?;
		let record = Record { address, value };
		records::write_record(sink, &record)?;
		result.push(record);
	}
	sink.flush()?;

	info!("Read {} words", result.len());
	Ok(result)
}

pub fn write_all<K: Console + ?Sized>(console: &mut K, records: &[Record]) -> crate::AResult<()> {
	setup_raw_wire(console)?;
	console.send(&write_enable_transaction().to_string(), false)?;

	for record in records {
		debug!("write {}", record);
		console.send(&write_transaction(record).to_string(), false)?;
	}

	info!("Wrote {} words", records.len());
	Ok(())
}

/// Reads back every record; fails on the first mismatch.
pub fn verify<K: Console + ?Sized>(console: &mut K, records: &[Record]) -> crate::AResult<()> {
	for record in records {
		let value = read_word(console, record.address)?;
		ensure!(value == record.value,
			"Verify failed at 0x{:02x}: expected 0x{:04x}, EEPROM has 0x{:04x}",
			record.address, record.value, value
		);
	}

	info!("Verified {} words", records.len());
	Ok(())
}
