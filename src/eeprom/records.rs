//! EEPROM data files: one `<address> <value>` record per line.

use std::fmt;
use std::io::{
	self,
	BufRead,
	Write,
};

use crate::error::MalformedData;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Record {
	pub address: u16,
	pub value: u16,
}

impl fmt::Display for Record {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:x} 0x{:x}", self.address, self.value)
	}
}

/// Parse a number the way the Bus Pirate writes them: `0x` hex, `0b`
/// binary or plain decimal.
pub fn parse_number(s: &str) -> Option<u16> {
	let (digits, radix) = if s.starts_with("0x") || s.starts_with("0X") {
		(&s[2..], 16)
	} else if s.starts_with("0b") || s.starts_with("0B") {
		(&s[2..], 2)
	} else {
		(s, 10)
	};
	if digits.is_empty() || digits.starts_with('+') {
		return None;
	}
	u16::from_str_radix(digits, radix).ok()
}

pub fn parse_record(line_number: usize, line: &str) -> Result<Record, MalformedData> {
	let malformed = |reason| MalformedData::Record {
		line_number,
		line: line.to_string(),
		reason,
	};

	let tokens: Vec<&str> = line.split_whitespace().collect();
	if tokens.len() != 2 {
		return Err(malformed("expected \"<address> <value>\""));
	}
	let address = parse_number(tokens[0]).ok_or_else(|| malformed("invalid address"))?;
	let value = parse_number(tokens[1]).ok_or_else(|| malformed("invalid value"))?;

	Ok(Record { address, value })
}

/// Reads all records in file order; any malformed line fails the whole file.
pub fn read_records<R: BufRead>(input: R) -> crate::AResult<Vec<Record>> {
	let mut records = Vec::new();
	for (index, line) in input.lines().enumerate() {
		records.push(parse_record(index + 1, &line?)?);
	}
	Ok(records)
}

pub fn write_record<W: Write + ?Sized>(output: &mut W, record: &Record) -> io::Result<()> {
	writeln!(output, "{}", record)
}
