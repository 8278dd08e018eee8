//! Bus Pirate raw-bus command syntax.
//!
//! A transaction is rendered as `[` fields separated by spaces `]`; each
//! field carries its own bit width after a `;`.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Field {
	/// `0b<binary>;<width>`, zero padded to the width
	Bits { value: u32, width: u8 },
	/// `<decimal>;<width>`
	Decimal { value: u32, width: u8 },
	/// `0x<hex>;<width>`
	Hex { value: u32, width: u8 },
	/// `r:0x<count>;<width>`, clock in `count` reads
	Read { count: u32, width: u8 },
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Field::Bits { value, width } => write!(f, "0b{:0w$b};{}", value, width, w = width as usize),
			Field::Decimal { value, width } => write!(f, "{};{}", value, width),
			Field::Hex { value, width } => write!(f, "0x{:x};{}", value, width),
			Field::Read { count, width } => write!(f, "r:0x{:x};{}", count, width),
		}
	}
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Transaction {
	fields: Vec<Field>,
}

impl Transaction {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fixed bit pattern (opcodes); `value` must fit into `width` bits.
	pub fn bits(mut self, value: u32, width: u8) -> Self {
		assert!(width > 0 && width <= 32);
		assert!(width == 32 || value >> width == 0, "0b{:b} doesn't fit into {} bits", value, width);
		self.fields.push(Field::Bits { value, width });
		self
	}

	// the device only clocks out the lowest `width` bits of numbers
	pub fn decimal(mut self, value: u32, width: u8) -> Self {
		self.fields.push(Field::Decimal { value, width });
		self
	}

	pub fn hex(mut self, value: u32, width: u8) -> Self {
		self.fields.push(Field::Hex { value, width });
		self
	}

	pub fn read(mut self, count: u32, width: u8) -> Self {
		self.fields.push(Field::Read { count, width });
		self
	}
}

impl fmt::Display for Transaction {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "[")?;
		for (i, field) in self.fields.iter().enumerate() {
			if i > 0 {
				write!(f, " ")?;
			}
			write!(f, "{}", field)?;
		}
		write!(f, "]")
	}
}
