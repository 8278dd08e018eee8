use std::fs;
use std::io::{
	BufReader,
	BufWriter,
};
use std::path::PathBuf;

use crate::eeprom::{
	self,
	records::{
		self,
		Record,
	},
	Organization,
};
use crate::error::ConfigurationError;
use crate::link::Connector;
use crate::script;
use crate::session::{
	Console,
	SerialSession,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
	/// dump the EEPROM into the data file
	Read,
	/// program the data file into the EEPROM
	Write,
	/// play the script file
	Script,
}

pub fn select_mode(read: bool, write: bool, script: bool) -> Result<Mode, ConfigurationError> {
	let flags = [
		("read", read, Mode::Read),
		("write", write, Mode::Write),
		("script", script, Mode::Script),
	];
	let selected: Vec<(&str, Mode)> = flags
		.iter()
		.filter(|&&(_, set, _)| set)
		.map(|&(name, _, mode)| (name, mode))
		.collect();

	match selected.as_slice() {
		[] => Err(ConfigurationError::NoMode),
		[(_, mode)] => Ok(*mode),
		_ => {
			let names: Vec<&str> = selected.iter().map(|&(name, _)| name).collect();
			Err(ConfigurationError::ConflictingModes(names.join(", ")))
		},
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Job {
	pub mode: Mode,
	pub port: String,
	pub data_file: PathBuf,
	pub script_file: PathBuf,
	pub size_code: u32,
	pub organization: Organization,
	/// read back after writing
	pub verify: bool,
}

/// Everything loaded and checked before the port is opened.
enum Prepared {
	Read { address_count: usize },
	Write { records: Vec<Record> },
	Script { lines: Vec<String> },
}

fn prepare(job: &Job) -> crate::AResult<Prepared> {
	Ok(match job.mode {
		Mode::Read => {
			let address_count = eeprom::address_count(job.size_code, job.organization)?;
			info!("Max Addr is {}", address_count);
			Prepared::Read { address_count }
		},
		Mode::Write => {
			let address_count = eeprom::address_count(job.size_code, job.organization)?;
			let path = &job.data_file;
			let records = with_context!(("failed to load data file {}", path.display()), {
				let file = fs::File::open(path)?;
				records::read_records(BufReader::new(file))
			})?;
			if let Some(record) = records.iter().find(|r| usize::from(r.address) >= address_count) {
				warn!(
					"Address 0x{:x} is beyond the {} addresses of the chip",
					record.address, address_count
				);
			}
			Prepared::Write { records }
		},
		Mode::Script => Prepared::Script {
			lines: script::load_script(&job.script_file)?,
		},
	})
}

fn execute<C: Connector>(
	session: &mut SerialSession<C>,
	job: &Job,
	prepared: Prepared,
) -> crate::AResult<()> {
	let config = session.config().clone();

	if config.reset_at_startup {
		session.reset_board()?;
	}

	match prepared {
		Prepared::Read { address_count } => {
			let path = &job.data_file;
			let file = with_context!(("failed to create data file {}", path.display()),
				fs::File::create(path).map_err(failure::Error::from)
			)?;
			eeprom::read_all(session, address_count, &mut BufWriter::new(file))?;
		},
		Prepared::Write { records } => {
			eeprom::write_all(session, &records)?;
			if job.verify {
				eeprom::verify(session, &records)?;
			}
		},
		Prepared::Script { lines } => {
			script::run_script(session, &lines, config.timing.blank_line_delay)?;
		},
	}

	if config.reset_at_end {
		session.reset_board()?;
	}

	Ok(())
}

/// Load inputs, connect, run `job` and close the port again (also when
/// the job fails).
pub fn run<C: Connector>(session: &mut SerialSession<C>, job: &Job) -> crate::AResult<()> {
	let prepared = prepare(job)?;

	session.connect(&job.port)?;
	let result = execute(session, job, prepared);
	session.close();
	result
}
