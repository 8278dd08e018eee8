#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

extern crate buspirate_scripting;
use buspirate_scripting::*;

use std::path::PathBuf;
use std::process::exit;
use std::time::Instant;

use buspirate_scripting::config::defaults;
use buspirate_scripting::eeprom::Organization;
use buspirate_scripting::link::SerialConnector;
use buspirate_scripting::orchestrator::{
	self,
	Job,
};

fn get_param_or<T>(matches: &clap::ArgMatches, name: &str, default: T) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(default),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg SCRIPT: "script file played with --script (default: script.txt)")
		(@arg comPort: -c --comPort +takes_value "serial port of the Bus Pirate (default: /dev/ttyUSB0)")
		(@arg read: -r --read "read the EEPROM into the data file")
		(@arg write: -w --write "write the data file into the EEPROM")
		(@arg script: -x --script "play the script file")
		(@arg file: -f --file +takes_value "EEPROM data file (default: eeprom.txt)")
		(@arg size: -s --size +takes_value "EEPROM size: 46, 56 or 66 (default: 56)")
		(@arg wide: -o --org "x16 organization (default: x8)")
		(@arg baud: -b --baud +takes_value "baud rate (default: 115200)")
		(@arg verify: --verify "read back after writing")
		(@arg noreset: --noreset "don't reset the board before and after the transfer")
	).get_matches();

	info!("Bus Pirate scripting tool");
	let started = Instant::now();

	let mode = orchestrator::select_mode(
		matches.is_present("read"),
		matches.is_present("write"),
		matches.is_present("script"),
	)?;

	let job = Job {
		mode,
		port: matches.value_of("comPort").unwrap_or(defaults::SERIAL_PORT).to_string(),
		data_file: PathBuf::from(matches.value_of("file").unwrap_or(defaults::DATA_FILE)),
		script_file: PathBuf::from(matches.value_of("SCRIPT").unwrap_or(defaults::SCRIPT_FILE)),
		size_code: get_param_or(&matches, "size", defaults::SIZE_CODE)?,
		organization: Organization::from_wide(matches.is_present("wide")),
		verify: matches.is_present("verify"),
	};

	let mut config = Config::default();
	config.baud_rate = get_param_or(&matches, "baud", defaults::SERIAL_SPEED)?;
	if matches.is_present("noreset") {
		config.reset_at_startup = false;
		config.reset_at_end = false;
	}

	info!("Mode: {:?}", job.mode);
	info!("COM port: {}", job.port);
	match job.mode {
		orchestrator::Mode::Script => info!("Script file: {}", job.script_file.display()),
		_ => {
			info!("Data file: {}", job.data_file.display());
			info!("EEPROM: 93C{} {:?}", job.size_code, job.organization);
		},
	}

	let mut session = SerialSession::new(SerialConnector, config);
	orchestrator::run(&mut session, &job)?;

	info!("Done in {:.1}s", started.elapsed().as_secs_f64());
	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("An error happened, execution interrupted: {}", e);
		exit(1);
	}
}
