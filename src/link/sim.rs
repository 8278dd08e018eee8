//! Simulated Bus Pirate console for tests.
//!
//! Time is virtual: reads without data advance the clock by the byte
//! timeout, sleeps advance it by their duration, nothing actually blocks.

use std::cell::RefCell;
use std::cmp;
use std::collections::{
	BTreeMap,
	VecDeque,
};
use std::io;
use std::rc::Rc;
use std::time::{
	Duration,
	Instant,
};

use super::{
	Connector,
	Link,
	PortSettings,
};
use crate::config::{
	Config,
	Timing,
};
use crate::eeprom::records::parse_number;
use crate::error::ConnectionError;
use crate::session::SerialSession;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Event {
	Open(String),
	Write(String),
	Sleep(Duration),
	Close,
}

/// Lines the device answers with, each with its delay after the command
/// was written.
pub type Responder = Box<dyn FnMut(&str) -> Vec<(Duration, String)>>;

pub fn ms(v: u64) -> Duration {
	Duration::from_millis(v)
}

/// Short timings so virtual time stays readable in assertions.
pub fn test_config() -> Config {
	Config {
		baud_rate: 115_200,
		timing: Timing {
			byte_timeout: ms(10),
			response_timeout: ms(500),
			end_silence: ms(50),
			reset_delay: ms(1000),
			blank_line_delay: ms(200),
		},
		reset_at_startup: true,
		reset_at_end: true,
	}
}

#[derive(Default)]
struct Shared {
	elapsed: Duration,
	events: Vec<Event>,
}

#[derive(Clone)]
pub struct Recorder(Rc<RefCell<Shared>>);

impl Recorder {
	pub fn new() -> Self {
		Recorder(Rc::new(RefCell::new(Shared::default())))
	}

	pub fn events(&self) -> Vec<Event> {
		self.0.borrow().events.clone()
	}

	pub fn writes(&self) -> Vec<String> {
		self.events().into_iter().filter_map(|e| match e {
			Event::Write(line) => Some(line),
			_ => None,
		}).collect()
	}

	pub fn elapsed(&self) -> Duration {
		self.0.borrow().elapsed
	}

	fn push(&self, event: Event) {
		self.0.borrow_mut().events.push(event);
	}
}

pub struct SimLink {
	base: Instant,
	recorder: Recorder,
	byte_timeout: Duration,
	responder: Responder,
	pending: VecDeque<(Duration, String)>,
}

impl SimLink {
	pub fn new(recorder: &Recorder, byte_timeout: Duration, responder: Responder) -> Self {
		SimLink {
			base: Instant::now(),
			recorder: recorder.clone(),
			byte_timeout,
			responder,
			pending: VecDeque::new(),
		}
	}

	/// a device that never answers
	pub fn silent(recorder: &Recorder, byte_timeout: Duration) -> Self {
		Self::new(recorder, byte_timeout, Box::new(|_: &str| Vec::<(Duration, String)>::new()))
	}
}

impl Link for SimLink {
	fn write_line(&mut self, line: &str) -> io::Result<()> {
		self.recorder.push(Event::Write(line.to_string()));
		let now = self.recorder.elapsed();
		let mut replies = (self.responder)(line);
		replies.sort_by_key(|(delay, _)| *delay);
		for (delay, reply) in replies {
			self.pending.push_back((now + delay, reply));
		}
		Ok(())
	}

	fn read_line(&mut self, deadline: Instant) -> io::Result<Option<String>> {
		let mut shared = (self.recorder.0).borrow_mut();
		let deadline = cmp::min(
			shared.elapsed + self.byte_timeout,
			deadline.saturating_duration_since(self.base),
		);
		match self.pending.front() {
			Some(&(arrival, _)) if arrival <= deadline => {
				if arrival > shared.elapsed {
					shared.elapsed = arrival;
				}
				Ok(self.pending.pop_front().map(|(_, line)| line))
			},
			_ => {
				shared.elapsed = deadline;
				Ok(None)
			},
		}
	}

	fn now(&self) -> Instant {
		self.base + self.recorder.elapsed()
	}

	fn sleep(&mut self, duration: Duration) {
		self.recorder.push(Event::Sleep(duration));
		(self.recorder.0).borrow_mut().elapsed += duration;
	}
}

impl Drop for SimLink {
	fn drop(&mut self) {
		self.recorder.push(Event::Close);
	}
}

/// Hands out links built by `factory`; fails to open when it returns `None`.
pub struct SimConnector<F> {
	pub recorder: Recorder,
	factory: F,
}

impl<F> SimConnector<F>
where
	F: FnMut(&Recorder) -> Option<SimLink>,
{
	pub fn new(recorder: &Recorder, factory: F) -> Self {
		SimConnector {
			recorder: recorder.clone(),
			factory,
		}
	}
}

impl<F> Connector for SimConnector<F>
where
	F: FnMut(&Recorder) -> Option<SimLink>,
{
	type Link = SimLink;

	fn open(&mut self, settings: &PortSettings) -> Result<SimLink, ConnectionError> {
		match (self.factory)(&self.recorder) {
			Some(link) => {
				self.recorder.push(Event::Open(settings.port.clone()));
				Ok(link)
			},
			None => Err(ConnectionError::Open {
				port: settings.port.clone(),
				reason: "No such file or directory".to_string(),
			}),
		}
	}
}

/// 93xx EEPROM behind a Bus Pirate in raw 2-wire mode: echoes every
/// command, stores raw-bus writes and answers raw-bus reads with
/// "READ: 0x..".
pub fn eeprom_responder(memory: Rc<RefCell<BTreeMap<u16, u16>>>) -> Responder {
	Box::new(move |command: &str| {
		let mut replies = vec![(ms(1), command.to_string())];
		let fields: Vec<&str> = command
			.trim_start_matches('[')
			.trim_end_matches(']')
			.split_whitespace()
			.map(|f| f.split(';').next().unwrap_or(""))
			.collect();
		match fields.as_slice() {
			["0b110", address, "r:0x1"] => {
				let address = parse_number(address).expect("address");
				let value = memory.borrow().get(&address).cloned().unwrap_or(0xffff);
				replies.push((ms(3), format!("READ: 0x{:x}", value)));
			},
			["0b101", address, value] => {
				let address = parse_number(address).expect("address");
				let value = parse_number(value).expect("value");
				memory.borrow_mut().insert(address, value);
				replies.push((ms(3), format!("WRITE: 0x{:x}", value)));
			},
			_ => (),
		}
		replies.push((ms(5), "RAW2WIRE>".to_string()));
		replies
	})
}

/// Connector handing out one link that answers through `responder`.
pub fn single_link(
	recorder: &Recorder,
	responder: Responder,
) -> SimConnector<impl FnMut(&Recorder) -> Option<SimLink>> {
	let mut responder = Some(responder);
	SimConnector::new(recorder, move |r: &Recorder| {
		responder.take().map(|responder| SimLink::new(r, ms(10), responder))
	})
}

pub fn connected_session(
	responder: Responder,
) -> (SerialSession<impl Connector<Link = SimLink>>, Recorder) {
	let recorder = Recorder::new();
	let mut session = SerialSession::new(single_link(&recorder, responder), test_config());
	session.connect("/dev/ttyUSB0").expect("connect");
	(session, recorder)
}
