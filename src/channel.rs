use std::time::Instant;

use crate::config::Timing;
use crate::link::Link;

/// Response lines containing this token are kept when capturing.
pub const CAPTURE_MARKER: &str = "READ";

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResponseEvent {
	pub line: String,
	pub at: Instant,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Outcome {
	/// the device stopped talking for longer than the end silence
	Silence,
	/// the response timeout passed before the device went silent
	Timeout,
}

#[derive(Clone, Debug)]
pub struct Exchange {
	pub responses: Vec<ResponseEvent>,
	pub captured: Option<String>,
	pub outcome: Outcome,
	pub started_at: Instant,
	pub finished_at: Instant,
}

/// One command at a time over a borrowed link.
pub struct CommandChannel<'a, L: Link + ?Sized> {
	link: &'a mut L,
	timing: Timing,
}

impl<'a, L: Link + ?Sized> CommandChannel<'a, L> {
	pub fn new(link: &'a mut L, timing: Timing) -> Self {
		CommandChannel { link, timing }
	}

	/// Send `command` and collect lines until the device goes silent or the
	/// response timeout passes.
	///
	/// With `capture` the last line containing `CAPTURE_MARKER` is returned
	/// in `Exchange::captured`.
	pub fn exchange(&mut self, command: &str, capture: bool) -> crate::AResult<Exchange> {
		info!("> {}", command);
		self.link.write_line(command)?;

		let started_at = self.link.now();
		let deadline = started_at + self.timing.response_timeout;
		let mut responses: Vec<ResponseEvent> = Vec::new();
		let mut captured = None;

		let outcome = loop {
			if self.link.now().duration_since(started_at) >= self.timing.response_timeout {
				warn!("Timeout waiting for response to {:?}", command);
				break Outcome::Timeout;
			}

			match self.link.read_line(deadline)? {
				Some(line) => {
					let at = self.link.now();
					info!("< {}", line);
					if capture && line.contains(CAPTURE_MARKER) {
						captured = Some(line.clone());
					}
					responses.push(ResponseEvent { line, at });
				},
				None => {
					if let Some(last) = responses.last() {
						if self.link.now().duration_since(last.at) > self.timing.end_silence {
							break Outcome::Silence;
						}
					}
				},
			}
		};

		Ok(Exchange {
			responses,
			captured,
			outcome,
			started_at,
			finished_at: self.link.now(),
		})
	}

	/// Returns the captured line (empty if none matched) when `capture` is
	/// set, `None` otherwise.
	pub fn send(&mut self, command: &str, capture: bool) -> crate::AResult<Option<String>> {
		let exchange = self.exchange(command, capture)?;
		if capture {
			Ok(Some(exchange.captured.unwrap_or_default()))
		} else {
			Ok(None)
		}
	}
}
