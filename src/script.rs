use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::session::{
	Console,
	RESET_COMMAND,
};

/// Script lines with surrounding whitespace removed.
pub fn load_script(path: &Path) -> crate::AResult<Vec<String>> {
	let content = with_context!(("failed to read script file {}", path.display()),
		fs::read_to_string(path).map_err(failure::Error::from)
	)?;
	let lines: Vec<String> = content.lines().map(|line| line.trim().to_string()).collect();
	info!("Sending script file ({}) - {} lines", path.display(), lines.len());
	Ok(lines)
}

/// Play `lines` in order: blank lines pause, `#` resets the board (with
/// the full reset delay), everything else is sent as command.
///
/// Returns the number of commands sent; the first failure aborts the
/// script.
pub fn run_script<K, I, S>(console: &mut K, lines: I, blank_line_delay: Duration) -> crate::AResult<usize>
where
	K: Console + ?Sized,
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut sent = 0;
	for line in lines {
		match line.as_ref().trim() {
			"" => console.pause(blank_line_delay)?,
			RESET_COMMAND => console.reset_board()?,
			command => {
				console.send(command, false)?;
				sent += 1;
			},
		}
	}
	Ok(sent)
}
