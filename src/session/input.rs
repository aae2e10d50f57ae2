//! Turning raw input lines into commands.

use std::io::BufRead;

use crate::error::ParleyError;

/// Ends the echo and router sessions.
pub const EXIT_SENTINEL: &str = "exit";

/// Ends the agent session.
pub const QUIT_SENTINEL: &str = "quit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Exit,
    Message(String),
}

impl Input {
    /// Classify a line. `None` means end of input, which counts as
    /// [`Input::Exit`]. Only an exact match of `sentinel` exits.
    pub fn parse(line: Option<&str>, sentinel: &str) -> Self {
        let Some(line) = line else {
            return Self::Exit;
        };
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line == sentinel {
            Self::Exit
        } else {
            Self::Message(line.to_string())
        }
    }
}

/// Read one line from `reader` and classify it.
pub fn read_input<R: BufRead>(reader: &mut R, sentinel: &str) -> Result<Input, ParleyError> {
    let mut line = String::new();
    let read = reader.read_line(&mut line)?;
    Ok(Input::parse((read > 0).then_some(line.as_str()), sentinel))
}
