//! Turns one line of terminal input into a user intent.
//!
//! Lines starting with `/` are commands; anything else is typed text that
//! fills the input buffer and is submitted, as pressing Enter in a text field
//! would.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Set the pending title to the text and submit it.
    Submit(String),
    /// Toggle the item at this 1-based position.
    Toggle(usize),
    /// Delete the item at this 1-based position.
    Delete(usize),
    Refresh,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("unknown command /{0}, try /help")]
    UnknownCommand(String),
    #[error("/{command} needs an item number")]
    MissingPosition { command: &'static str },
    #[error("{0:?} is not an item number")]
    BadPosition(String),
}

pub const HELP: &str = "\
Type a title and press Enter to add it.
  /toggle N   mark item N done or not done
  /delete N   remove item N
  /refresh    reload from the store
  /quit       leave";

pub fn parse(line: &str) -> Result<Intent, IntentError> {
    let Some(command) = line.trim_start().strip_prefix('/') else {
        return Ok(Intent::Submit(line.to_string()));
    };
    let mut words = command.split_whitespace();
    match words.next().unwrap_or("") {
        "toggle" | "t" => position(words.next(), "toggle").map(Intent::Toggle),
        "delete" | "d" => position(words.next(), "delete").map(Intent::Delete),
        "refresh" | "r" => Ok(Intent::Refresh),
        "help" | "h" | "?" => Ok(Intent::Help),
        "quit" | "q" | "exit" => Ok(Intent::Quit),
        other => Err(IntentError::UnknownCommand(other.to_string())),
    }
}

fn position(word: Option<&str>, command: &'static str) -> Result<usize, IntentError> {
    let word = word.ok_or(IntentError::MissingPosition { command })?;
    match word.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(IntentError::BadPosition(word.to_string())),
    }
}
