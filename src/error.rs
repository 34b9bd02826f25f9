//! Crate-level error type.
//!
//! `Timeout` is deliberately not a variant here — external cancellation is a normal
//! `SearchOutcome::TimedOut`, not a failure (see [`crate::oneshot`]).

use std::fmt;

#[derive(Debug)]
pub enum Error {
	/// Malformed benchmark JSON, an unknown symbol, a state name not of the form `q<i>`, a
	/// regex syntax error in a `letter` field, or an unknown property name.
	InputError { message: String },
	/// An unknown generator or search strategy name.
	ConfigError { message: String },
}

impl Error {
	pub fn input(message: impl Into<String>) -> Self {
		Self::InputError { message: message.into() }
	}

	pub fn config(message: impl Into<String>) -> Self {
		Self::ConfigError { message: message.into() }
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InputError { message } => write!(f, "input error: {message}"),
			Self::ConfigError { message } => write!(f, "config error: {message}"),
		}
	}
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn display_messages_are_distinguishable() {
		let input: Error = Error::input("bad json");
		let config: Error = Error::config("unknown generator \"fast-dfs\"");
		assert!(input.to_string().starts_with("input error"));
		assert!(config.to_string().starts_with("config error"));
	}
}
