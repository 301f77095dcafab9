use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("unknown time zone `{0}`")]
	UnknownTimeZone(String),

	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),

	#[error("invalid grid setting `{key}`: {reason}")]
	InvalidGrid { key: &'static str, reason: &'static str },

	#[error("invalid calendar setting `{key}`: {reason}")]
	InvalidCalendar { key: &'static str, reason: &'static str },

	#[error(transparent)]
	Io(#[from] io::Error),

	/// The document source could not produce the requested week.
	#[error("week {week} could not be acquired: {reason}")]
	Acquire { week: usize, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn acquire_error(week: usize, reason: impl ToString) -> Error {
	Error::Acquire {
		week,
		reason: reason.to_string(),
	}
}
