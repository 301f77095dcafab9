#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use chrono_tz::Tz;
use icalendar::{Calendar, Component, Event, EventLike, Property};

pub mod axis;
pub mod calendar;
pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod grid;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod style;
pub mod time;

pub use calendar::Schedule;
pub use config::Config;
pub use error::{Error, Result};
pub use event::CalendarEvent;
pub use pipeline::{Pipeline, Run};
pub use report::{SkipReason, WeekReport};
pub use source::{DocumentSource, FileSource, MemorySource, RawDocument};

/// Zone the timetable grid is drawn in unless configured otherwise.
pub const TZ: Tz = chrono_tz::Europe::Paris;

#[must_use]
pub fn create_calendar<'a, I>(events: I, name: &str, tz: Tz) -> Calendar
where
	I: IntoIterator<Item = &'a CalendarEvent>,
{
	let mut calendar = Calendar::new();

	calendar.name(name);
	calendar.timezone(tz.name());
	calendar.append_property(Property::new("METHOD", "PUBLISH"));

	for class in events {
		let mut event = Event::new();

		event
			.summary(&class.summary)
			.starts(class.start)
			.ends(class.end)
			.location(&class.location);

		if !class.description.is_empty() {
			event.description(&class.description);
		}

		calendar.push(event);
	}

	calendar
}

/// Converts a single rendered week to iCalendar text with the default
/// configuration.
#[must_use]
pub fn html_to_ics(html: &str) -> String {
	let run = Pipeline::default().run(&mut MemorySource::new([html]), 1);

	run.schedule.render()
}
