use std::{fs, io::Write, path::Path};

use chrono_tz::Tz;

use crate::{
	config::{CalendarConfig, DEFAULT_PRODUCT_ID},
	error::Result,
	event::CalendarEvent,
};

/// Events accumulated over a run, together with the calendar they are
/// exported to.
#[derive(Debug, Clone)]
pub struct Schedule {
	name: String,
	product_id: String,
	tz: Tz,
	events: Vec<CalendarEvent>,
}

impl Schedule {
	#[must_use]
	pub fn new(name: impl Into<String>, tz: Tz) -> Self {
		Self {
			name: name.into(),
			product_id: DEFAULT_PRODUCT_ID.to_string(),
			tz,
			events: Vec::new(),
		}
	}

	/// Sets the `PRODID` written in place of the library's own.
	#[must_use]
	pub fn with_product_id(mut self, product_id: impl Into<String>) -> Self {
		self.product_id = product_id.into();
		self
	}

	/// # Errors
	///
	/// Returns an error if the configured zone or product id is unusable.
	pub fn from_config(config: &CalendarConfig) -> Result<Self> {
		config.validate()?;

		Ok(Self::new(config.name.clone(), config.tz()?).with_product_id(config.product_id.clone()))
	}

	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	#[must_use]
	pub fn product_id(&self) -> &str {
		&self.product_id
	}

	#[must_use]
	pub fn tz(&self) -> Tz {
		self.tz
	}

	#[must_use]
	pub fn events(&self) -> &[CalendarEvent] {
		&self.events
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.events.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	pub fn push(&mut self, event: CalendarEvent) {
		self.events.push(event);
	}

	/// The calendar as built by `icalendar`, which carries its own `PRODID`;
	/// [`Schedule::render`] swaps in the configured one.
	#[must_use]
	pub fn to_calendar(&self) -> icalendar::Calendar {
		crate::create_calendar(&self.events, &self.name, self.tz)
	}

	/// The whole calendar as iCalendar text.
	#[must_use]
	pub fn render(&self) -> String {
		replace_product_id(&self.to_calendar().to_string(), &self.product_id)
	}

	/// Writes the calendar with a single write once it is fully rendered.
	///
	/// # Errors
	///
	/// Returns any I/O error from `writer`.
	pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
		let rendered = self.render();

		writer.write_all(rendered.as_bytes())?;
		writer.flush()?;

		Ok(())
	}

	/// # Errors
	///
	/// Returns an error if `path` cannot be written.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		fs::write(path, self.render())?;

		Ok(())
	}
}

/// Leaves exactly one `PRODID` line, holding `product_id`, right where the
/// first one was (or after `BEGIN:VCALENDAR` if there was none).
fn replace_product_id(rendered: &str, product_id: &str) -> String {
	let line = format!("PRODID:{product_id}\r\n");
	let mut out = String::with_capacity(rendered.len() + line.len());
	let mut written = false;
	let mut dropping = false;

	for current in rendered.split_inclusive("\r\n") {
		// folded continuation of a dropped line
		if dropping && current.starts_with([' ', '\t']) {
			continue;
		}

		dropping = current.starts_with("PRODID:") || current.starts_with("PRODID;");

		if dropping {
			if !written {
				out.push_str(&line);
				written = true;
			}
		} else {
			out.push_str(current);
		}
	}

	if !written {
		const BEGIN: &str = "BEGIN:VCALENDAR\r\n";

		let at = out.find(BEGIN).map_or(0, |at| at + BEGIN.len());
		out.insert_str(at, &line);
	}

	out
}

impl Extend<CalendarEvent> for Schedule {
	fn extend<I: IntoIterator<Item = CalendarEvent>>(&mut self, iter: I) {
		self.events.extend(iter);
	}
}

#[cfg(test)]
mod tests {
	use chrono_tz::Europe::Paris;

	use super::*;

	fn event(summary: &str, description: &str, location: &str) -> CalendarEvent {
		CalendarEvent {
			summary: summary.to_string(),
			description: description.to_string(),
			location: location.to_string(),
			start: "2025-11-17T07:00:00Z".parse().unwrap(),
			end: "2025-11-17T08:30:00Z".parse().unwrap(),
		}
	}

	fn unfolded(schedule: &Schedule) -> String {
		schedule.render().replace("\r\n ", "").replace("\r\n", "\n")
	}

	#[test]
	fn renders_metadata_and_events() {
		let mut schedule = Schedule::new("M1 MIAGE", Paris);

		schedule.push(event("Algorithmique", "Salle B203\nDupont", "Salle B203"));
		schedule.push(event("Anglais", "", ""));

		let text = unfolded(&schedule);

		assert!(text.starts_with("BEGIN:VCALENDAR\n"));
		assert!(text.contains("X-WR-CALNAME:M1 MIAGE\n"));
		assert!(text.contains("X-WR-TIMEZONE:Europe/Paris\n"));
		assert!(text.contains("METHOD:PUBLISH\n"));
		assert_eq!(text.matches("BEGIN:VEVENT").count(), 2);
		assert!(text.contains("SUMMARY:Algorithmique\n"));
		assert!(text.contains("DTSTART:20251117T070000Z\n"));
		assert!(text.contains("DTEND:20251117T083000Z\n"));
		assert!(text.contains("LOCATION:Salle B203\n"));
		// only the first event has a description
		assert_eq!(text.matches("DESCRIPTION:").count(), 1);
		assert_eq!(text.matches("LOCATION:").count(), 2);
	}

	#[test]
	fn renders_a_single_configured_product_id() {
		let default = unfolded(&Schedule::new("M1", Paris));

		assert_eq!(default.matches("PRODID:").count(), 1);
		assert!(default.contains(&format!("\nPRODID:{DEFAULT_PRODUCT_ID}\n")));

		let mut schedule =
			Schedule::new("M1", Paris).with_product_id("-//UT Capitole//Emploi du temps//FR");
		schedule.push(event("TD", "", ""));

		let text = unfolded(&schedule);

		assert_eq!(text.matches("PRODID").count(), 1);
		assert!(text.contains("\nPRODID:-//UT Capitole//Emploi du temps//FR\n"));
		assert!(!text.contains("ICALENDAR-RS"));
		assert!(text.contains("BEGIN:VEVENT"));
	}

	#[test]
	fn product_id_line_is_replaced_inserted_or_deduplicated() {
		assert_eq!(
			replace_product_id("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n", "-//a//b//FR"),
			"BEGIN:VCALENDAR\r\nPRODID:-//a//b//FR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n"
		);
		assert_eq!(
			replace_product_id(
				"BEGIN:VCALENDAR\r\nPRODID:x\r\n y\r\nVERSION:2.0\r\nPRODID:z\r\nEND:VCALENDAR\r\n",
				"-//a//b//FR"
			),
			"BEGIN:VCALENDAR\r\nPRODID:-//a//b//FR\r\nVERSION:2.0\r\nEND:VCALENDAR\r\n"
		);
	}

	#[test]
	fn product_id_comes_from_config() {
		let config = CalendarConfig {
			product_id: "-//UT Capitole//EDT//FR".to_string(),
			..CalendarConfig::default()
		};

		let schedule = Schedule::from_config(&config).unwrap();

		assert_eq!(schedule.product_id(), "-//UT Capitole//EDT//FR");
		assert!(Schedule::from_config(&CalendarConfig {
			product_id: "a\r\nX-EVIL:1".to_string(),
			..CalendarConfig::default()
		})
		.is_err());
	}

	#[test]
	fn identical_events_are_kept() {
		let mut schedule = Schedule::new("M1", Paris);

		schedule.extend([event("TD", "", ""), event("TD", "", "")]);

		assert_eq!(schedule.len(), 2);
		assert_eq!(unfolded(&schedule).matches("BEGIN:VEVENT").count(), 2);
	}

	#[test]
	fn empty_schedule_still_renders() {
		let schedule = Schedule::new("M1", Paris);

		assert!(schedule.is_empty());

		let text = unfolded(&schedule);

		assert!(text.contains("BEGIN:VCALENDAR"));
		assert!(text.contains("END:VCALENDAR"));
		assert!(!text.contains("BEGIN:VEVENT"));
	}

	#[test]
	fn writes_rendered_text() {
		let mut schedule = Schedule::new("M1", Paris);
		schedule.push(event("TP", "", "Salle 1"));

		let mut out = Vec::new();
		schedule.write_to(&mut out).unwrap();

		let written = String::from_utf8(out).unwrap();

		assert!(written.starts_with("BEGIN:VCALENDAR\r\n"));
		assert!(written.trim_end().ends_with("END:VCALENDAR"));
		assert_eq!(written.matches("BEGIN:VEVENT").count(), 1);
		assert!(written.contains("SUMMARY:TP\r\n"));
	}
}
