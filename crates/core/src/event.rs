use chrono::{DateTime, Utc};

use crate::time::Span;

/// Token separating the fields of an event box's accessible text.
pub const FIELD_SEPARATOR: &str = "null";
pub const DEFAULT_SUMMARY: &str = "Cours";

/// A single class session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
	pub summary: String,
	pub description: String,
	pub location: String,
	pub start: DateTime<Utc>,
	pub end: DateTime<Utc>,
}

/// Human-readable fields recovered from an accessible label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields {
	pub summary: String,
	pub description: String,
	pub location: String,
}

impl Fields {
	/// Splits `text` on [`FIELD_SEPARATOR`]. The first field is the summary;
	/// the others make up the description, the first of them doubling as the
	/// location.
	#[must_use]
	pub fn parse(text: &str) -> Self {
		let mut fields = text.split(FIELD_SEPARATOR).map(str::trim).filter(|f| !f.is_empty());

		let summary = fields.next().unwrap_or(DEFAULT_SUMMARY).to_string();
		let rest = fields.collect::<Vec<_>>();

		Self {
			summary,
			location: rest.first().copied().unwrap_or_default().to_string(),
			description: rest.join("\n"),
		}
	}
}

impl CalendarEvent {
	#[must_use]
	pub fn new(fields: Fields, span: Span) -> Self {
		Self {
			summary: fields.summary,
			description: fields.description,
			location: fields.location,
			start: span.start,
			end: span.end,
		}
	}

	/// Builds the event for a box whose times have been resolved.
	#[must_use]
	pub fn assemble(accessible_text: &str, span: Span) -> Self {
		Self::new(Fields::parse(accessible_text), span)
	}
}
