use std::collections::BTreeMap;

use chrono::NaiveDate;
use select::{
	document::Document,
	predicate::{Class, Name, Predicate},
};
use tracing::debug;

use crate::{config::GridConfig, style};

/// Class carried by the day headers above the grid.
pub const DAY_LABEL_CLASS: &str = "labelLegend";

/// Horizontal mapping of the grid: one date per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAxis {
	/// Dates ordered by the horizontal position of their label.
	columns: Vec<NaiveDate>,
	column_width: u32,
}

/// Finds the first `DD/MM/YYYY` date in `text`.
fn find_date(text: &str) -> Option<NaiveDate> {
	let bytes = text.as_bytes();

	bytes.windows(10).enumerate().find_map(|(i, window)| {
		let shaped = window.iter().enumerate().all(|(j, b)| match j {
			2 | 5 => *b == b'/',
			_ => b.is_ascii_digit(),
		});

		if !shaped {
			return None;
		}

		// the window is pure ascii, so `i..i + 10` is a char boundary
		NaiveDate::parse_from_str(&text[i..i + 10], "%d/%m/%Y").ok()
	})
}

impl DayAxis {
	#[must_use]
	pub fn new(columns: Vec<NaiveDate>, column_width: u32) -> Self {
		Self {
			columns,
			column_width: column_width.max(1),
		}
	}

	/// Builds the axis from the day labels of `document`. Labels sharing a
	/// position collapse into one column, the last one winning.
	#[must_use]
	pub fn from_document(document: &Document, grid: &GridConfig) -> Self {
		let mut positions = BTreeMap::new();

		for label in document.find(Name("div").and(Class(DAY_LABEL_CLASS))) {
			let text = label.text();

			if !grid.weekdays.iter().any(|day| text.contains(day.as_str())) {
				continue;
			}

			let left = label.attr("style").and_then(|s| style::pixels(s, "left"));

			if let (Some(left), Some(date)) = (left, find_date(&text)) {
				positions.insert(left, date);
			}
		}

		let mut lefts = positions.keys();
		let column_width = match (lefts.next(), lefts.next()) {
			(Some(first), Some(second)) => second - first,
			_ => grid.default_column_width,
		};

		debug!(columns = positions.len(), column_width, "built day axis");

		Self::new(positions.into_values().collect(), column_width)
	}

	#[must_use]
	pub fn column_width(&self) -> u32 {
		self.column_width
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.columns.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}

	/// Column a box starting at `left` falls into.
	#[must_use]
	pub fn column_of(&self, left: u32) -> usize {
		(left / self.column_width) as usize
	}

	#[must_use]
	pub fn date(&self, column: usize) -> Option<NaiveDate> {
		self.columns.get(column).copied()
	}

	/// Date of the column a box starting at `left` falls into, if any.
	#[must_use]
	pub fn date_at(&self, left: u32) -> Option<NaiveDate> {
		self.date(self.column_of(left))
	}
}
