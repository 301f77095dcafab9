use std::{collections::BTreeMap, fmt};

use crate::grid::Calibration;

/// Why an event box did not become an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
	/// No absolutely-positioned container around the box.
	NoPositionedAncestor,
	/// The container lacks a `left` or `top` pixel value.
	MissingPosition,
	/// The box lies in a column with no day label.
	NoDayColumn,
	/// The computed start hour is outside the day.
	StartOutOfRange,
	/// A rounded start or end hour is outside `0..=23`.
	RoundedOutOfRange,
	/// The local time does not exist in the civil zone (DST gap).
	NonexistentLocalTime,
}

impl fmt::Display for SkipReason {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			Self::NoPositionedAncestor => "no positioned container",
			Self::MissingPosition => "container has no position",
			Self::NoDayColumn => "no day for column",
			Self::StartOutOfRange => "start hour out of range",
			Self::RoundedOutOfRange => "rounded hour out of range",
			Self::NonexistentLocalTime => "local time does not exist",
		})
	}
}

/// Diagnostics for one processed week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekReport {
	pub week: usize,
	pub calibration: Calibration,
	/// Whether `calibration` is the configured fallback.
	pub fallback_calibration: bool,
	pub columns: usize,
	pub boxes_seen: usize,
	pub extracted: usize,
	pub skipped: BTreeMap<SkipReason, usize>,
}

impl WeekReport {
	#[must_use]
	pub fn new(week: usize, calibration: Calibration, fallback_calibration: bool, columns: usize) -> Self {
		Self {
			week,
			calibration,
			fallback_calibration,
			columns,
			boxes_seen: 0,
			extracted: 0,
			skipped: BTreeMap::new(),
		}
	}

	pub(crate) fn record(&mut self, outcome: Result<(), SkipReason>) {
		self.boxes_seen += 1;

		match outcome {
			Ok(()) => self.extracted += 1,
			Err(reason) => *self.skipped.entry(reason).or_default() += 1,
		}
	}

	#[must_use]
	pub fn skipped_total(&self) -> usize {
		self.skipped.values().sum()
	}

	#[must_use]
	pub fn skipped_for(&self, reason: SkipReason) -> usize {
		self.skipped.get(&reason).copied().unwrap_or_default()
	}
}

impl fmt::Display for WeekReport {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"week {}: {} boxes, {} events, {} skipped",
			self.week + 1,
			self.boxes_seen,
			self.extracted,
			self.skipped_total()
		)?;

		for (reason, count) in &self.skipped {
			write!(f, " [{reason}: {count}]")?;
		}

		Ok(())
	}
}
