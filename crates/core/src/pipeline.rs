use chrono_tz::Tz;
use select::document::Document;
use tracing::{debug, info, trace, warn};

use crate::{
	axis::DayAxis,
	calendar::Schedule,
	config::{self, Config, GridConfig},
	error::{Error, Result},
	event::CalendarEvent,
	extract,
	grid::Calibration,
	report::WeekReport,
	source::{DocumentSource, RawDocument},
	time,
};

/// Turns rendered weeks into calendar events.
#[derive(Debug, Clone)]
pub struct Pipeline {
	name: String,
	product_id: String,
	grid: GridConfig,
	tz: Tz,
}

/// Result of processing every requested week.
#[derive(Debug)]
pub struct Run {
	pub schedule: Schedule,
	pub weeks: Vec<WeekReport>,
	/// Set when acquisition stopped before every week was fetched.
	pub failure: Option<Error>,
}

impl Run {
	#[must_use]
	pub fn boxes_seen(&self) -> usize {
		self.weeks.iter().map(|w| w.boxes_seen).sum()
	}

	#[must_use]
	pub fn skipped(&self) -> usize {
		self.weeks.iter().map(WeekReport::skipped_total).sum()
	}
}

impl Default for Pipeline {
	fn default() -> Self {
		Self {
			name: config::DEFAULT_CALENDAR_NAME.to_string(),
			product_id: config::DEFAULT_PRODUCT_ID.to_string(),
			grid: GridConfig::default(),
			tz: crate::TZ,
		}
	}
}

impl Pipeline {
	/// # Errors
	///
	/// Returns an error if the configuration holds an unknown zone or a grid
	/// setting out of range.
	pub fn new(config: &Config) -> Result<Self> {
		config.validate()?;

		Ok(Self {
			name: config.calendar.name.clone(),
			product_id: config.calendar.product_id.clone(),
			grid: config.grid.clone(),
			tz: config.calendar.tz()?,
		})
	}

	/// Extracts the events of one week. Never fails: boxes that cannot be
	/// placed on the grid are counted in the report and left out.
	#[must_use]
	pub fn process(&self, document: &RawDocument, week: usize) -> (Vec<CalendarEvent>, WeekReport) {
		let document = Document::from(document.html());

		let (calibration, fallback) = Calibration::from_document(&document, &self.grid);
		let axis = DayAxis::from_document(&document, &self.grid);

		let mut report = WeekReport::new(week, calibration, fallback, axis.len());
		let mut events = Vec::new();

		for raw in extract::event_boxes(&document) {
			let event = raw.and_then(|raw| {
				let span = time::resolve(&raw, &calibration, &axis, &self.grid, self.tz).inspect_err(
					|reason| debug!(%reason, left = raw.left, top = raw.top, "dropping event box"),
				)?;

				Ok(CalendarEvent::assemble(&raw.accessible_text, span))
			});

			report.record(event.as_ref().map(|_| ()).map_err(|reason| *reason));

			if let Ok(event) = event {
				trace!(summary = %event.summary, start = %event.start, end = %event.end, "event");
				events.push(event);
			}
		}

		info!(%report, "processed week");

		(events, report)
	}

	/// Fetches and processes `weeks` weeks in order. Fetching stops at the
	/// first week the source cannot produce; what was gathered so far is
	/// kept.
	pub fn run<S: DocumentSource + ?Sized>(&self, source: &mut S, weeks: usize) -> Run {
		let mut schedule =
			Schedule::new(self.name.clone(), self.tz).with_product_id(self.product_id.clone());
		let mut reports = Vec::with_capacity(weeks);
		let mut failure = None;

		for week in 0..weeks {
			let document = match source.fetch_week(week) {
				Ok(document) => document,
				Err(e) => {
					warn!(week = week + 1, error = %e, "stopping acquisition");
					failure = Some(e);
					break;
				}
			};

			let (events, report) = self.process(&document, week);

			schedule.extend(events);
			reports.push(report);
		}

		info!(events = schedule.len(), weeks = reports.len(), "run finished");

		Run {
			schedule,
			weeks: reports,
			failure,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{report::SkipReason, source::MemorySource};

	const WEEK: &str = r#"
		<div class="slot" style="top:100px">08h00</div>
		<div class="slot" style="top:120px">09h00</div>
		<div class="labelLegend" style="left:50px">Lundi 17/11/2025</div>
		<div class="labelLegend" style="left:165px">Mardi 18/11/2025</div>
		<div style="position: absolute; left: 180px; top: 136px">
			<table class="event" style="height:35px"><tr><td>
				<div class="eventText" aria-label="Algorithmique null Salle B203 null Dupont">Algorithmique</div>
			</td></tr></table>
		</div>
		<div style="position: absolute; left: 400px; top: 136px">
			<div class="eventText" aria-label="Ghost">Ghost</div>
		</div>
	"#;

	#[test]
	fn processes_one_week() {
		let pipeline = Pipeline::new(&Config::default()).unwrap();

		let (events, report) = pipeline.process(&RawDocument::new(WEEK), 0);

		assert_eq!(events.len(), 1);
		assert_eq!(events[0].summary, "Algorithmique");
		assert_eq!(events[0].start.to_rfc3339(), "2025-11-18T08:30:00+00:00");
		assert!(!report.fallback_calibration);
		assert_eq!(report.columns, 2);
		assert_eq!(report.boxes_seen, 2);
		assert_eq!(report.extracted, 1);
		assert_eq!(report.skipped_for(SkipReason::NoDayColumn), 1);
	}

	#[test]
	fn accumulates_weeks_without_merging() {
		let pipeline = Pipeline::new(&Config::default()).unwrap();
		let mut source = MemorySource::new([WEEK, WEEK]);

		let run = pipeline.run(&mut source, 2);

		assert!(run.failure.is_none());
		assert_eq!(run.weeks.len(), 2);
		assert_eq!(run.schedule.len(), 2);
		assert_eq!(run.boxes_seen(), 4);
		assert_eq!(run.skipped(), 2);
	}

	#[test]
	fn acquisition_failure_keeps_earlier_weeks() {
		let pipeline = Pipeline::new(&Config::default()).unwrap();
		let mut source = MemorySource::new([WEEK]);

		let run = pipeline.run(&mut source, 3);

		assert_eq!(run.weeks.len(), 1);
		assert_eq!(run.schedule.len(), 1);
		assert!(matches!(run.failure, Some(Error::Acquire { week: 1, .. })));
	}

	#[test]
	fn rejects_unvalidated_grid() {
		let mut config = Config::default();
		config.grid.fallback_pixels_per_hour = -17.5;

		assert!(matches!(
			Pipeline::new(&config),
			Err(Error::InvalidGrid { key: "fallback_pixels_per_hour", .. })
		));
	}

	#[test]
	fn run_carries_configured_product_id() {
		let mut config = Config::default();
		config.calendar.product_id = "-//UT Capitole//EDT//FR".to_string();

		let pipeline = Pipeline::new(&config).unwrap();
		let run = pipeline.run(&mut MemorySource::new([WEEK]), 1);

		assert_eq!(run.schedule.product_id(), "-//UT Capitole//EDT//FR");
	}

	#[test]
	fn document_without_events_is_empty() {
		let pipeline = Pipeline::new(&Config::default()).unwrap();

		let document = RawDocument::new("<html><body>Maintenance</body></html>");
		let (events, report) = pipeline.process(&document, 0);

		assert!(events.is_empty());
		assert!(report.fallback_calibration);
		assert_eq!(report.boxes_seen, 0);
	}
}
