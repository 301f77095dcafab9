//! Vertical geometry to civil time.
//!
//! Quarter-hour snapping rounds half to even on the number of quarters, so a
//! box exactly between two quarters (e.g. 09:07:30) snaps to the even quarter
//! (09:00), and 09:22:30 snaps to 09:30.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::{
	axis::DayAxis, config::GridConfig, extract::RawEventBox, grid::Calibration, report::SkipReason,
};

const QUARTER_MINUTES: i64 = 15;

/// Start and end of a resolved box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
	pub start: DateTime<Utc>,
	pub end: DateTime<Utc>,
}

/// Fractional hour at which a box drawn at `top` starts.
#[must_use]
pub fn start_hour(top: u32, calibration: &Calibration, grid: &GridConfig) -> f64 {
	let from_reference = f64::from(top) - calibration.hour_offset - grid.event_vertical_inset;

	f64::from(grid.reference_hour) + from_reference / calibration.pixels_per_hour
}

/// Whether a computed start hour lies within the day.
#[must_use]
pub fn start_in_range(hour: f64) -> bool {
	(0.0..24.0).contains(&hour)
}

#[must_use]
pub fn duration_hours(height: Option<u32>, calibration: &Calibration, grid: &GridConfig) -> f64 {
	height.map_or(grid.default_duration_hours, |height| {
		f64::from(height) / calibration.pixels_per_hour
	})
}

/// Minutes since midnight of `hours`, snapped to the nearest quarter hour.
/// `None` if the result does not fit in an `i64`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quantize(hours: f64) -> Option<i64> {
	let quarters = (hours * 60.0 / 15.0).round_ties_even();

	if !quarters.is_finite() {
		return None;
	}

	// the cast saturates, so a count past the limits fails the multiplication
	(quarters as i64).checked_mul(QUARTER_MINUTES)
}

/// Wall-clock time for `minutes` since midnight, if the hour is in `0..=23`.
#[must_use]
pub fn clock(minutes: i64) -> Option<NaiveTime> {
	let hour = u32::try_from(minutes.div_euclid(60)).ok()?;
	let minute = u32::try_from(minutes.rem_euclid(60)).ok()?;

	if hour > 23 {
		return None;
	}

	NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Places `time` on `date` in `tz`. An ambiguous time resolves to its later
/// (standard time) instant. A time skipped by a forward shift is read with the
/// offset in effect before the shift, so 02:15 on the spring-forward night is
/// 03:15 summer time.
fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, SkipReason> {
	let local = date.and_time(time);

	match tz.from_local_datetime(&local) {
		LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => Ok(dt.with_timezone(&Utc)),
		LocalResult::None => local
			.checked_sub_signed(Duration::days(1))
			.and_then(|before| tz.offset_from_local_datetime(&before).earliest())
			.and_then(|offset| offset.fix().from_local_datetime(&local).single())
			.map(|dt| dt.with_timezone(&Utc))
			.ok_or(SkipReason::NonexistentLocalTime),
	}
}

/// Resolves a box to its UTC start and end.
///
/// # Errors
///
/// Returns the [`SkipReason`] the box is dropped for: no day column under it,
/// a start outside the day, or a start or end that snaps past midnight.
pub fn resolve(
	raw: &RawEventBox,
	calibration: &Calibration,
	axis: &DayAxis,
	grid: &GridConfig,
	tz: Tz,
) -> Result<Span, SkipReason> {
	let date = axis.date_at(raw.left).ok_or(SkipReason::NoDayColumn)?;
	let start = start_hour(raw.top, calibration, grid);

	if !start_in_range(start) {
		return Err(SkipReason::StartOutOfRange);
	}

	let end = start + duration_hours(raw.height, calibration, grid);

	let (Some(start), Some(end)) = (quantize(start).and_then(clock), quantize(end).and_then(clock))
	else {
		return Err(SkipReason::RoundedOutOfRange);
	};

	Ok(Span {
		start: localize(tz, date, start)?,
		end: localize(tz, date, end)?,
	})
}
