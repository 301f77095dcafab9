use std::{fs, path::Path, str::FromStr};

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_CALENDAR_NAME: &str = "Emploi du temps";
pub const DEFAULT_PRODUCT_ID: &str = "-//edt2ics//Emploi du temps//FR";
const MAX_PRODUCT_ID_LEN: usize = 68;
pub const DEFAULT_PIXELS_PER_HOUR: f64 = 17.5;
pub const DEFAULT_HOUR_OFFSET: f64 = 17.0;

/// Runtime configuration. Every key is optional; an empty file yields the
/// defaults the timetable site has historically rendered with.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub calendar: CalendarConfig,
	pub grid: GridConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
	pub name: String,
	/// Written as the calendar's `PRODID`.
	pub product_id: String,
	/// IANA zone the grid is drawn in.
	pub timezone: String,
}

impl Default for CalendarConfig {
	fn default() -> Self {
		Self {
			name: DEFAULT_CALENDAR_NAME.to_string(),
			product_id: DEFAULT_PRODUCT_ID.to_string(),
			timezone: crate::TZ.name().to_string(),
		}
	}
}

impl CalendarConfig {
	/// # Errors
	///
	/// Returns [`Error::UnknownTimeZone`] if `timezone` is not an IANA name.
	pub fn tz(&self) -> Result<Tz> {
		Tz::from_str(&self.timezone).map_err(|_| Error::UnknownTimeZone(self.timezone.clone()))
	}

	/// # Errors
	///
	/// Returns an error for an unknown zone or a product id that would break
	/// the calendar's line structure.
	pub fn validate(&self) -> Result<()> {
		self.tz()?;

		if self.product_id.trim().is_empty() || self.product_id.contains(['\r', '\n']) {
			return Err(Error::InvalidCalendar {
				key: "product_id",
				reason: "must be a single non-empty line",
			});
		}
		// `PRODID:` plus the value must fit an unfolded 75-octet line
		if self.product_id.len() > MAX_PRODUCT_ID_LEN {
			return Err(Error::InvalidCalendar {
				key: "product_id",
				reason: "must be at most 68 bytes",
			});
		}

		Ok(())
	}
}

/// Constants describing the rendered grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
	/// Hour whose label (`08h00`) anchors the calibration; the next hour's
	/// label gives the scale.
	pub reference_hour: u32,
	pub fallback_pixels_per_hour: f64,
	pub fallback_hour_offset: f64,
	/// Padding between an event box and the grid line it starts on.
	pub event_vertical_inset: f64,
	pub default_column_width: u32,
	pub default_duration_hours: f64,
	/// Weekday names a date label must mention.
	pub weekdays: Vec<String>,
}

impl Default for GridConfig {
	fn default() -> Self {
		Self {
			reference_hour: 8,
			fallback_pixels_per_hour: DEFAULT_PIXELS_PER_HOUR,
			fallback_hour_offset: DEFAULT_HOUR_OFFSET,
			event_vertical_inset: 8.0,
			default_column_width: 115,
			default_duration_hours: 1.5,
			weekdays: ["Lundi", "Mardi", "Mercredi", "Jeudi", "Vendredi", "Samedi", "Dimanche"]
				.into_iter()
				.map(String::from)
				.collect(),
		}
	}
}

impl GridConfig {
	/// Text of the hour label for `hour`, e.g. `09h00`.
	#[must_use]
	pub fn hour_label(hour: u32) -> String {
		format!("{hour:02}h00")
	}

	/// # Errors
	///
	/// Returns [`Error::InvalidGrid`] naming the first setting the grid
	/// arithmetic cannot work with.
	pub fn validate(&self) -> Result<()> {
		let invalid = |key, reason| Err(Error::InvalidGrid { key, reason });

		// the next hour's label must exist too
		if self.reference_hour > 22 {
			return invalid("reference_hour", "must be at most 22");
		}
		if !(self.fallback_pixels_per_hour.is_finite() && self.fallback_pixels_per_hour > 0.0) {
			return invalid("fallback_pixels_per_hour", "must be finite and positive");
		}
		if !self.fallback_hour_offset.is_finite() {
			return invalid("fallback_hour_offset", "must be finite");
		}
		if !(self.event_vertical_inset.is_finite() && self.event_vertical_inset >= 0.0) {
			return invalid("event_vertical_inset", "must be finite and not negative");
		}
		if self.default_column_width == 0 {
			return invalid("default_column_width", "must be positive");
		}
		if !(self.default_duration_hours.is_finite()
			&& (0.0..=24.0).contains(&self.default_duration_hours))
		{
			return invalid("default_duration_hours", "must be between 0 and 24");
		}

		Ok(())
	}
}

impl Config {
	/// # Errors
	///
	/// Returns an error if the TOML does not parse or a setting is out of
	/// range.
	pub fn from_toml_str(s: &str) -> Result<Self> {
		let config: Self = toml::from_str(s)?;
		// fail early rather than on the first event
		config.validate()?;
		Ok(config)
	}

	/// # Errors
	///
	/// Returns an error if either section holds an unusable value.
	pub fn validate(&self) -> Result<()> {
		self.calendar.validate()?;
		self.grid.validate()
	}

	/// # Errors
	///
	/// Same as [`Config::from_toml_str`], plus I/O errors reading `path`.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		Self::from_toml_str(&fs::read_to_string(path)?)
	}
}
