use select::{
	document::Document,
	predicate::{Class, Name, Predicate},
};
use tracing::{debug, warn};

use crate::{
	config::{GridConfig, DEFAULT_HOUR_OFFSET, DEFAULT_PIXELS_PER_HOUR},
	style,
};

/// Class carried by the hour labels on the left of the grid.
pub const HOUR_LABEL_CLASS: &str = "slot";

/// Maps vertical pixel positions to hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
	pub pixels_per_hour: f64,
	/// Vertical position of the reference hour's grid line.
	pub hour_offset: f64,
}

impl Calibration {
	/// Returns `None` unless the scale is finite and positive.
	#[must_use]
	pub fn new(pixels_per_hour: f64, hour_offset: f64) -> Option<Self> {
		(pixels_per_hour.is_finite() && pixels_per_hour > 0.0 && hour_offset.is_finite()).then_some(
			Self {
				pixels_per_hour,
				hour_offset,
			},
		)
	}

	/// The configured constants, or the built-in ones if those are unusable.
	#[must_use]
	pub fn fallback(grid: &GridConfig) -> Self {
		Self::new(grid.fallback_pixels_per_hour, grid.fallback_hour_offset).unwrap_or(Self {
			pixels_per_hour: DEFAULT_PIXELS_PER_HOUR,
			hour_offset: DEFAULT_HOUR_OFFSET,
		})
	}

	/// Derives the calibration from the two reference hour labels, or `None`
	/// if they cannot both be found.
	#[must_use]
	pub fn measure(document: &Document, grid: &GridConfig) -> Option<Self> {
		let first = GridConfig::hour_label(grid.reference_hour);
		let second = GridConfig::hour_label(grid.reference_hour.checked_add(1)?);

		let mut first_top = None;

		for label in document.find(Name("div").and(Class(HOUR_LABEL_CLASS))) {
			let text = label.text();
			let top = label.attr("style").and_then(|s| style::pixels(s, "top"));

			if text.contains(&first) {
				if top.is_some() {
					first_top = top;
				}
			} else if text.contains(&second) {
				// the second label only counts once the first has been seen
				let (Some(first_top), Some(second_top)) = (first_top, top) else {
					continue;
				};

				let calibration =
					Self::new(f64::from(second_top) - f64::from(first_top), f64::from(first_top));

				if calibration.is_none() {
					debug!(first_top, second_top, "hour labels are not in increasing order");
				}

				return calibration;
			}
		}

		None
	}

	/// Like [`Calibration::measure`], falling back to the configured constants.
	/// The flag tells whether the fallback was used.
	#[must_use]
	pub fn from_document(document: &Document, grid: &GridConfig) -> (Self, bool) {
		if let Some(calibration) = Self::measure(document, grid) {
			debug!(
				pixels_per_hour = calibration.pixels_per_hour,
				hour_offset = calibration.hour_offset,
				"calibrated from hour labels"
			);

			return (calibration, false);
		}

		let calibration = Self::fallback(grid);

		warn!(
			pixels_per_hour = calibration.pixels_per_hour,
			hour_offset = calibration.hour_offset,
			"reference hour labels not found, using default calibration"
		);

		(calibration, true)
	}
}
