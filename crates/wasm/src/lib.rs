#![warn(clippy::pedantic)]

use wasm_bindgen::prelude::wasm_bindgen;

/// Converts one rendered timetable week to iCalendar text.
#[wasm_bindgen]
#[must_use]
pub fn from_html(html: &str) -> String {
	edt2ics_core::html_to_ics(html)
}
