use std::{fs, path::PathBuf};

use crate::error::{acquire_error, Result};

/// One week's rendered timetable page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument(String);

impl RawDocument {
	#[must_use]
	pub fn new(html: impl Into<String>) -> Self {
		Self(html.into())
	}

	#[must_use]
	pub fn html(&self) -> &str {
		&self.0
	}
}

impl From<String> for RawDocument {
	fn from(html: String) -> Self {
		Self(html)
	}
}

/// Produces the rendered page of each requested week, in week order.
///
/// Implementations own everything about getting there: navigation,
/// authentication, waiting for the page to render.
pub trait DocumentSource {
	/// Produces the rendered page of week `week`, counting from zero.
	///
	/// # Errors
	///
	/// Returns an error if the week cannot be acquired; the run stops there.
	fn fetch_week(&mut self, week: usize) -> Result<RawDocument>;
}

/// Pages saved to disk beforehand, one file per week.
#[derive(Debug, Clone)]
pub struct FileSource {
	paths: Vec<PathBuf>,
}

impl FileSource {
	#[must_use]
	pub fn new(paths: Vec<PathBuf>) -> Self {
		Self { paths }
	}

	#[must_use]
	pub fn weeks(&self) -> usize {
		self.paths.len()
	}
}

impl DocumentSource for FileSource {
	fn fetch_week(&mut self, week: usize) -> Result<RawDocument> {
		let path = self
			.paths
			.get(week)
			.ok_or_else(|| acquire_error(week, "no snapshot for this week"))?;

		fs::read_to_string(path)
			.map(RawDocument::from)
			.map_err(|e| acquire_error(week, format!("{}: {e}", path.display())))
	}
}

/// Pages already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
	pages: Vec<RawDocument>,
}

impl MemorySource {
	#[must_use]
	pub fn new<I, S>(pages: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			pages: pages.into_iter().map(RawDocument::new).collect(),
		}
	}

	#[must_use]
	pub fn weeks(&self) -> usize {
		self.pages.len()
	}
}

impl DocumentSource for MemorySource {
	fn fetch_week(&mut self, week: usize) -> Result<RawDocument> {
		self.pages
			.get(week)
			.cloned()
			.ok_or_else(|| acquire_error(week, "no page for this week"))
	}
}
