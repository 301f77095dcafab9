#![warn(clippy::pedantic)]

use std::{
	io::{self, Read},
	path::PathBuf,
	process::ExitCode,
};

use anyhow::{bail, Context};
use clap::Parser;
use edt2ics_core::{Config, FileSource, MemorySource, Pipeline, Run};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Converts rendered weekly timetable pages into an iCalendar file.
#[derive(Parser)]
#[command(version)]
struct Args {
	/// One saved page per week, in week order. Reads a single page from
	/// stdin when omitted.
	#[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
	paths: Vec<PathBuf>,
	/// Where to write the calendar. Defaults to stdout.
	#[clap(short, long, value_hint = clap::ValueHint::FilePath)]
	output: Option<PathBuf>,
	/// TOML configuration file.
	#[clap(short, long, value_hint = clap::ValueHint::FilePath)]
	config: Option<PathBuf>,
	/// Write the calendar even if no event was found.
	#[clap(long)]
	allow_empty: bool,
}

fn init_logging() {
	// stdout may carry the calendar
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(io::stderr)
		.init();
}

fn extract(args: &Args, pipeline: &Pipeline) -> anyhow::Result<Run> {
	if args.paths.is_empty() {
		let mut html = String::new();
		io::stdin()
			.read_to_string(&mut html)
			.context("failed to read page from stdin")?;

		return Ok(pipeline.run(&mut MemorySource::new([html]), 1));
	}

	let mut source = FileSource::new(args.paths.clone());
	let weeks = source.weeks();

	Ok(pipeline.run(&mut source, weeks))
}

fn run(args: &Args) -> anyhow::Result<()> {
	let config = match &args.config {
		Some(path) => Config::from_file(path)
			.with_context(|| format!("failed to load {}", path.display()))?,
		None => Config::default(),
	};
	let pipeline = Pipeline::new(&config)?;

	let run = extract(args, &pipeline)?;

	if let Some(failure) = &run.failure {
		error!("{failure}");
	}

	info!(
		events = run.schedule.len(),
		boxes = run.boxes_seen(),
		skipped = run.skipped(),
		"extraction finished"
	);

	if run.schedule.is_empty() && !args.allow_empty {
		bail!("no event found, calendar not written");
	}

	if let Some(output) = &args.output {
		run.schedule
			.save(output)
			.with_context(|| format!("failed to write {}", output.display()))?;

		info!(path = %output.display(), "calendar written");
	} else {
		run.schedule.write_to(io::stdout().lock())?;
	}

	Ok(())
}

fn main() -> ExitCode {
	init_logging();

	let args = Args::parse();

	match run(&args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{e:#}");
			ExitCode::FAILURE
		}
	}
}
