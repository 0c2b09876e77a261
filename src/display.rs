use crate::{
    checksum::Checksum,
    error::Result,
    report::{Failure, Report},
};
use serde::Serialize;
use std::{borrow::Cow, collections::BTreeMap, fmt, fmt::Write, path::PathBuf};
use yansi::{Color, Paint};

/// Width of a `label.....value` line.
const LINE_WIDTH: usize = 54;

/// Resolved command-line settings echoed at the top of the text report.
#[derive(Debug, Clone, Copy)]
pub struct Settings<'a> {
    pub recursive: bool,
    pub include_hidden: bool,
    pub verbose: u8,
    pub directories: &'a [PathBuf],
}

fn paint(text: impl fmt::Display, color: Color, enabled: bool) -> String {
    if enabled {
        text.paint(color).to_string()
    } else {
        text.to_string()
    }
}

/// `label` followed by `value` right-aligned with dot leaders to `LINE_WIDTH` columns.
fn dotted(label: &str, value: impl fmt::Display) -> String {
    let width = LINE_WIDTH.saturating_sub(label.len());
    format!("{}{:.>width$}", label, value.to_string(), width = width)
}

fn indented<'a>(lines: impl IntoIterator<Item = &'a PathBuf>) -> String {
    lines
        .into_iter()
        .map(|path| format!("  {}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Paths as strings for JSON output. Names that are not valid UTF-8 get replacement characters
/// instead of failing the whole report.
fn lossy_groups<'a>(
    groups: impl IntoIterator<Item = (&'a Checksum, &'a [PathBuf])>,
) -> BTreeMap<&'a Checksum, Vec<Cow<'a, str>>> {
    groups
        .into_iter()
        .map(|(checksum, paths)| {
            let paths: Vec<Cow<'a, str>> =
                paths.iter().map(|path| path.to_string_lossy()).collect();
            (checksum, paths)
        })
        .collect()
}

fn write_text(
    out: &mut impl Write,
    settings: &Settings<'_>,
    report: &Report,
    color: bool,
) -> Result<()> {
    let detail = |text: String| paint(text, Color::Yellow, color);
    let summary = |text: String| paint(text, Color::Green, color);
    let verbose = settings.verbose > 1;

    writeln!(
        out,
        "{}\n",
        detail(dotted("Search subdirectories recursively:", settings.recursive))
    )?;
    writeln!(
        out,
        "{}\n",
        detail(dotted(
            "Include hidden files and directories:",
            settings.include_hidden
        ))
    )?;
    writeln!(out, "{}\n", detail(dotted("Verbosity:", settings.verbose)))?;
    writeln!(
        out,
        "{}\n{}\n",
        detail("Selected directories to search for duplicate files:".to_string()),
        indented(settings.directories)
    )?;

    if verbose {
        writeln!(
            out,
            "{}\n{}\n",
            detail("File paths:".to_string()),
            indented(report.files())
        )?;
    }

    writeln!(
        out,
        "{}\n",
        summary(dotted("Total number of files:", report.total_files()))
    )?;

    if verbose {
        let table = lossy_groups(
            report
                .table()
                .iter()
                .map(|(checksum, paths)| (checksum, paths.as_slice())),
        );
        writeln!(
            out,
            "{}\n{}\n",
            detail("Files by hash:".to_string()),
            serde_json::to_string_pretty(&table)?
        )?;
    }

    writeln!(
        out,
        "{}\n",
        summary(dotted("Number of unique files:", report.unique_files()))
    )?;
    writeln!(
        out,
        "{}\n",
        summary(dotted("Number of duplicate files:", report.duplicate_files()))
    )?;
    writeln!(
        out,
        "{}\n{}\n",
        summary("Duplicate files by hash:".to_string()),
        serde_json::to_string_pretty(&lossy_groups(report.duplicates()))?
    )?;

    if !report.failures().is_empty() {
        writeln!(
            out,
            "{}",
            paint(
                dotted("Files that could not be read:", report.failures().len()),
                Color::Red,
                color
            )
        )?;
        for failure in report.failures() {
            writeln!(out, "  {}", failure.reason)?;
        }
        writeln!(out)?;
    }

    if !verbose {
        writeln!(
            out,
            "{}",
            detail("*For more details, run with `-vv`".to_string())
        )?;
    }

    Ok(())
}

/// Render `report` for a terminal. Nothing outside the returned string is touched, so the caller
/// decides where it goes and whether `color` escapes are wanted.
///
/// Scanned paths and the full checksum table are only included from verbosity 2 upwards.
pub fn render_text(settings: &Settings<'_>, report: &Report, color: bool) -> Result<String> {
    let mut out = String::new();
    write_text(&mut out, settings, report, color)?;
    Ok(out)
}

#[derive(Serialize)]
struct JsonReport<'a> {
    total_files: usize,
    unique_files: usize,
    duplicate_files: usize,
    duplicates: BTreeMap<&'a Checksum, Vec<Cow<'a, str>>>,
    failures: &'a [Failure],
}

/// # Returns
///
/// `report` as a pretty-printed JSON object.
pub fn render_json(report: &Report) -> Result<String> {
    let json = JsonReport {
        total_files: report.total_files(),
        unique_files: report.unique_files(),
        duplicate_files: report.duplicate_files(),
        duplicates: lossy_groups(report.duplicates()),
        failures: report.failures(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
