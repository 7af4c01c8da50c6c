//! Rendering and JSON serialization for CLI output.

use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use comfy_table::{Cell, CellAlignment, Table, presets::UTF8_FULL_CONDENSED};
use lectern_highlight::render_markup;
pub use lectern_highlight::{dim, header, subheader, warning};
use lectern_index::{
    CollectionInfo, ResultSource, SearchError, SearchOutcome, SearchProgress, SearchReporter,
    SearchResult, SectionBucket, book_code,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::args::OutputMode;

/// JSON output for `lectern search`.
#[derive(Serialize)]
struct JsonSearchOutput<'a> {
    /// The query as typed.
    query: &'a str,
    /// Where the results came from.
    source: ResultSource,
    /// Match pattern sources used for verification.
    patterns: &'a [String],
    /// Number of results.
    total_matches: usize,
    /// Verified fragments.
    results: &'a [SearchResult],
}

/// Forwards pipeline events to the log.
pub struct LogReporter;

impl SearchReporter for LogReporter {
    fn on_index_ready(&mut self, buckets: &[SectionBucket]) {
        let candidates: usize = buckets.iter().map(|b| b.fragment_ids.len()).sum();
        info!(sections = buckets.len(), candidates, "candidates ready");
    }

    fn on_progress(&mut self, progress: &SearchProgress) {
        debug!(
            section = %progress.section_id,
            "scanning section {}/{}",
            progress.index + 1,
            progress.total
        );
    }

    fn on_complete(&mut self, outcome: &SearchOutcome) {
        debug!(results = outcome.results.len(), "search finished");
    }

    fn on_failed(&mut self, error: &SearchError) {
        debug!(%error, "search failed");
    }
}

/// Prints a search outcome in the requested mode.
pub fn output_search_results(
    outcome: &SearchOutcome,
    query: &str,
    mode: OutputMode,
    highlight_class: &str,
) -> ExitCode {
    match mode {
        OutputMode::Json => {
            let json_output = JsonSearchOutput {
                query,
                source: outcome.source,
                patterns: &outcome.patterns,
                total_matches: outcome.results.len(),
                results: &outcome.results,
            };
            print_json(&json_output)
        }
        OutputMode::List => {
            for result in &outcome.results {
                println!("{}", result.fragment_id);
            }
            ExitCode::SUCCESS
        }
        OutputMode::Full => {
            print!("{}", format_results(outcome, highlight_class, io::stdout().is_terminal()));
            ExitCode::SUCCESS
        }
    }
}

/// Formats results as highlighted text blocks followed by a summary line.
fn format_results(outcome: &SearchOutcome, highlight_class: &str, color: bool) -> String {
    if outcome.results.is_empty() {
        return format!("{}\n", style(dim, "No results.", color));
    }

    let mut out = String::new();
    for result in &outcome.results {
        out.push_str(&style(header, result.fragment_id.as_str(), color));
        out.push('\n');
        let text = render_markup(&result.html, highlight_class, color);
        for line in text.trim().lines() {
            out.push_str("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push('\n');
    }

    let noun = if outcome.results.len() == 1 {
        "result"
    } else {
        "results"
    };
    let summary = format!(
        "{} {noun} ({}, {})",
        outcome.results.len(),
        outcome.join_mode,
        outcome.source
    );
    out.push_str(&style(dim, &summary, color));
    out.push('\n');
    out
}

/// Applies a terminal style only when writing to a terminal.
fn style(styler: fn(&str) -> String, text: &str, color: bool) -> String {
    if color { styler(text) } else { text.to_string() }
}

/// Prints a collection's sections as a table, or as JSON.
pub fn output_sections(info: &CollectionInfo, json: bool) -> ExitCode {
    if json {
        return print_json(info);
    }

    if !info.name.is_empty() {
        println!("{}", header(&info.name));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Section", "Book", "Fragments"]);
    for section in &info.sections {
        let count = info
            .fragment_count(section)
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        table.add_row(vec![
            Cell::new(section),
            Cell::new(book_code(section)),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");

    let total: u64 = info.fragment_counts.values().map(|&n| u64::from(n)).sum();
    println!(
        "{}",
        dim(&format!("{} sections, {total} fragments", info.sections.len()))
    );
    ExitCode::SUCCESS
}

/// Serializes `value` as pretty JSON to stdout.
fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize JSON: {e}");
            ExitCode::FAILURE
        }
    }
}
