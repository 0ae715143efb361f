//! Operator-facing terminal output.

use colored::{ColoredString, Colorize};
use std::env;

use crate::core::entry::{DocEntry, DocStatus, StatusCounts};

const GENERATED_FORMAT: &str = "%b %d %H:%M";
const INDEX_WIDTH: usize = 4;
const MIN_PATH_WIDTH: usize = 12;

pub fn success(message: &str) {
    println!("{}", message.green());
}

pub fn error(message: &str) {
    eprintln!("{}", message.red());
}

pub fn warning(message: &str) {
    println!("{}", message.yellow());
}

pub fn info(message: &str) {
    println!("{}", message);
}

pub fn terminal_width() -> usize {
    env::var("COLUMNS")
        .ok()
        .and_then(|c| c.parse().ok())
        .unwrap_or(120)
}

fn paint_status(text: String, status: DocStatus) -> ColoredString {
    match status {
        DocStatus::Current => text.green(),
        DocStatus::Stale => text.yellow(),
        DocStatus::Error => text.red(),
    }
}

/// Shorten `s` to `max` chars, keeping the tail (the file name is the useful end).
fn fit(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    let keep = max.saturating_sub(3);
    let tail: String = s.chars().skip(len - keep).collect();
    format!("...{}", tail)
}

/// Render rows as plain text columns. Status is padded before coloring so
/// escape codes don't skew alignment.
pub fn render_table(entries: &[DocEntry], width: usize) -> Vec<String> {
    let generated_width = 12;
    let status_width = "current".len();
    let fixed = INDEX_WIDTH + status_width + generated_width + 8;
    let path_budget = width.saturating_sub(fixed).max(MIN_PATH_WIDTH * 2);

    let source_width = entries
        .iter()
        .map(|e| e.source_file.chars().count())
        .chain(std::iter::once("Source File".len()))
        .max()
        .unwrap_or(MIN_PATH_WIDTH)
        .min(path_budget / 2);
    let doc_width = entries
        .iter()
        .map(|e| e.doc_file.chars().count())
        .chain(std::iter::once("Doc File".len()))
        .max()
        .unwrap_or(MIN_PATH_WIDTH)
        .min(path_budget - source_width);

    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push(format!(
        "{:<iw$}  {:<sw$}  {:<dw$}  {:<stw$}  {}",
        "#",
        "Source File",
        "Doc File",
        "Status",
        "Generated",
        iw = INDEX_WIDTH,
        sw = source_width,
        dw = doc_width,
        stw = status_width,
    ));
    lines.push(
        "-".repeat(INDEX_WIDTH + source_width + doc_width + status_width + generated_width + 8),
    );

    for (idx, entry) in entries.iter().enumerate() {
        let index = format!("{:<w$}", idx + 1, w = INDEX_WIDTH);
        let status = format!("{:<w$}", entry.status.as_str(), w = status_width);
        lines.push(format!(
            "{}  {:<sw$}  {:<dw$}  {}  {}",
            index.dimmed(),
            fit(&entry.source_file, source_width),
            fit(&entry.doc_file, doc_width),
            paint_status(status, entry.status),
            entry.generated_at.format(GENERATED_FORMAT),
            sw = source_width,
            dw = doc_width,
        ));
    }
    lines
}

/// Print the ledger table followed by the status summary.
pub fn table(entries: &[DocEntry]) {
    for line in render_table(entries, terminal_width()) {
        println!("{}", line);
    }
    println!();
    println!("  {}", StatusCounts::of(entries).summary_line());
}
