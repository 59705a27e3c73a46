use std::fmt::Write;
use std::path::Path;

use comfy_table::{Cell, Color as TableColor};

use crate::pipeline::RunSummary;

use super::styling::{bright, bright_green, bright_yellow, dim};
use super::tables::{color_coded_count_cell, color_coded_failure_cell, create_table};

/// Prints a human-readable summary of an export run to stderr.
///
/// Color coding:
/// - Green: every selected dashboard has an artifact, no failures
/// - Yellow: some dashboards did not reach an outcome
/// - Red: write or cell failures occurred
pub fn print_summary(summary: &RunSummary, dest_dir: &Path) {
    eprintln!("{}", render_summary(summary, dest_dir));
}

fn render_summary(summary: &RunSummary, dest_dir: &Path) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "{} {}", bright("📋"), bright("Summary").underlined());

    let mut table = create_table();
    table.set_header(vec![
        Cell::new("Metric").fg(TableColor::Cyan),
        Cell::new("Value").fg(TableColor::Cyan),
    ]);
    table.add_row(vec![Cell::new("Dashboards listed"), Cell::new(summary.listed)]);
    table.add_row(vec![
        Cell::new("Dashboards selected"),
        Cell::new(summary.selected),
    ]);
    table.add_row(vec![
        Cell::new("Dashboards processed"),
        color_coded_count_cell(summary.processed(), summary.selected),
    ]);
    table.add_row(vec![Cell::new("Written"), Cell::new(summary.written)]);
    table.add_row(vec![
        Cell::new("Skipped (already exported)"),
        Cell::new(summary.skipped),
    ]);
    table.add_row(vec![
        Cell::new("Failed writes"),
        color_coded_failure_cell(summary.failed),
    ]);
    table.add_row(vec![Cell::new("Queries written"), Cell::new(summary.queries)]);
    table.add_row(vec![
        Cell::new("Failed cells"),
        color_coded_failure_cell(summary.failed_cells),
    ]);
    let _ = writeln!(output, "{table}");

    let _ = writeln!(output, "{} {}", dim("Artifacts:"), dest_dir.display());

    if summary.failed > 0 || summary.failed_cells > 0 {
        let _ = writeln!(
            output,
            "{}",
            bright_yellow("Some items failed; see the log above. Re-running resumes from existing artifacts.")
        );
    } else {
        let _ = writeln!(output, "{}", bright_green("All dashboards exported ✓"));
    }

    output
}
