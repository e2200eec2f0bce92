//! Run summary formatting

use crate::crawler::RunReport;
use std::fmt::Write;

/// Maximum number of individual errors listed in the summary
const MAX_LISTED_ERRORS: usize = 20;

/// Renders the end-of-run summary
pub fn format_run_report(report: &RunReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Harvest Summary ===\n");
    let _ = writeln!(
        out,
        "Started: {}",
        report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    if report.cancelled {
        let _ = writeln!(out, "Status: cancelled");
    } else {
        let _ = writeln!(out, "Status: completed");
    }
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "URLs attempted: {} / {}",
        report.urls_attempted, report.urls_total
    );
    let _ = writeln!(out, "Items extracted: {}", report.items_extracted);
    let _ = writeln!(out, "Items persisted: {}", report.items_persisted);
    if report.storage_failures > 0 {
        let _ = writeln!(out, "Storage failures: {}", report.storage_failures);
    }
    let _ = writeln!(out, "Fetch errors: {}", report.error_count());

    if !report.fetch_errors.is_empty() {
        let _ = writeln!(out);
        for error in report.fetch_errors.iter().take(MAX_LISTED_ERRORS) {
            let _ = writeln!(out, "  - {}: {}", error.url, error.kind);
        }
        if report.fetch_errors.len() > MAX_LISTED_ERRORS {
            let _ = writeln!(
                out,
                "  ... and {} more",
                report.fetch_errors.len() - MAX_LISTED_ERRORS
            );
        }
    }

    out
}

/// Prints the end-of-run summary to stdout
pub fn print_run_report(report: &RunReport) {
    print!("{}", format_run_report(report));
}
