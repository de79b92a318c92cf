//! Routing of client output lines.
//!
//! psql and pg_dump interleave progress, notices, and errors on both
//! streams; lines are routed to info/warning/error channels by the
//! server's message prefixes, not by which stream they arrived on.

/// Channel a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Classify one output line by its message prefix
pub fn classify_line(line: &str) -> Severity {
    let lower = line.to_lowercase();
    if lower.contains("error:") || lower.contains("fatal:") || lower.contains("panic:") {
        Severity::Error
    } else if lower.contains("warning:") {
        Severity::Warning
    } else {
        Severity::Info
    }
}

/// Print one line on its channel
pub fn report_line(line: &str) {
    if line.is_empty() {
        return;
    }
    match classify_line(line) {
        Severity::Error | Severity::Warning => eprintln!("{line}"),
        Severity::Info => println!("{line}"),
    }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
