//! Terminal display logic for the domain-probe CLI.
//!
//! Progress goes to stderr and is only drawn when stderr is a terminal, so
//! piped output and CI logs stay clean. The summary goes to stdout.

use console::{pad_str, style, Alignment, StyledObject, Term};
use domain_probe_lib::{ResultSet, Status, Tally};

// ── Progress ─────────────────────────────────────────────────────────────────

/// Single self-overwriting progress line on stderr.
pub struct ProgressLine {
    term: Term,
    total: usize,
    enabled: bool,
}

impl ProgressLine {
    /// Progress for a run of `total` domains. Drawing is disabled when
    /// stderr is not a terminal.
    pub fn new(total: usize) -> Self {
        let term = Term::stderr();
        let enabled = term.is_term();
        Self {
            term,
            total,
            enabled,
        }
    }

    /// Redraw with the latest counts.
    pub fn update(&self, tally: &Tally) {
        if !self.enabled {
            return;
        }
        let line = format_progress(tally.processed, self.total, tally.valid);
        let _ = self.term.clear_line();
        let _ = self.term.write_str(&format!("{}", style(line).dim()));
    }

    /// Clear the progress line.
    pub fn finish(&self) {
        if self.enabled {
            let _ = self.term.clear_line();
        }
    }
}

/// `[processed/total] N valid`
pub fn format_progress(processed: usize, total: usize, valid: usize) -> String {
    format!("[{}/{}] {} valid", processed, total, valid)
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print a styled run header on stderr.
pub fn print_header(domain_count: usize, pool_size: usize, input: &str) {
    eprintln!(
        "{} {} {}",
        style("domain-probe").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- probing {} domain{} from {}",
            domain_count,
            if domain_count == 1 { "" } else { "s" },
            input
        ))
        .dim(),
    );
    eprintln!("{}", style(format!("Workers: {}", pool_size)).dim());
}

// ── Dry run ──────────────────────────────────────────────────────────────────

/// List the domains that would be probed.
pub fn print_dry_run(domains: &[String]) {
    for domain in domains {
        println!("{}", domain);
    }
    eprintln!(
        "{}",
        style(format!("{} domains would be probed", domains.len())).dim()
    );
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// `Processed {total} domains with {valid} valid.`
pub fn summary_line(total: usize, valid: usize) -> String {
    format!("Processed {} domains with {} valid.", total, valid)
}

/// Print the final summary, with a per-status breakdown when `verbose`.
pub fn print_summary(results: &ResultSet, verbose: bool) {
    println!("{}", summary_line(results.len(), results.valid_count()));

    if verbose {
        for (status, count) in results.tally().breakdown() {
            let label = pad_str(status.as_str(), 12, Alignment::Left, None);
            println!("  {} {}", status_style(status, label.to_string()), count);
        }
    }
}

fn status_style(status: Status, text: String) -> StyledObject<String> {
    match status {
        Status::Valid => style(text).green().bold(),
        Status::Parked => style(text).yellow(),
        Status::Redirected => style(text).cyan(),
        Status::Old => style(text).magenta(),
        Status::HttpError | Status::IoError => style(text).red(),
    }
}
