//! Delimited input and output.
//!
//! Domains are read from one column of a CSV file whose first row is a
//! header. Results are written back as CSV with the header
//! `domain,status,message`.

use crate::aggregate::ResultSet;
use crate::error::DomainProbeError;
use crate::types::ClassificationResult;
use crate::utils::clean_domain_input;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{info, warn};

/// Zero-based column that holds the domain name by default.
pub const DEFAULT_DOMAIN_COLUMN: usize = 3;

/// Header row of the results file.
pub const OUTPUT_HEADER: [&str; 3] = ["domain", "status", "message"];

/// Read domain names from a CSV file.
///
/// # Errors
///
/// Returns `DomainProbeError::FileError` if the file cannot be opened and
/// `DomainProbeError::CsvError` if it cannot be parsed.
pub fn read_domains<P: AsRef<Path>>(
    path: P,
    column: usize,
) -> Result<Vec<String>, DomainProbeError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        DomainProbeError::file_error(
            path.to_string_lossy(),
            format!("Failed to open input file: {}", e),
        )
    })?;

    let domains = read_domains_from_reader(file, column)?;
    info!(path = %path.display(), count = domains.len(), "loaded domains");
    Ok(domains)
}

/// Read domain names from CSV data.
///
/// The first record is treated as a header and skipped. Records may have
/// different widths; records without `column`, and empty values, are
/// skipped with a warning.
pub fn read_domains_from_reader<R: Read>(
    reader: R,
    column: usize,
) -> Result<Vec<String>, DomainProbeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut domains = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        // +2: one for the header, one for 1-based line numbers
        let line = index + 2;

        match record.get(column).and_then(clean_domain_input) {
            Some(domain) => domains.push(domain),
            None => warn!(line, column, "no domain in record, skipping"),
        }
    }

    Ok(domains)
}

/// Write results to a CSV file, creating or truncating it.
///
/// # Errors
///
/// Returns `DomainProbeError::FileError` if the file cannot be created.
pub fn write_results<P: AsRef<Path>>(path: P, results: &ResultSet) -> Result<usize, DomainProbeError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        DomainProbeError::file_error(
            path.to_string_lossy(),
            format!("Failed to create output file: {}", e),
        )
    })?;

    let written = write_results_to_writer(file, results.results())?;
    info!(path = %path.display(), rows = written, "wrote results");
    Ok(written)
}

/// Write results as CSV to any writer. Returns the number of data rows.
///
/// Entries with an empty domain are skipped.
pub fn write_results_to_writer<W: Write>(
    writer: W,
    results: &[ClassificationResult],
) -> Result<usize, DomainProbeError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(OUTPUT_HEADER)?;

    let mut written = 0;
    for result in results {
        if result.domain.is_empty() {
            continue;
        }
        info!(
            domain = %result.domain,
            status = %result.status,
            message = %result.message,
            "result"
        );
        csv_writer.write_record([
            result.domain.as_str(),
            result.status.as_str(),
            result.message.as_str(),
        ])?;
        written += 1;
    }

    csv_writer.flush()?;
    Ok(written)
}
