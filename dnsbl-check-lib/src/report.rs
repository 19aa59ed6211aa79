//! Report formatting and persistence.
//!
//! Serialises the aggregated result as pretty JSON or as a plain-text listing
//! and writes it to `<label>_<YYYYMMDD_HHMMSS>.<ext>`.

use crate::error::DnsblCheckError;
use crate::types::{AggregatedResult, OutputFormat};
use chrono::{DateTime, TimeZone};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Render the results in the requested format.
///
/// Text output lists each address as:
///
/// ```text
/// IP: 203.0.113.5
/// Blacklisted in:
///   - bl.spamcop.net
///
/// ```
pub fn format_results(
    results: &AggregatedResult,
    format: OutputFormat,
) -> Result<String, DnsblCheckError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
        OutputFormat::Text => Ok(format_text(results)),
    }
}

fn format_text(results: &AggregatedResult) -> String {
    let mut out = String::new();
    for (address, blacklists) in results {
        let _ = writeln!(out, "IP: {}", address);
        out.push_str("Blacklisted in:\n");
        for blacklist in blacklists {
            let _ = writeln!(out, "  - {}", blacklist);
        }
        out.push('\n');
    }
    out
}

/// Report file name for a target label.
///
/// `/` in the label becomes `-` so a subnet label yields a flat file name.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use dnsbl_check_lib::{output_file_name, OutputFormat};
///
/// let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
/// assert_eq!(
///     output_file_name("203.0.113.0/24", OutputFormat::Json, &ts),
///     "203.0.113.0-24_20250314_092653.json"
/// );
/// ```
pub fn output_file_name<Tz>(label: &str, format: OutputFormat, timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        label.replace('/', "-"),
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Format `results` and write them into `dir`.
///
/// Returns the path of the written file.
pub fn write_report<Tz>(
    dir: &Path,
    label: &str,
    results: &AggregatedResult,
    format: OutputFormat,
    timestamp: &DateTime<Tz>,
) -> Result<PathBuf, DnsblCheckError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let content = format_results(results, format)?;

    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| {
            DnsblCheckError::file_error(
                dir.to_string_lossy(),
                format!("Failed to create output directory: {}", e),
            )
        })?;
    }

    let path = dir.join(output_file_name(label, format, timestamp));
    fs::write(&path, content).map_err(|e| {
        DnsblCheckError::file_error(
            path.to_string_lossy(),
            format!("Failed to write report: {}", e),
        )
    })?;

    Ok(path)
}
