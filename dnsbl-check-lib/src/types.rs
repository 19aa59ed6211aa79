//! Core data types for DNSBL checking.
//!
//! This module defines the run configuration, lookup outcomes, the events
//! that flow from probe tasks to the aggregator, and the aggregated result.

use crate::protocols::registry::default_blacklists;
use crate::error::DnsblCheckError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound accepted for the concurrency setting.
pub const MAX_CONCURRENCY: usize = 1000;

/// Configuration for one checking run.
///
/// Loaded once before dispatch begins and never mutated while probes run.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    /// Maximum number of addresses probed at the same time
    /// Default: 100
    pub concurrency: usize,

    /// Hard wall-clock limit for each individual DNS lookup
    /// Default: 3 seconds
    pub timeout: Duration,

    /// Primary list of DNSBL zones, probed first
    /// Default: the built-in registry
    pub blacklists: Vec<String>,

    /// User-supplied zones, probed after `blacklists`
    /// Default: empty
    pub custom_blacklists: Vec<String>,

    /// Format of the report file
    /// Default: JSON
    pub output_format: OutputFormat,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 100,
            timeout: Duration::from_secs(3),
            blacklists: default_blacklists(),
            custom_blacklists: Vec::new(),
            output_format: OutputFormat::Json,
        }
    }
}

impl CheckConfig {
    /// Set the concurrency cap, clamped to `1..=MAX_CONCURRENCY`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENCY);
        self
    }

    /// Set the per-lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the primary blacklist list.
    pub fn with_blacklists(mut self, blacklists: Vec<String>) -> Self {
        self.blacklists = blacklists;
        self
    }

    /// Replace the custom blacklist list.
    pub fn with_custom_blacklists(mut self, custom: Vec<String>) -> Self {
        self.custom_blacklists = custom;
        self
    }

    /// Set the report output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// The zones every address is probed against: primary list followed by
    /// custom list. Duplicates are kept.
    pub fn effective_blacklists(&self) -> Vec<String> {
        self.blacklists
            .iter()
            .chain(self.custom_blacklists.iter())
            .cloned()
            .collect()
    }

    /// Reject settings the probe engine cannot run with.
    pub fn validate(&self) -> Result<(), DnsblCheckError> {
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(DnsblCheckError::config(format!(
                "Concurrency must be between 1 and {}",
                MAX_CONCURRENCY
            )));
        }
        if self.timeout.is_zero() {
            return Err(DnsblCheckError::config("Timeout must be greater than zero"));
        }
        Ok(())
    }
}

/// Report file format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl OutputFormat {
    /// File extension used for report files of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = DnsblCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(DnsblCheckError::config(format!(
                "Unsupported output format '{}'. Use 'json' or 'text'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Outcome of a single DNSBL lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The query name resolved to at least one record
    Matched,
    /// The zone answered that the name does not exist
    NotMatched,
    /// Timeout, unreachable server, malformed response, ...
    TransportError,
}

impl LookupOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, LookupOutcome::Matched)
    }
}

/// An address was found on a blacklist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchEvent {
    pub address: String,
    pub blacklist: String,
    pub timestamp: DateTime<Utc>,
}

/// An address failed validation before any lookup was attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressErrorEvent {
    pub address: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything a probe task can tell the aggregator.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeEvent {
    /// A lookup is about to be issued (progress narration only)
    Checking { address: String, blacklist: String },
    Matched(MatchEvent),
    AddressError(AddressErrorEvent),
}

/// Addresses produced by expanding the user's target.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedInput {
    pub addresses: Vec<String>,
    /// Canonical form of the target, used to name the report file
    pub label: String,
}

/// Mapping from address to the blacklists that listed it.
///
/// Per-address lists keep arrival order and may contain duplicates when a
/// zone is configured twice. Addresses iterate in sorted order so that
/// serialised reports are stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AggregatedResult {
    listings: BTreeMap<String, Vec<String>>,
}

impl AggregatedResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `blacklist` to the list for `address`.
    pub fn record(&mut self, address: impl Into<String>, blacklist: impl Into<String>) {
        self.listings
            .entry(address.into())
            .or_default()
            .push(blacklist.into());
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Number of listed addresses.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Total number of (address, blacklist) matches.
    pub fn match_count(&self) -> usize {
        self.listings.values().map(Vec::len).sum()
    }

    pub fn get(&self, address: &str) -> Option<&[String]> {
        self.listings.get(address).map(Vec::as_slice)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.listings.iter()
    }
}

impl<'a> IntoIterator for &'a AggregatedResult {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.listings.iter()
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub results: AggregatedResult,
    pub addresses_checked: usize,
    pub lookups_per_address: usize,
    pub duration: Duration,
    /// Highest number of probes that held an admission slot at once
    pub peak_concurrency: usize,
}
