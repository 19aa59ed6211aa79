//! # DNSBL Check Library
//!
//! Checks an IPv4 address, or every address of a /24 subnet, against DNS-based
//! blackhole lists (DNSBLs).
//!
//! For each address one reversed-IP query is issued per configured list
//! (`5.113.0.203.bl.spamcop.net` for `203.0.113.5`); any successful resolution
//! counts as listed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dnsbl_check_lib::{BlacklistChecker, CheckConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = BlacklistChecker::new(CheckConfig::default())?;
//!     let (_label, report) = checker.check_input("203.0.113.0/24", |_| {}).await?;
//!
//!     println!("{} listed addresses", report.results.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Bounded concurrency**: at most `concurrency` addresses probed at once
//! - **Hard per-lookup timeouts**: slow resolvers never stall a run
//! - **Single aggregator**: probe tasks only send events, one consumer owns the result
//! - **Pluggable lookups**: swap the DNS executor for tests or custom resolvers

// Re-export main public API types and functions
pub use aggregator::ResultAggregator;
pub use checker::BlacklistChecker;
pub use concurrent::{probe_address, AdmissionLimiter, AdmissionPermit};
pub use config::{
    load_env_config, parse_timeout_string, BlacklistsConfig, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig,
};
pub use error::DnsblCheckError;
pub use protocols::dns::{lookup, HickoryLookup, LookupExecutor};
pub use protocols::registry::{default_blacklists, is_default_blacklist, is_valid_zone};
pub use report::{format_results, output_file_name, write_report};
pub use types::{
    AddressErrorEvent, AggregatedResult, CheckConfig, CheckReport, ExpandedInput, LookupOutcome,
    MatchEvent, OutputFormat, ProbeEvent, MAX_CONCURRENCY,
};
pub use utils::{build_query_name, expand_input, reverse_address, SUPPORTED_PREFIX};

// Internal modules - these are not part of the public API
mod aggregator;
mod checker;
mod concurrent;
mod config;
mod error;
mod protocols;
mod report;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DnsblCheckError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
