//! Main DNSBL checker implementation.
//!
//! This module provides the `BlacklistChecker` struct that wires the probe
//! engine together: address expansion, one admission-limited task per
//! address, and a single aggregator draining their events.

use crate::aggregator::ResultAggregator;
use crate::concurrent::{probe_address, AdmissionLimiter};
use crate::error::DnsblCheckError;
use crate::protocols::dns::{HickoryLookup, LookupExecutor};
use crate::types::{CheckConfig, CheckReport, ProbeEvent};
use crate::utils::expand_input;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Capacity of the event channel between probe tasks and the aggregator.
const EVENT_BUFFER: usize = 256;

/// Coordinates a checking run.
///
/// # Example
///
/// ```rust,no_run
/// use dnsbl_check_lib::{BlacklistChecker, CheckConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = BlacklistChecker::new(CheckConfig::default())?;
///     let (label, report) = checker.check_input("203.0.113.5", |_| {}).await?;
///
///     for (ip, zones) in &report.results {
///         println!("{} ({}) listed in {}", ip, label, zones.join(", "));
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct BlacklistChecker {
    config: CheckConfig,
    executor: Arc<dyn LookupExecutor>,
}

impl BlacklistChecker {
    /// Create a checker that resolves through the system DNS configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration is unusable.
    pub fn new(config: CheckConfig) -> Result<Self, DnsblCheckError> {
        config.validate()?;
        let executor = Arc::new(HickoryLookup::new(config.timeout));
        Ok(Self { config, executor })
    }

    /// Create a checker with a custom lookup executor.
    pub fn with_executor(
        config: CheckConfig,
        executor: Arc<dyn LookupExecutor>,
    ) -> Result<Self, DnsblCheckError> {
        config.validate()?;
        Ok(Self { config, executor })
    }

    /// Get the configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Expand `input` and probe every resulting address.
    ///
    /// Returns the canonical label of the input together with the report.
    ///
    /// # Errors
    ///
    /// Only input validation can fail; lookup failures never do.
    pub async fn check_input<F>(
        &self,
        input: &str,
        on_event: F,
    ) -> Result<(String, CheckReport), DnsblCheckError>
    where
        F: FnMut(&ProbeEvent),
    {
        let expanded = expand_input(input)?;
        let report = self.check_addresses(&expanded.addresses, on_event).await;
        Ok((expanded.label, report))
    }

    /// Probe `addresses` against every configured blacklist.
    ///
    /// At most `concurrency` addresses are probed at once. Every event is
    /// passed to `on_event` as the aggregator receives it.
    pub async fn check_addresses<F>(&self, addresses: &[String], on_event: F) -> CheckReport
    where
        F: FnMut(&ProbeEvent),
    {
        let start = Instant::now();
        let blacklists: Arc<[String]> = self.config.effective_blacklists().into();
        let limiter = AdmissionLimiter::new(self.config.concurrency);
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        info!(
            addresses = addresses.len(),
            blacklists = blacklists.len(),
            concurrency = self.config.concurrency,
            timeout = ?self.config.timeout,
            "starting DNSBL run"
        );

        let mut tasks = JoinSet::new();
        for address in addresses {
            let address = address.clone();
            let blacklists = Arc::clone(&blacklists);
            let executor = Arc::clone(&self.executor);
            let limiter = limiter.clone();
            let tx = tx.clone();
            let timeout = self.config.timeout;

            tasks.spawn(async move {
                let _permit = match limiter.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        warn!(%address, error = %e, "could not acquire admission slot");
                        return;
                    }
                };
                probe_address(&address, &blacklists, executor.as_ref(), timeout, &tx).await;
            });
        }
        // The aggregator stops once the last task's sender is gone.
        drop(tx);

        let aggregate = ResultAggregator::new().run(rx, on_event);
        let join_all = async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "probe task failed");
                }
            }
        };
        let (results, ()) = tokio::join!(aggregate, join_all);

        let duration = start.elapsed();
        info!(
            listed = results.len(),
            matches = results.match_count(),
            ?duration,
            "DNSBL run finished"
        );

        CheckReport {
            results,
            addresses_checked: addresses.len(),
            lookups_per_address: blacklists.len(),
            duration,
            peak_concurrency: limiter.peak(),
        }
    }
}
