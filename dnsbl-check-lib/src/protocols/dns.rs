//! DNS lookup executor for DNSBL queries.
//!
//! A DNSBL answers a reversed-IP query name with an address record when the
//! IP is listed and with NXDOMAIN when it is not. Any successful resolution
//! counts as listed; the returned record content is not interpreted.

use crate::types::LookupOutcome;
use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::time::Duration;
use tracing::debug;

/// Performs one DNS resolution for a query name.
///
/// Implementations must be safe to call from many probe tasks at once and
/// must not hold mutable state between calls. Timeouts are enforced by
/// [`lookup`], so an implementation may simply await the network.
#[async_trait]
pub trait LookupExecutor: Send + Sync {
    async fn resolve(&self, query_name: &str) -> LookupOutcome;
}

/// Resolve `query_name` with a hard wall-clock limit.
///
/// On expiry the in-flight resolution future is dropped, which releases its
/// socket, and the lookup is reported as `TransportError`.
pub async fn lookup(
    executor: &dyn LookupExecutor,
    query_name: &str,
    timeout: Duration,
) -> LookupOutcome {
    match tokio::time::timeout(timeout, executor.resolve(query_name)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            debug!(query = %query_name, ?timeout, "DNSBL lookup timed out");
            LookupOutcome::TransportError
        }
    }
}

/// Lookup executor backed by the hickory async resolver.
///
/// One resolver is built per run and shared by every probe task; cloning is
/// cheap.
#[derive(Clone)]
pub struct HickoryLookup {
    resolver: TokioResolver,
}

impl HickoryLookup {
    /// Build a resolver from the system configuration, falling back to the
    /// default upstream servers when it cannot be read.
    ///
    /// The resolver's own per-request timeout is set to `timeout` and it
    /// makes a single attempt per query.
    pub fn new(timeout: Duration) -> Self {
        let mut builder = TokioResolver::builder_tokio().unwrap_or_else(|e| {
            debug!(error = %e, "System resolver config unavailable, using defaults");
            TokioResolver::builder_with_config(
                ResolverConfig::default(),
                TokioConnectionProvider::default(),
            )
        });

        let opts = builder.options_mut();
        opts.timeout = timeout;
        opts.attempts = 1;

        Self {
            resolver: builder.build(),
        }
    }
}

#[async_trait]
impl LookupExecutor for HickoryLookup {
    async fn resolve(&self, query_name: &str) -> LookupOutcome {
        let fqdn = fully_qualified(query_name);

        match self.resolver.lookup_ip(fqdn.as_str()).await {
            Ok(response) => {
                if response.iter().next().is_some() {
                    debug!(query = %fqdn, "DNSBL listed");
                    LookupOutcome::Matched
                } else {
                    LookupOutcome::NotMatched
                }
            }
            Err(e) if e.is_no_records_found() => LookupOutcome::NotMatched,
            Err(e) => {
                debug!(query = %fqdn, error = %e, "DNSBL lookup failed");
                LookupOutcome::TransportError
            }
        }
    }
}

/// Append the root label so search domains are never tried.
fn fully_qualified(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}
