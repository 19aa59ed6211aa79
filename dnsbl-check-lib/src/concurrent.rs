//! Concurrent probing: admission control and the per-address dispatcher.
//!
//! Every address is probed by its own task. Tasks must hold an
//! [`AdmissionPermit`] while probing, which caps the number of addresses in
//! flight at the configured concurrency. Results leave a task only as
//! [`ProbeEvent`]s on a shared channel drained by the result aggregator.

use crate::error::DnsblCheckError;
use crate::protocols::dns::{lookup, LookupExecutor};
use crate::types::{AddressErrorEvent, MatchEvent, ProbeEvent};
use crate::utils::{build_query_name, reverse_address};
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace};

/// Counting admission limiter.
///
/// Cloning shares the same slots. The limiter also records how many permits
/// are held right now and the highest number ever held at once.
#[derive(Clone, Debug)]
pub struct AdmissionLimiter {
    semaphore: Arc<Semaphore>,
    stats: Arc<LimiterStats>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct LimiterStats {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl AdmissionLimiter {
    /// Create a limiter with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            stats: Arc::new(LimiterStats::default()),
            capacity,
        }
    }

    /// Wait for a free slot.
    ///
    /// The slot is released when the returned permit is dropped, whichever
    /// way the holder exits.
    pub async fn acquire(&self) -> Result<AdmissionPermit, DnsblCheckError> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DnsblCheckError::internal("admission limiter closed"))?;

        let now = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.peak.fetch_max(now, Ordering::SeqCst);

        Ok(AdmissionPermit {
            stats: Arc::clone(&self.stats),
            _permit: permit,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits currently held.
    pub fn in_flight(&self) -> usize {
        self.stats.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at the same time so far.
    pub fn peak(&self) -> usize {
        self.stats.peak.load(Ordering::SeqCst)
    }

    /// Slots free right now.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// A held admission slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    stats: Arc<LimiterStats>,
    // Dropped after `Drop::drop` runs, so the counter falls before the slot frees.
    _permit: OwnedSemaphorePermit,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Probe one address against every blacklist, in order.
///
/// - An address that does not split into four octets produces a single
///   `AddressError` event and no lookups.
/// - Each lookup is preceded by a `Checking` event; a `Matched` outcome
///   produces a `Matched` event. Not-listed and transport failures are silent.
/// - Lookups run one after another; a failed lookup never stops the rest.
///
/// Returns early only if the aggregator has gone away.
pub async fn probe_address(
    address: &str,
    blacklists: &[String],
    executor: &dyn LookupExecutor,
    timeout: Duration,
    events: &mpsc::Sender<ProbeEvent>,
) {
    if reverse_address(address).is_none() {
        let _ = events
            .send(address_error(address, "Invalid IP address format"))
            .await;
        return;
    }

    for blacklist in blacklists {
        let query_name = match build_query_name(address, blacklist) {
            Ok(name) => name,
            Err(e) => {
                let _ = events.send(address_error(address, e.to_string())).await;
                return;
            }
        };

        let checking = ProbeEvent::Checking {
            address: address.to_string(),
            blacklist: blacklist.clone(),
        };
        if events.send(checking).await.is_err() {
            return;
        }

        let outcome = lookup(executor, &query_name, timeout).await;
        trace!(%address, %blacklist, ?outcome, "lookup finished");

        if outcome.is_match() {
            let event = ProbeEvent::Matched(MatchEvent {
                address: address.to_string(),
                blacklist: blacklist.clone(),
                timestamp: Utc::now(),
            });
            if events.send(event).await.is_err() {
                return;
            }
        }
    }

    debug!(%address, lookups = blacklists.len(), "address probe complete");
}

fn address_error(address: &str, message: impl Into<String>) -> ProbeEvent {
    ProbeEvent::AddressError(AddressErrorEvent {
        address: address.to_string(),
        message: message.into(),
        timestamp: Utc::now(),
    })
}
