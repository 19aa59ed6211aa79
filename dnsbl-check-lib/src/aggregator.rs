//! Single-consumer aggregation of probe events.

use crate::types::{AggregatedResult, ProbeEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// Exclusive owner of the aggregated result while a run is in progress.
///
/// Probe tasks never see the mapping; they only send events. Exactly one
/// aggregator drains the channel, so the mapping needs no locking.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: AggregatedResult,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the mapping.
    ///
    /// Only `Matched` events are stored. Address errors are left to the
    /// `on_event` observer and only traced here at debug level.
    pub fn absorb(&mut self, event: &ProbeEvent) {
        match event {
            ProbeEvent::Matched(m) => self.results.record(&m.address, &m.blacklist),
            ProbeEvent::AddressError(e) => {
                debug!(address = %e.address, message = %e.message, "address skipped");
            }
            ProbeEvent::Checking { .. } => {}
        }
    }

    /// Drain `events` until every sender has been dropped.
    ///
    /// Each event is shown to `on_event` before it is folded in, so callers
    /// can narrate progress and surface address errors immediately.
    pub async fn run<F>(mut self, mut events: mpsc::Receiver<ProbeEvent>, mut on_event: F) -> AggregatedResult
    where
        F: FnMut(&ProbeEvent),
    {
        while let Some(event) = events.recv().await {
            on_event(&event);
            self.absorb(&event);
        }
        self.results
    }

    pub fn into_results(self) -> AggregatedResult {
        self.results
    }
}
