//! Search analytics collection.
//!
//! The pipeline publishes [`SearchEvent`]s on the broadcast bus and
//! moves on; the [`AnalyticsDispatcher`] is the long-running consumer
//! that drains the bus into an [`AnalyticsSink`]. Losing events under
//! pressure is acceptable, slowing searches down is not.

use crate::models::SearchEvent;
use crate::observability::EventBus;
use crate::storage::PopularTerms;
use crate::Result;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Destination for search events.
///
/// Implementations must absorb their own failures where possible; a
/// returned error is counted and logged by the dispatcher but never
/// reaches a search caller.
pub trait AnalyticsSink: Send + Sync {
    /// Records one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot store the event.
    fn record(&self, event: &SearchEvent) -> Result<()>;
}

/// In-process sink keeping a bounded view of events and feeding the
/// popular-terms counter that suggestion sources read.
pub struct InMemoryAnalytics {
    /// Recorded events, oldest first.
    history: RwLock<Vec<SearchEvent>>,
    /// Shared counter behind the popular-searches suggestion source.
    popular: PopularTerms,
}

impl InMemoryAnalytics {
    /// Creates a sink feeding the given popular-terms counter.
    ///
    /// The counter is clone-shared: hand the same instance to the
    /// suggestion backend so executed searches start influencing
    /// suggestions immediately.
    #[must_use]
    pub fn new(popular: PopularTerms) -> Self {
        Self {
            history: RwLock::new(Vec::new()),
            popular,
        }
    }

    /// Snapshot of all recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SearchEvent> {
        self.history
            .read()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// The most recent `limit` events, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<SearchEvent> {
        self.history
            .read()
            .map(|history| history.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.read().map(|history| history.len()).unwrap_or(0)
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnalyticsSink for InMemoryAnalytics {
    fn record(&self, event: &SearchEvent) -> Result<()> {
        if let SearchEvent::Executed { query, .. } = event {
            self.popular.increment(query);
        }
        // A poisoned history lock degrades to counting only; analytics
        // must never propagate a panic from another thread.
        if let Ok(mut history) = self.history.write() {
            history.push(event.clone());
        }
        Ok(())
    }
}

/// Long-running consumer draining the event bus into a sink.
pub struct AnalyticsDispatcher {
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsDispatcher {
    /// Creates a dispatcher writing to the given sink.
    #[must_use]
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { sink }
    }

    /// Runs the dispatcher until the event bus closes.
    ///
    /// Spawn this as a background task. Lagged events are counted and
    /// skipped; sink errors are counted and logged.
    pub async fn run(&self, event_bus: &EventBus) {
        let mut receiver = event_bus.subscribe();

        loop {
            match receiver.recv().await {
                Ok(event) => {
                    metrics::counter!(
                        "analytics_events_total",
                        "event_type" => event.event_type()
                    )
                    .increment(1);
                    if let Err(error) = self.sink.record(&event) {
                        metrics::counter!("analytics_record_failed_total").increment(1);
                        tracing::warn!(
                            event_type = event.event_type(),
                            error = %error,
                            "Analytics sink rejected event"
                        );
                    }
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    metrics::counter!("analytics_events_lagged_total").increment(skipped);
                    tracing::warn!(
                        skipped = skipped,
                        "Analytics dispatcher lagged behind event bus"
                    );
                },
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, analytics dispatcher shutting down");
                    break;
                },
            }
        }
    }
}
