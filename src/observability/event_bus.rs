//! Tokio broadcast event bus for search analytics events.
//!
//! Publishing is synchronous and best-effort so the search path never
//! blocks on analytics; consumers run on their own tasks and may lag or
//! disconnect without affecting searches. The bus is injected wherever
//! it is needed, never reached through a global.

use crate::models::SearchEvent;
use tokio::sync::broadcast;

/// Default buffer capacity for a bus.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;

/// Broadcast bus for [`SearchEvent`]s.
///
/// Cloning is cheap and clones share the channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SearchEvent>,
}

/// Filtered receiver that yields events matching a predicate.
pub struct FilteredReceiver<F> {
    receiver: broadcast::Receiver<SearchEvent>,
    predicate: F,
}

impl EventBus {
    /// Creates a new event bus with the given buffer capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers (best effort).
    ///
    /// A send with no live subscribers is counted, not treated as an
    /// error; analytics must never gate a response.
    pub fn publish(&self, event: SearchEvent) {
        metrics::counter!("event_bus_publish_total").increment(1);
        let receivers = self.sender.receiver_count();
        metrics::gauge!("event_bus_receivers").set(receivers as f64);
        match self.sender.send(event) {
            Ok(_) => {
                metrics::gauge!("event_bus_queue_depth").set(self.sender.len() as f64);
            },
            Err(_) => {
                metrics::counter!("event_bus_publish_failed_total").increment(1);
            },
        }
    }

    /// Subscribes to the event bus.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SearchEvent> {
        metrics::counter!("event_bus_subscriptions_total").increment(1);
        metrics::gauge!("event_bus_receivers").set(self.sender.receiver_count() as f64);
        self.sender.subscribe()
    }

    /// Subscribes with a predicate to filter events by type or attributes.
    #[must_use]
    pub fn subscribe_filtered<F>(&self, predicate: F) -> FilteredReceiver<F>
    where
        F: Fn(&SearchEvent) -> bool,
    {
        metrics::counter!("event_bus_subscriptions_total").increment(1);
        metrics::gauge!("event_bus_receivers").set(self.sender.receiver_count() as f64);
        FilteredReceiver {
            receiver: self.sender.subscribe(),
            predicate,
        }
    }

    /// Subscribes to events matching the provided event type.
    #[must_use]
    pub fn subscribe_event_type(
        &self,
        event_type: &'static str,
    ) -> FilteredReceiver<impl Fn(&SearchEvent) -> bool> {
        self.subscribe_filtered(move |event| event.event_type() == event_type)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUS_CAPACITY)
    }
}

impl<F> FilteredReceiver<F>
where
    F: Fn(&SearchEvent) -> bool,
{
    /// Receives the next event that matches the predicate.
    pub async fn recv(&mut self) -> Result<SearchEvent, broadcast::error::RecvError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if (self.predicate)(&event) {
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    metrics::counter!("event_bus_lagged_total").increment(skipped);
                },
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppliedFilters, ProductId, SearchRequest};
    use chrono::Utc;

    fn executed(query: &str) -> SearchEvent {
        SearchEvent::Executed {
            query: query.to_string(),
            filters: AppliedFilters::from(&SearchRequest::new(query)),
            result_count: 1,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();

        bus.publish(executed("sandals"));

        let event = receiver.recv().await.expect("receive event");
        assert_eq!(event.query(), "sandals");
    }

    #[tokio::test]
    async fn test_subscribe_filtered_skips_non_matching() {
        let bus = EventBus::new(16);
        let mut filtered = bus.subscribe_event_type("result_clicked");

        bus.publish(executed("sandals"));
        bus.publish(SearchEvent::ResultClicked {
            product_id: ProductId::new("p1"),
            query: "sandals".to_string(),
            timestamp: Utc::now(),
        });

        let event = filtered.recv().await.expect("receive event");
        assert_eq!(event.event_type(), "result_clicked");
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new(16);
        // No receiver attached; publish must not panic or error.
        bus.publish(executed("lonely"));
    }
}
