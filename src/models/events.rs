//! Analytics events emitted by the search pipeline.

use super::{AppliedFilters, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events published on the engine's broadcast bus.
///
/// Publishing is fire-and-forget: the pipeline never waits on delivery
/// and a missing subscriber is not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    /// A search ran to completion.
    Executed {
        /// The query text as normalized. Popular-term counters lowercase
        /// it themselves.
        query: String,
        /// Filters the search applied.
        filters: AppliedFilters,
        /// Total matches before pagination.
        result_count: usize,
        /// When the search ran.
        timestamp: DateTime<Utc>,
    },
    /// A caller clicked through to a product from a result page.
    ResultClicked {
        /// The clicked product.
        product_id: ProductId,
        /// The query that produced the result page.
        query: String,
        /// When the click happened.
        timestamp: DateTime<Utc>,
    },
}

impl SearchEvent {
    /// Returns the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Executed { .. } => "executed",
            Self::ResultClicked { .. } => "result_clicked",
        }
    }

    /// Returns the query associated with the event.
    #[must_use]
    pub fn query(&self) -> &str {
        match self {
            Self::Executed { query, .. } | Self::ResultClicked { query, .. } => query,
        }
    }

    /// Returns when the event happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Executed { timestamp, .. } | Self::ResultClicked { timestamp, .. } => *timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let event = SearchEvent::ResultClicked {
            product_id: ProductId::new("p9"),
            query: "sandals".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "result_clicked");
        assert_eq!(event.query(), "sandals");
    }
}
