//! Domain event envelopes
//!
//! Aggregates queue an [`EventEnvelope`] per emitted event. The envelope
//! records which aggregate produced the event and when; the payload type
//! is the aggregate's own event enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded domain event, queued on its aggregate until drained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<Id, E> {
    /// Identity of the aggregate that produced the event
    pub aggregate_id: Id,
    /// When the mutation committed
    pub occurred_at: DateTime<Utc>,
    /// The event payload
    pub payload: E,
}

impl<Id, E> EventEnvelope<Id, E> {
    /// Wraps a payload with the producing aggregate's id and the current time.
    pub fn new(aggregate_id: Id, payload: E) -> Self {
        Self {
            aggregate_id,
            occurred_at: Utc::now(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamps_current_time() {
        let before = Utc::now();
        let envelope = EventEnvelope::new("order-1", "OrderPaid");
        let after = Utc::now();

        assert_eq!(envelope.aggregate_id, "order-1");
        assert_eq!(envelope.payload, "OrderPaid");
        assert!(envelope.occurred_at >= before && envelope.occurred_at <= after);
    }
}
