//! In-process settlement broker
//!
//! Topic-named mpsc queues standing in for an external message broker.
//! The `EventPublisher` seam keeps producers decoupled from the transport,
//! so a networked broker can be swapped in behind the same trait.
//!
//! Delivery semantics mirror what the pipeline assumes of a real broker:
//! at-least-once, no ordering guarantee across redeliveries, and a
//! dead-letter topic derived from the primary topic name.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::SettlementEvent;

/// Suffix appended to the primary topic to name the dead-letter topic
pub const DEAD_LETTER_SUFFIX: &str = ".dlq";

/// Failures handing an event to the broker
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("broker channel closed")]
    ChannelClosed,
}

/// One delivery of an event to a consumer. The attempt counter travels
/// with the delivery so the retry budget survives worker handoffs.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event: SettlementEvent,
    pub attempt: u32,
}

/// Producer-side seam: hand an event to the broker.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: SettlementEvent) -> Result<(), PublishError>;
}

/// Consumer-side receivers for a topic pair.
pub struct BrokerQueues {
    pub deliveries: mpsc::UnboundedReceiver<Delivery>,
    pub dead_letters: mpsc::UnboundedReceiver<SettlementEvent>,
}

/// Broker handle: cheap to clone, safe to share across producers and the
/// consumer runtime.
#[derive(Debug, Clone)]
pub struct SettlementBroker {
    topic: String,
    tx: mpsc::UnboundedSender<Delivery>,
    dlq_tx: mpsc::UnboundedSender<SettlementEvent>,
}

impl SettlementBroker {
    /// Create a broker for the given topic, returning the handle and the
    /// receivers the consumer pool drains.
    pub fn new(topic: impl Into<String>) -> (Self, BrokerQueues) {
        let (tx, deliveries) = mpsc::unbounded_channel();
        let (dlq_tx, dead_letters) = mpsc::unbounded_channel();

        (
            Self {
                topic: topic.into(),
                tx,
                dlq_tx,
            },
            BrokerQueues {
                deliveries,
                dead_letters,
            },
        )
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn dead_letter_topic(&self) -> String {
        format!("{}{}", self.topic, DEAD_LETTER_SUFFIX)
    }

    /// Re-enqueue a delivery for another attempt.
    pub(crate) fn redeliver(&self, delivery: Delivery) {
        if self.tx.send(delivery).is_err() {
            tracing::error!(topic = %self.topic, "broker closed, redelivery dropped");
        }
    }

    /// Route an event to the dead-letter topic.
    pub(crate) fn dead_letter(&self, event: SettlementEvent) {
        if self.dlq_tx.send(event).is_err() {
            tracing::error!(
                topic = %self.dead_letter_topic(),
                "dead-letter channel closed, event dropped"
            );
        }
    }
}

#[async_trait]
impl EventPublisher for SettlementBroker {
    async fn publish(&self, event: SettlementEvent) -> Result<(), PublishError> {
        tracing::debug!(
            topic = %self.topic,
            transaction_id = %event.transaction_id,
            "settlement event enqueued"
        );

        self.tx
            .send(Delivery { event, attempt: 1 })
            .map_err(|_| PublishError::ChannelClosed)
    }
}
