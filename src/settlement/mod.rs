//! Settlement Pipeline
//!
//! Asynchronous half of the transaction lifecycle. Registration publishes
//! a settlement event after the durable write; a pool of consumer workers
//! moves each transaction from Pending to a terminal status, with bounded
//! retry and a dead-letter fallback that records Error.

mod broker;
mod consumer;
mod event;

pub use broker::{
    BrokerQueues, Delivery, EventPublisher, PublishError, SettlementBroker, DEAD_LETTER_SUFFIX,
};
pub use consumer::{settle, ConsumerPool, RetryPolicy, SettlementOutcome};
pub use event::SettlementEvent;
