//! Settlement consumer pool
//!
//! Workers drain the settlement topic and move each transaction from
//! Pending to Approved. Handling returns an explicit `SettlementOutcome`
//! that the worker runtime inspects to decide between acking, delayed
//! redelivery, and dead-letter routing; handlers never signal retry by
//! unwinding.
//!
//! All status writes go through `TransactionStore::transition_status`, so
//! concurrent deliveries for the same id cannot interleave into an
//! inconsistent state: the first terminal write wins and every later one
//! is a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::domain::TransactionStatus;
use crate::store::{StatusTransition, TransactionStore};

use super::{BrokerQueues, Delivery, SettlementBroker, SettlementEvent};

/// Outcome of handling one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// The record was Pending and is now Approved
    Settled,
    /// The record already reached a terminal status; redelivery ignored
    AlreadyTerminal,
    /// Transient failure worth another attempt
    Retry(String),
    /// Unrecoverable: the event references no known record
    Fatal(String),
}

/// Redelivery budget and backoff shape.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total handling attempts per event, first delivery included
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub base_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given attempt number (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * self.multiplier.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Handle one settlement event against the store.
///
/// The stored record is the source of truth; the snapshot in the event is
/// only trusted for its id.
pub async fn settle(
    store: &dyn TransactionStore,
    event: &SettlementEvent,
) -> SettlementOutcome {
    match store
        .transition_status(event.transaction_id, TransactionStatus::Approved)
        .await
    {
        Ok(StatusTransition::Applied) => SettlementOutcome::Settled,
        Ok(StatusTransition::AlreadyTerminal) => SettlementOutcome::AlreadyTerminal,
        Ok(StatusTransition::NotFound) => SettlementOutcome::Fatal(format!(
            "transaction {} has no stored record",
            event.transaction_id
        )),
        Err(e) => SettlementOutcome::Retry(e.to_string()),
    }
}

/// Pool of settlement workers plus the dead-letter handler.
pub struct ConsumerPool {
    store: Arc<dyn TransactionStore>,
    broker: SettlementBroker,
    policy: RetryPolicy,
    workers: usize,
}

impl ConsumerPool {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        broker: SettlementBroker,
        policy: RetryPolicy,
        workers: usize,
    ) -> Self {
        Self {
            store,
            broker,
            policy,
            workers: workers.max(1),
        }
    }

    /// Spawn the workers and the dead-letter handler.
    ///
    /// Workers stop when the broker's producer side is dropped; the
    /// returned handles let the binary abort them on shutdown.
    pub fn start(self, queues: BrokerQueues) -> Vec<JoinHandle<()>> {
        let shared = Arc::new(Mutex::new(queues.deliveries));
        let mut handles = Vec::with_capacity(self.workers + 1);

        for worker in 0..self.workers {
            handles.push(tokio::spawn(run_worker(
                worker,
                shared.clone(),
                self.store.clone(),
                self.broker.clone(),
                self.policy.clone(),
            )));
        }

        handles.push(tokio::spawn(run_dead_letter_handler(
            queues.dead_letters,
            self.store.clone(),
            self.broker.dead_letter_topic(),
        )));

        tracing::info!(
            topic = %self.broker.topic(),
            workers = self.workers,
            "settlement consumers started"
        );

        handles
    }
}

async fn run_worker(
    worker: usize,
    queue: Arc<Mutex<mpsc::UnboundedReceiver<Delivery>>>,
    store: Arc<dyn TransactionStore>,
    broker: SettlementBroker,
    policy: RetryPolicy,
) {
    loop {
        // The lock is held only while waiting for the next delivery;
        // handling runs with the queue released so workers stay concurrent.
        let delivery = { queue.lock().await.recv().await };
        let Some(delivery) = delivery else { break };

        handle_delivery(worker, delivery, &*store, &broker, &policy).await;
    }

    tracing::debug!(worker, "settlement worker stopped");
}

async fn handle_delivery(
    worker: usize,
    delivery: Delivery,
    store: &dyn TransactionStore,
    broker: &SettlementBroker,
    policy: &RetryPolicy,
) {
    let transaction_id = delivery.event.transaction_id;
    let outcome = settle(store, &delivery.event).await;

    match outcome {
        SettlementOutcome::Settled => {
            tracing::info!(
                worker,
                %transaction_id,
                attempt = delivery.attempt,
                "transaction approved"
            );
        }
        SettlementOutcome::AlreadyTerminal => {
            tracing::debug!(
                worker,
                %transaction_id,
                "redelivery for a settled transaction ignored"
            );
        }
        SettlementOutcome::Fatal(reason) => {
            tracing::error!(worker, %transaction_id, %reason, "unrecoverable event");
            broker.dead_letter(delivery.event);
        }
        SettlementOutcome::Retry(reason) => {
            if delivery.attempt >= policy.max_attempts {
                tracing::warn!(
                    worker,
                    %transaction_id,
                    attempts = delivery.attempt,
                    %reason,
                    "retry budget exhausted, routing to dead letter"
                );
                broker.dead_letter(delivery.event);
            } else {
                let delay = policy.delay_after(delivery.attempt);
                tracing::warn!(
                    worker,
                    %transaction_id,
                    attempt = delivery.attempt,
                    delay_ms = delay.as_millis() as u64,
                    %reason,
                    "settlement failed, scheduling redelivery"
                );

                // The timer runs off-worker so a backed-off event does not
                // hold a worker slot.
                let broker = broker.clone();
                let next = Delivery {
                    event: delivery.event,
                    attempt: delivery.attempt + 1,
                };
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    broker.redeliver(next);
                });
            }
        }
    }
}

/// Drain the dead-letter topic, marking each resolvable transaction as
/// errored. An id that resolves nowhere is logged and dropped; there is
/// no further fallback.
async fn run_dead_letter_handler(
    mut dead_letters: mpsc::UnboundedReceiver<SettlementEvent>,
    store: Arc<dyn TransactionStore>,
    topic: String,
) {
    while let Some(event) = dead_letters.recv().await {
        let transaction_id = event.transaction_id;
        tracing::error!(%topic, %transaction_id, "settlement exhausted, recording error status");

        match store
            .transition_status(transaction_id, TransactionStatus::Error)
            .await
        {
            Ok(StatusTransition::Applied) => {}
            Ok(StatusTransition::AlreadyTerminal) => {
                tracing::debug!(%transaction_id, "dead letter for a settled transaction ignored");
            }
            Ok(StatusTransition::NotFound) => {
                tracing::error!(%transaction_id, "dead-lettered transaction unresolvable, dropped");
            }
            Err(e) => {
                tracing::error!(%transaction_id, error = %e, "failed to record error status, dropped");
            }
        }
    }

    tracing::debug!(%topic, "dead-letter handler stopped");
}
