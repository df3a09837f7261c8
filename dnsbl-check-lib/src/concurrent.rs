//! Concurrent processing utilities for blacklist lookups.
//!
//! This module fans (address, provider) pairs out into Tokio tasks and
//! merges their outcomes into one stream. Every task owns a clone of the
//! channel sender, so the stream ends exactly when the last task has
//! delivered its outcome.

use crate::error::DnsblError;
use crate::lookup::lookup;
use crate::providers::DnsblProvider;
use crate::types::LookupOutcome;
use futures::stream::Stream;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

/// Stream of lookup outcomes in completion order.
///
/// Yields exactly one outcome per scheduled pair, then ends.
#[derive(Debug)]
pub struct OutcomeStream {
    rx: mpsc::Receiver<LookupOutcome>,
    expected: usize,
    received: usize,
}

impl OutcomeStream {
    /// Number of outcomes this stream will yield in total.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Number of outcomes not yet received.
    pub fn remaining(&self) -> usize {
        self.expected.saturating_sub(self.received)
    }

    /// Wait for the next outcome. `None` once every pair has reported.
    pub async fn next_outcome(&mut self) -> Option<LookupOutcome> {
        let outcome = self.rx.recv().await;
        if outcome.is_some() {
            self.received += 1;
        }
        outcome
    }

    /// Drain the stream into a vector.
    pub async fn collect_all(mut self) -> Vec<LookupOutcome> {
        let mut outcomes = Vec::with_capacity(self.expected);
        while let Some(outcome) = self.next_outcome().await {
            outcomes.push(outcome);
        }
        outcomes
    }
}

impl Stream for OutcomeStream {
    type Item = LookupOutcome;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.rx.poll_recv(cx);
        if let Poll::Ready(Some(_)) = &polled {
            self.received += 1;
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

/// Spawn one task per (address, provider) pair.
///
/// At most `concurrency` lookups run at the same time; the channel holds
/// up to `concurrency` undelivered outcomes before producers wait.
/// Must be called from within a Tokio runtime.
pub(crate) fn fan_out(
    addresses: Vec<String>,
    providers: &[Arc<dyn DnsblProvider>],
    concurrency: usize,
) -> OutcomeStream {
    let concurrency = concurrency.max(1);
    let expected = addresses.len() * providers.len();
    let (tx, rx) = mpsc::channel(concurrency);
    let permits = Arc::new(Semaphore::new(concurrency));

    debug!(
        addresses = addresses.len(),
        providers = providers.len(),
        concurrency,
        "scheduling lookups"
    );

    for address in &addresses {
        for provider in providers {
            let tx = tx.clone();
            let permits = Arc::clone(&permits);
            let provider = Arc::clone(provider);
            let address = address.clone();

            tokio::spawn(async move {
                let outcome = {
                    // The semaphore is never closed, so acquire only fails if it were.
                    let _permit = permits.acquire_owned().await.ok();
                    guarded_lookup(&address, provider.as_ref()).await
                };

                if tx.send(outcome).await.is_err() {
                    debug!(%address, provider = provider.name(), "outcome dropped, receiver gone");
                }
            });
        }
    }

    OutcomeStream {
        rx,
        expected,
        received: 0,
    }
}

/// Run a lookup, turning a panicking provider into an `Error` outcome.
pub(crate) async fn guarded_lookup(address: &str, provider: &dyn DnsblProvider) -> LookupOutcome {
    match AssertUnwindSafe(lookup(address, provider))
        .catch_unwind()
        .await
    {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(address, provider = provider.name(), %message, "provider panicked");
            LookupOutcome::error(
                address,
                provider.name(),
                DnsblError::internal(format!("provider panicked: {}", message)),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
