//! Structured "first acceptable result wins" race
//!
//! All candidates are polled concurrently and their outcomes are consumed in
//! completion order. As soon as one is accepted the remaining futures are
//! dropped, which cancels them (in-flight HTTP requests are aborted, child
//! processes spawned with `kill_on_drop` are killed). Late results are never
//! observed.

use crate::error::{Result, SourceError};
use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// What happened during a race
#[derive(Debug)]
pub struct RaceOutcome<T> {
    /// The first accepted value, if any
    pub winner: Option<T>,
    /// Candidates that completed with an error
    pub failed: usize,
    /// Candidates that completed but were refused by the acceptance test
    pub rejected: usize,
    /// Candidates still in flight when the race ended (abandoned)
    pub abandoned: usize,
}

/// Runs every candidate concurrently and returns the first value passing `accept`
pub async fn first_accepted<I, F, T, E, A>(candidates: I, mut accept: A) -> RaceOutcome<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = std::result::Result<T, E>>,
    A: FnMut(&T) -> bool,
{
    let mut pending: FuturesUnordered<F> = candidates.into_iter().collect();
    let mut failed = 0;
    let mut rejected = 0;

    while let Some(outcome) = pending.next().await {
        match outcome {
            Ok(value) if accept(&value) => {
                return RaceOutcome {
                    winner: Some(value),
                    failed,
                    rejected,
                    abandoned: pending.len(),
                };
            }
            Ok(_) => rejected += 1,
            Err(_) => failed += 1,
        }
    }

    debug!(failed, rejected, "Race ended without an accepted candidate");
    RaceOutcome {
        winner: None,
        failed,
        rejected,
        abandoned: 0,
    }
}

/// Bounds `fut` by `limit`, mapping expiry to [`SourceError::Timeout`]
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(limit)),
    }
}
