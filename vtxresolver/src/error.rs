//! Errors surfaced by the resolver
//!
//! Adapter failures never show up here: they are logged and the next
//! candidate is tried. Only the two terminal outcomes reach the caller.

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolveError>;

#[derive(Error, Debug)]
pub enum ResolveError {
    /// Every pool instance and every fallback adapter failed
    #[error("No playable stream found")]
    Exhausted,

    /// The overall deadline expired before any source succeeded
    #[error("No playable stream found within {0:?}")]
    DeadlineExceeded(Duration),
}
