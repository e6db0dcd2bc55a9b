//! # VTXSource
//!
//! Common traits and types for Vortex stream sources.
//!
//! Every upstream able to turn a track identifier into a playable media URL
//! is wrapped in an adapter implementing one of the traits below:
//!
//! - [`InstancePool`]: community-run mirrors (Invidious, Piped). Each
//!   instance is queried independently so the resolver can race them.
//! - [`StreamSource`]: heavier adapters tried one after the other
//!   (yt-dlp, JioSaavn, SoundCloud).
//! - [`TrackSearch`]: maps title/artist hints to a native identifier.
//!
//! All adapters return a [`StreamDescriptor`] or a [`SourceError`]; errors are
//! isolated at the adapter boundary and never abort a resolution.
//!
//! ## Implementing a source
//!
//! ```rust,no_run
//! use vtxsource::{Lookup, SourceKind, StreamDescriptor, StreamSource, Result};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Fixed;
//!
//! #[async_trait::async_trait]
//! impl StreamSource for Fixed {
//!     fn kind(&self) -> SourceKind {
//!         SourceKind::GeneralExtractor
//!     }
//!
//!     fn timeout(&self) -> Duration {
//!         Duration::from_secs(5)
//!     }
//!
//!     async fn resolve(&self, lookup: &Lookup<'_>) -> Result<StreamDescriptor> {
//!         StreamDescriptor::new(self.kind(), format!("https://cdn.example/{}", lookup.effective_id))
//!     }
//! }
//! ```

pub mod error;
pub mod models;
pub mod race;

pub use error::{Result, SourceError};
pub use models::{
    CATALOG_ID_PREFIX, Lookup, NATIVE_ID_LEN, SourceKind, StreamDescriptor, TrackId,
    TrackRequest, is_native_id,
};

use std::fmt::Debug;
use std::time::Duration;

/// An adapter resolving a whole request on its own
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: a single instance serves all
/// concurrent resolutions.
#[async_trait::async_trait]
pub trait StreamSource: Debug + Send + Sync {
    /// Which upstream family this adapter talks to
    fn kind(&self) -> SourceKind;

    /// Upper bound for one `resolve` call
    fn timeout(&self) -> Duration;

    /// Whether this adapter can do anything with `request`
    ///
    /// The resolver skips adapters answering `false` without calling them.
    fn accepts(&self, _request: &TrackRequest) -> bool {
        true
    }

    /// Resolves the lookup into a playable descriptor
    async fn resolve(&self, lookup: &Lookup<'_>) -> Result<StreamDescriptor>;
}

/// A pool of interchangeable public mirrors
///
/// Instances are unreliable: any of them may be down, rate limited or return
/// no audio. Each [`query`](InstancePool::query) is an independent failure.
#[async_trait::async_trait]
pub trait InstancePool: Debug + Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Upper bound for a single instance call
    fn instance_timeout(&self) -> Duration;

    /// Instances to try for one resolution (randomly shuffled, possibly truncated)
    fn instances(&self) -> Vec<String>;

    /// Asks one instance for the best audio stream of `video_id`
    async fn query(&self, instance: &str, video_id: &str) -> Result<StreamDescriptor>;

    /// Races every instance of this pool and returns the first answer
    async fn resolve_any(&self, video_id: &str) -> Result<StreamDescriptor> {
        let limit = self.instance_timeout();
        let calls = self
            .instances()
            .into_iter()
            .map(|instance| async move {
                race::with_timeout(limit, self.query(&instance, video_id)).await
            })
            .collect::<Vec<_>>();

        race::first_accepted(calls, |_| true).await.winner.ok_or_else(|| {
            SourceError::unavailable(format!("no {} instance answered", self.kind()))
        })
    }
}

/// Maps search hints to a native identifier
#[async_trait::async_trait]
pub trait TrackSearch: Debug + Send + Sync {
    /// Upper bound for one search
    fn timeout(&self) -> Duration;

    /// Returns the best matching native identifier for `query`, if any
    async fn find_native_id(&self, query: &str) -> Result<Option<String>>;
}
