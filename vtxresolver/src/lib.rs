//! # vtxresolver - Résolution multi-source d'un flux audio
//!
//! Transforme une demande de piste ([`TrackRequest`]) en flux lisible
//! ([`StreamDescriptor`]) en combinant des sources tierces peu fiables :
//!
//! - les pools Invidious et Piped sont mis en concurrence, instance par
//!   instance ; la première réponse dont la durée est plausible gagne ;
//! - sinon yt-dlp, JioSaavn puis SoundCloud sont essayés dans l'ordre ;
//! - le résultat est gardé en cache pour une durée courte.
//!
//! Avec la feature `server`, la crate expose aussi les endpoints HTTP
//! (`/health`, `/stream-info`, `/stream`, `/warmup`) via [`ResolverServerExt`].
//!
//! ```rust,no_run
//! use vtxresolver::Resolver;
//! use vtxsource::{TrackId, TrackRequest};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = Resolver::from_config(&vtxconfig::get_config())?;
//! let request = TrackRequest::new(TrackId::native("dQw4w9WgXcQ")).with_expected_duration(213);
//! let descriptor = resolver.resolve(&request).await?;
//! println!("{} via {}", descriptor.upstream_url(), descriptor.source_kind);
//! # Ok(())
//! # }
//! ```

pub mod config_ext;
pub mod error;
pub mod filter;
pub mod resolver;

#[cfg(feature = "server")]
pub mod api_rest;
#[cfg(feature = "server")]
pub mod server_ext;

pub use config_ext::ResolverConfigExt;
pub use error::{ResolveError, Result};
pub use filter::DurationTolerance;
pub use resolver::{Resolver, ResolverBuilder, WarmUpSettings};
#[cfg(feature = "server")]
pub use server_ext::ResolverServerExt;

pub use vtxsource::{StreamDescriptor, TrackId, TrackRequest};

use std::sync::Arc;
use tracing::{info, warn};
use vtxcache::MemoryCache;
use vtxconfig::Config;
use vtxextractor::{ExtractorConfigExt, YtDlp};
use vtxproxy::{InvidiousPool, PipedPool, ProxyConfigExt};
use vtxsaavn::{SaavnConfigExt, SaavnSource};
use vtxsoundcloud::{SoundCloudConfigExt, SoundCloudSource};

impl Resolver {
    /// Construit le résolveur et toutes les sources activées dans la configuration
    ///
    /// Ordre du repli : yt-dlp, JioSaavn, SoundCloud. yt-dlp sert aussi à la
    /// recherche par métadonnées des identifiants catalogue.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = Resolver::builder()
            .cache(Arc::new(MemoryCache::new(config.get_resolver_cache_ttl())))
            .tolerance(config.get_duration_tolerance())
            .deadline(config.get_resolver_deadline())
            .search_timeout(config.get_resolver_search_timeout())
            .warm_up(config.get_warm_up_settings());

        if config.get_invidious_enabled() {
            builder = builder.pool(Arc::new(InvidiousPool::from_config(config)?));
        }
        if config.get_piped_enabled() {
            builder = builder.pool(Arc::new(PipedPool::from_config(config)?));
        }

        if config.get_ytdlp_enabled() {
            let ytdlp = Arc::new(YtDlp::from_config(config));
            builder = builder.search(ytdlp.clone()).fallback(ytdlp);
        }
        if config.get_saavn_enabled() {
            builder = builder.fallback(Arc::new(SaavnSource::from_config(config)?));
        }
        if config.get_soundcloud_enabled() {
            builder = builder.fallback(Arc::new(SoundCloudSource::from_config(config)?));
        }

        let resolver = builder.build();
        if resolver.source_count() == 0 {
            warn!("Every stream source is disabled, resolutions will always fail");
        }
        info!(
            "Resolver ready with {} sources (deadline {:?})",
            resolver.source_count(),
            resolver.deadline()
        );
        Ok(resolver)
    }
}
