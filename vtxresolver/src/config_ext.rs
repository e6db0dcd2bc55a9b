//! Extension pour lire la configuration du résolveur dans vtxconfig
//!
//! ```yaml
//! resolver:
//!   deadline_secs: 25
//!   search_timeout_secs: 4
//!   cache:
//!     ttl_secs: 1800
//!   duration_tolerance:
//!     ratio: 0.15
//!     cap_secs: 30
//!   warmup:
//!     max_tracks: 10
//!     concurrency: 4
//! ```

use crate::filter::{DEFAULT_CAP_SECONDS, DEFAULT_RATIO, DurationTolerance};
use crate::resolver::{
    DEFAULT_DEADLINE, DEFAULT_SEARCH_TIMEOUT, DEFAULT_WARMUP_CONCURRENCY,
    DEFAULT_WARMUP_MAX_TRACKS, WarmUpSettings,
};
use std::time::Duration;
use vtxcache::DEFAULT_TTL;
use vtxconfig::Config;

/// Trait d'extension pour la configuration du résolveur
pub trait ResolverConfigExt {
    /// Délai global d'une résolution
    fn get_resolver_deadline(&self) -> Duration;

    /// Délai de la recherche par métadonnées
    fn get_resolver_search_timeout(&self) -> Duration;

    /// Durée de vie d'une résolution en cache
    fn get_resolver_cache_ttl(&self) -> Duration;

    fn get_duration_tolerance(&self) -> DurationTolerance;

    fn get_warm_up_settings(&self) -> WarmUpSettings;
}

impl ResolverConfigExt for Config {
    fn get_resolver_deadline(&self) -> Duration {
        Duration::from_secs(
            self.get_u64_or(&["resolver", "deadline_secs"], DEFAULT_DEADLINE.as_secs()),
        )
    }

    fn get_resolver_search_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["resolver", "search_timeout_secs"],
            DEFAULT_SEARCH_TIMEOUT.as_secs(),
        ))
    }

    fn get_resolver_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(&["resolver", "cache", "ttl_secs"], DEFAULT_TTL.as_secs()))
    }

    fn get_duration_tolerance(&self) -> DurationTolerance {
        DurationTolerance::new(
            self.get_f64_or(&["resolver", "duration_tolerance", "ratio"], DEFAULT_RATIO),
            self.get_u64_or(
                &["resolver", "duration_tolerance", "cap_secs"],
                DEFAULT_CAP_SECONDS as u64,
            ) as u32,
        )
    }

    fn get_warm_up_settings(&self) -> WarmUpSettings {
        WarmUpSettings {
            max_tracks: self.get_u64_or(
                &["resolver", "warmup", "max_tracks"],
                DEFAULT_WARMUP_MAX_TRACKS as u64,
            ) as usize,
            concurrency: self.get_u64_or(
                &["resolver", "warmup", "concurrency"],
                DEFAULT_WARMUP_CONCURRENCY as u64,
            ) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.get_resolver_deadline(), Duration::from_secs(25));
        assert_eq!(config.get_resolver_cache_ttl(), Duration::from_secs(1800));
        assert_eq!(config.get_duration_tolerance(), DurationTolerance::default());
        assert_eq!(config.get_warm_up_settings(), WarmUpSettings::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml_str(
            "resolver:\n  deadline_secs: 12\n  duration_tolerance:\n    ratio: 0.1\n    cap_secs: 20\n  warmup:\n    concurrency: 2\n",
        )
        .unwrap();
        assert_eq!(config.get_resolver_deadline(), Duration::from_secs(12));
        assert_eq!(config.get_duration_tolerance(), DurationTolerance::new(0.1, 20));
        assert_eq!(config.get_warm_up_settings().concurrency, 2);
        assert_eq!(config.get_warm_up_settings().max_tracks, 10);
    }
}
