//! Extension pour lire la configuration des pools dans vtxconfig
//!
//! ```yaml
//! sources:
//!   invidious:
//!     enabled: true
//!     instance_timeout_secs: 4
//!     race_width: 6
//!     instances: ["https://yewtu.be", ...]
//!   piped:
//!     ...
//! ```

use crate::pool::{DEFAULT_INSTANCE_TIMEOUT_SECS, DEFAULT_RACE_WIDTH, PoolSettings};
use std::time::Duration;
use vtxconfig::Config;

/// Trait d'extension pour la configuration des pools d'instances
pub trait ProxyConfigExt {
    /// Vérifie si le pool Invidious est activé
    fn get_invidious_enabled(&self) -> bool;

    /// Paramètres du pool Invidious
    fn get_invidious_settings(&self) -> PoolSettings;

    /// Vérifie si le pool Piped est activé
    fn get_piped_enabled(&self) -> bool;

    /// Paramètres du pool Piped
    fn get_piped_settings(&self) -> PoolSettings;
}

fn pool_settings(config: &Config, name: &str) -> PoolSettings {
    let base = ["sources", name];
    let path = |leaf: &'static str| [base[0], base[1], leaf];

    PoolSettings::new(config.get_string_list(&path("instances")))
        .race_width(config.get_u64_or(&path("race_width"), DEFAULT_RACE_WIDTH as u64) as usize)
        .instance_timeout(Duration::from_secs(config.get_u64_or(
            &path("instance_timeout_secs"),
            DEFAULT_INSTANCE_TIMEOUT_SECS,
        )))
}

impl ProxyConfigExt for Config {
    fn get_invidious_enabled(&self) -> bool {
        self.get_bool_or(&["sources", "invidious", "enabled"], true)
    }

    fn get_invidious_settings(&self) -> PoolSettings {
        pool_settings(self, "invidious")
    }

    fn get_piped_enabled(&self) -> bool {
        self.get_bool_or(&["sources", "piped", "enabled"], true)
    }

    fn get_piped_settings(&self) -> PoolSettings {
        pool_settings(self, "piped")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        let settings = config.get_invidious_settings();
        assert!(!settings.instances.is_empty());
        assert_eq!(settings.instance_timeout, Duration::from_secs(4));
        assert!(config.get_piped_enabled());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_yaml_str(
            "sources:\n  piped:\n    enabled: false\n    race_width: 2\n    instances: [\"https://p1/\"]\n",
        )
        .unwrap();
        let settings = config.get_piped_settings();
        assert_eq!(settings.instances, vec!["https://p1"]);
        assert_eq!(settings.race_width, 2);
        assert!(!config.get_piped_enabled());
    }
}
