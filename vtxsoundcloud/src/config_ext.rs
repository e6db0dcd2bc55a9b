//! Extension pour lire la configuration SoundCloud dans vtxconfig

use crate::client::{DEFAULT_API_URL, DEFAULT_HOME_URL};
use crate::credential::DEFAULT_CREDENTIAL_TTL;
use std::time::Duration;
use vtxconfig::Config;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Trait d'extension pour la configuration SoundCloud
pub trait SoundCloudConfigExt {
    fn get_soundcloud_enabled(&self) -> bool;

    /// Page d'accueil dont on extrait le client_id
    fn get_soundcloud_home_url(&self) -> String;

    fn get_soundcloud_api_url(&self) -> String;

    /// Durée de vie du client_id en cache
    fn get_soundcloud_credential_ttl(&self) -> Duration;

    fn get_soundcloud_timeout(&self) -> Duration;
}

impl SoundCloudConfigExt for Config {
    fn get_soundcloud_enabled(&self) -> bool {
        self.get_bool_or(&["sources", "soundcloud", "enabled"], true)
    }

    fn get_soundcloud_home_url(&self) -> String {
        self.get_string_or(&["sources", "soundcloud", "home_url"], DEFAULT_HOME_URL)
    }

    fn get_soundcloud_api_url(&self) -> String {
        self.get_string_or(&["sources", "soundcloud", "api_url"], DEFAULT_API_URL)
    }

    fn get_soundcloud_credential_ttl(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["sources", "soundcloud", "credential_ttl_secs"],
            DEFAULT_CREDENTIAL_TTL.as_secs(),
        ))
    }

    fn get_soundcloud_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["sources", "soundcloud", "timeout_secs"],
            DEFAULT_TIMEOUT_SECS,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml_str("{}").unwrap();
        assert_eq!(config.get_soundcloud_credential_ttl(), Duration::from_secs(3600));
        assert_eq!(config.get_soundcloud_api_url(), "https://api-v2.soundcloud.com");
    }
}
