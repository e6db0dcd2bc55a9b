//! Extension pour lire la configuration JioSaavn dans vtxconfig
//!
//! ```yaml
//! sources:
//!   jiosaavn:
//!     enabled: true
//!     api_url: "https://www.jiosaavn.com/api.php"
//!     des_key: "38346591"
//!     timeout_secs: 4
//! ```

use crate::client::DEFAULT_API_URL;
use crate::crypto::DEFAULT_DES_KEY;
use std::time::Duration;
use vtxconfig::Config;

const DEFAULT_TIMEOUT_SECS: u64 = 4;

/// Trait d'extension pour la configuration JioSaavn
pub trait SaavnConfigExt {
    /// Vérifie si l'adaptateur est activé
    fn get_saavn_enabled(&self) -> bool;

    /// URL de l'API `api.php`
    fn get_saavn_api_url(&self) -> String;

    /// Clé DES de 8 octets
    fn get_saavn_des_key(&self) -> String;

    /// Délai maximal d'une résolution
    fn get_saavn_timeout(&self) -> Duration;
}

impl SaavnConfigExt for Config {
    fn get_saavn_enabled(&self) -> bool {
        self.get_bool_or(&["sources", "jiosaavn", "enabled"], true)
    }

    fn get_saavn_api_url(&self) -> String {
        self.get_string_or(&["sources", "jiosaavn", "api_url"], DEFAULT_API_URL)
    }

    fn get_saavn_des_key(&self) -> String {
        self.get_string_or(&["sources", "jiosaavn", "des_key"], DEFAULT_DES_KEY)
    }

    fn get_saavn_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["sources", "jiosaavn", "timeout_secs"],
            DEFAULT_TIMEOUT_SECS,
        ))
    }
}
