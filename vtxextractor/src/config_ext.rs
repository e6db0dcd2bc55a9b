//! Extension pour lire la configuration yt-dlp dans vtxconfig

use crate::ytdlp::{DEFAULT_BINARY, DEFAULT_PLAYER_CLIENTS, DEFAULT_TIMEOUT_SECS};
use std::time::Duration;
use vtxconfig::Config;

/// Trait d'extension pour la configuration de l'extracteur
pub trait ExtractorConfigExt {
    fn get_ytdlp_enabled(&self) -> bool;

    /// Chemin ou nom du binaire
    fn get_ytdlp_binary(&self) -> String;

    /// Personas `player_client`, séparées par des virgules
    fn get_ytdlp_player_clients(&self) -> String;

    fn get_ytdlp_timeout(&self) -> Duration;
}

impl ExtractorConfigExt for Config {
    fn get_ytdlp_enabled(&self) -> bool {
        self.get_bool_or(&["sources", "ytdlp", "enabled"], true)
    }

    fn get_ytdlp_binary(&self) -> String {
        self.get_string_or(&["sources", "ytdlp", "binary"], DEFAULT_BINARY)
    }

    fn get_ytdlp_player_clients(&self) -> String {
        self.get_string_or(&["sources", "ytdlp", "player_clients"], DEFAULT_PLAYER_CLIENTS)
    }

    fn get_ytdlp_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["sources", "ytdlp", "timeout_secs"],
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
        assert_eq!(config.get_ytdlp_binary(), "yt-dlp");
        assert_eq!(config.get_ytdlp_player_clients(), "ios,android");
        assert_eq!(config.get_ytdlp_timeout(), Duration::from_secs(7));
    }
}
