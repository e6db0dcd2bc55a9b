//! Extension pour lire la configuration du relais dans vtxconfig

use crate::relay::{DEFAULT_CHUNK_SIZE, DEFAULT_CONNECT_TIMEOUT};
use std::time::Duration;
use vtxconfig::Config;

/// Trait d'extension pour la configuration du relais
pub trait RelayConfigExt {
    /// Taille maximale d'un morceau relayé, en octets
    fn get_relay_chunk_size(&self) -> usize;

    /// Délai de connexion à l'amont
    fn get_relay_connect_timeout(&self) -> Duration;
}

impl RelayConfigExt for Config {
    fn get_relay_chunk_size(&self) -> usize {
        self.get_u64_or(&["relay", "chunk_size"], DEFAULT_CHUNK_SIZE as u64) as usize
    }

    fn get_relay_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.get_u64_or(
            &["relay", "connect_timeout_secs"],
            DEFAULT_CONNECT_TIMEOUT.as_secs(),
        ))
    }
}
