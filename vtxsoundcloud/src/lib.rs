//! # vtxsoundcloud - Adaptateur SoundCloud
//!
//! Dernier recours de la chaîne : SoundCloud ne connaît pas les identifiants
//! vidéo, on y cherche donc le titre par `"titre artiste"`. Sans titre dans
//! la requête, l'adaptateur échoue avec `MissingHints`.
//!
//! L'API api-v2 exige un `client_id` anonyme, extrait des scripts du lecteur
//! web et gardé en cache (voir [`credential`]).

pub mod client;
pub mod config_ext;
pub mod credential;
pub mod error;
pub mod models;
pub mod source;

pub use client::SoundCloudClient;
pub use config_ext::SoundCloudConfigExt;
pub use credential::ClientIdProvider;
pub use error::{Result, SoundCloudError};
pub use source::SoundCloudSource;

use vtxconfig::Config;

impl SoundCloudSource {
    /// Crée l'adaptateur depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.get_soundcloud_timeout();
        let client = SoundCloudClient::new(
            config.get_soundcloud_home_url(),
            config.get_soundcloud_api_url(),
            config.get_soundcloud_credential_ttl(),
            timeout,
        )?;
        Ok(Self::new(client, timeout))
    }
}
