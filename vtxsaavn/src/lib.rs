//! # vtxsaavn - Adaptateur du catalogue JioSaavn
//!
//! Les identifiants du catalogue (`saavn_…`) ne sont pas compris par les
//! pools d'instances. Le catalogue publie en revanche, pour chaque titre, un
//! pointeur média chiffré (`encrypted_media_url`) qu'on déchiffre localement
//! pour obtenir l'URL AAC du CDN, en la remontant à 320 kbps quand c'est
//! possible.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use vtxsaavn::SaavnSource;
//! use vtxsource::{Lookup, StreamSource, TrackId, TrackRequest};
//! use vtxconfig::get_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = SaavnSource::from_config(&get_config())?;
//! let request = TrackRequest::new(TrackId::catalog("QQ8jRRlh", None));
//! let descriptor = source.resolve(&Lookup::new("QQ8jRRlh", &request)).await?;
//! println!("{}", descriptor.upstream_url());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config_ext;
pub mod crypto;
pub mod error;
pub mod models;
pub mod source;

pub use client::SaavnClient;
pub use config_ext::SaavnConfigExt;
pub use error::{Result, SaavnError};
pub use source::SaavnSource;

use vtxconfig::Config;

impl SaavnSource {
    /// Crée l'adaptateur depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.get_saavn_timeout();
        let client = SaavnClient::new(config.get_saavn_api_url(), timeout)?;
        Ok(Self::new(client, config.get_saavn_des_key(), timeout))
    }
}
