//! # vtxrelay
//!
//! Tuyau d'octets entre une URL média amont et le client HTTP, avec prise
//! en charge des requêtes `Range` (reprise de lecture, seek).
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use vtxrelay::StreamRelay;
//!
//! # async fn example() -> vtxrelay::Result<()> {
//! let relay = StreamRelay::default();
//! let mut response = relay.open("https://cdn.example/track.m4a", Some(1024)).await?;
//! while let Some(chunk) = response.body.next().await {
//!     let chunk = chunk?;
//!     println!("{} bytes", chunk.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config_ext;
pub mod error;
pub mod relay;

pub use config_ext::RelayConfigExt;
pub use error::{RelayError, Result};
pub use relay::{RelayResponse, RelayStatus, StreamRelay};

use vtxconfig::Config;

impl StreamRelay {
    /// Crée le relais depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.get_relay_chunk_size(),
            config.get_relay_connect_timeout(),
        )
    }
}
