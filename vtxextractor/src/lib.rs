//! # vtxextractor
//!
//! Wraps the `yt-dlp` command line tool. It is the most reliable but slowest
//! upstream, so the resolver only tries it after the instance pools lost.
//!
//! [`YtDlp`] implements two traits:
//! - [`StreamSource`](vtxsource::StreamSource): `-J` extraction of the best
//!   progressive audio format;
//! - [`TrackSearch`](vtxsource::TrackSearch): `ytsearch1:` lookups mapping
//!   catalog hints to a native id.

pub mod config_ext;
pub mod error;
pub mod models;
pub mod ytdlp;

pub use config_ext::ExtractorConfigExt;
pub use error::{ExtractorError, Result};
pub use ytdlp::YtDlp;

use vtxconfig::Config;

impl YtDlp {
    /// Crée l'adaptateur depuis la configuration
    pub fn from_config(config: &Config) -> Self {
        YtDlp::new(config.get_ytdlp_binary())
            .player_clients(config.get_ytdlp_player_clients())
            .timeout(config.get_ytdlp_timeout())
    }
}
