//! # vtxproxy - Pools d'instances publiques Invidious et Piped
//!
//! Ces instances communautaires exposent les formats audio adaptatifs d'une
//! vidéo. Elles sont gratuites, nombreuses et peu fiables : chaque appel est
//! un échec indépendant, et le résolveur les met en concurrence.
//!
//! - [`InvidiousPool`] : `GET {instance}/api/v1/videos/{id}`
//! - [`PipedPool`] : `GET {instance}/streams/{id}`
//!
//! Dans les deux cas le flux `audio/*` de plus haut débit est retenu.
//!
//! ```rust,no_run
//! use vtxproxy::{InvidiousPool, PoolSettings};
//! use vtxsource::InstancePool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = InvidiousPool::new(PoolSettings::new(["https://yewtu.be"]))?;
//! let descriptor = pool.resolve_any("dQw4w9WgXcQ").await?;
//! println!("{} kbps: {}", descriptor.bitrate_kbps, descriptor.upstream_url());
//! # Ok(())
//! # }
//! ```

pub mod config_ext;
pub mod error;
pub mod invidious;
pub mod models;
pub mod piped;
pub mod pool;

pub use config_ext::ProxyConfigExt;
pub use error::{Error, Result};
pub use invidious::InvidiousPool;
pub use piped::PipedPool;
pub use pool::PoolSettings;

use vtxconfig::Config;

impl InvidiousPool {
    /// Crée le pool depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.get_invidious_settings())
    }
}

impl PipedPool {
    /// Crée le pool depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.get_piped_settings())
    }
}
