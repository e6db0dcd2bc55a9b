//! Anonymous client id of the SoundCloud web player
//!
//! The id is not documented: it is embedded in one of the `/assets/*.js`
//! bundles linked from the home page. It is scraped lazily, held for a TTL
//! (1 hour by default) and dropped as soon as the API rejects it.
//!
//! Concurrent callers share one refresh: `moka`'s `try_get_with` runs a
//! single initialisation future per key and hands its result to every waiter.

use crate::error::{Result, SoundCloudError};
use lazy_static::lazy_static;
use moka::future::Cache as MokaCache;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_CREDENTIAL_TTL: Duration = Duration::from_secs(3600);

const CACHE_KEY: &str = "client_id";

lazy_static! {
    static ref SCRIPT_SRC: Regex =
        Regex::new(r#"<script[^>]+src="(https?://[^"]+/assets/[^"]+\.js)""#).unwrap();
    static ref CLIENT_ID: Regex = Regex::new(r#"client_id\s*:\s*"([a-zA-Z0-9]{32})""#).unwrap();
}

/// Fournit le client_id courant, en le récupérant au besoin
#[derive(Debug, Clone)]
pub struct ClientIdProvider {
    client: Client,
    home_url: String,
    cache: MokaCache<&'static str, String>,
}

impl ClientIdProvider {
    pub fn new(client: Client, home_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client,
            home_url: home_url.into().trim_end_matches('/').to_string(),
            cache: MokaCache::builder()
                .max_capacity(1)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Client id en cache, ou fraîchement extrait
    pub async fn get(&self) -> Result<String> {
        self.cache
            .try_get_with(CACHE_KEY, self.scrape())
            .await
            .map_err(|e| SoundCloudError::ClientId(e.to_string()))
    }

    /// Oublie le client id (refusé par l'API)
    pub async fn invalidate(&self) {
        debug!("Invalidating SoundCloud client id");
        self.cache.invalidate(CACHE_KEY).await;
    }

    async fn scrape(&self) -> Result<String> {
        debug!("Scraping SoundCloud client id from {}", self.home_url);

        let html = self.fetch_text(&self.home_url).await?;
        let scripts: Vec<String> = SCRIPT_SRC
            .captures_iter(&html)
            .map(|cap| cap[1].to_string())
            .collect();

        if scripts.is_empty() {
            return Err(SoundCloudError::ClientId(
                "no asset script on the home page".to_string(),
            ));
        }

        // L'id se trouve en général dans les derniers bundles
        for script in scripts.iter().rev() {
            let body = match self.fetch_text(script).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to fetch {}: {}", script, e);
                    continue;
                }
            };
            if let Some(cap) = CLIENT_ID.captures(&body) {
                info!("Obtained SoundCloud client id from {}", script);
                return Ok(cap[1].to_string());
            }
        }

        Err(SoundCloudError::ClientId(format!(
            "none of {} asset scripts contains a client id",
            scripts.len()
        )))
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SoundCloudError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}
