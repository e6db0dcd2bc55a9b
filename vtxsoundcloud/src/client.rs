//! Client api-v2 SoundCloud

use crate::credential::ClientIdProvider;
use crate::error::{Result, SoundCloudError};
use crate::models::{SearchResponse, StreamLocation, Track};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_HOME_URL: &str = "https://soundcloud.com";
pub const DEFAULT_API_URL: &str = "https://api-v2.soundcloud.com";

/// Client bas-niveau pour api-v2
#[derive(Debug, Clone)]
pub struct SoundCloudClient {
    client: Client,
    api_url: String,
    credentials: ClientIdProvider,
}

impl SoundCloudClient {
    pub fn new(
        home_url: impl Into<String>,
        api_url: impl Into<String>,
        credential_ttl: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36")
            .build()?;

        Ok(Self {
            credentials: ClientIdProvider::new(client.clone(), home_url, credential_ttl),
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Premier titre correspondant à `query`
    pub async fn search_track(&self, query: &str) -> Result<Track> {
        let url = format!("{}/search/tracks", self.api_url);
        let response: SearchResponse = self
            .get_authenticated(&url, &[("q", query), ("limit", "1")])
            .await?;

        response
            .collection
            .into_iter()
            .next()
            .ok_or_else(|| SoundCloudError::NoResults(query.to_string()))
    }

    /// URL signée d'un transcodage
    pub async fn resolve_transcoding(&self, transcoding_url: &str) -> Result<String> {
        let location: StreamLocation = self.get_authenticated(transcoding_url, &[]).await?;
        Ok(location.url)
    }

    /// GET avec client_id ; un refus 401/403 invalide le client_id et
    /// relance une seule fois avec un id frais
    async fn get_authenticated<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        match self.get_once(url, params).await {
            Err(e) if e.is_auth_error() => {
                warn!("SoundCloud rejected the client id ({}), refreshing", e);
                self.credentials.invalidate().await;
                self.get_once(url, params).await
            }
            other => other,
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str, params: &[(&str, &str)]) -> Result<T> {
        let client_id = self.credentials.get().await?;
        debug!("GET {} with {} params", url, params.len());

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("client_id", client_id.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SoundCloudError::from_status_code(status.as_u16()));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}
