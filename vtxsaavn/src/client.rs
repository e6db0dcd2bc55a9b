//! Client HTTP de l'API JioSaavn
//!
//! Une seule méthode est utilisée : `song.getDetails`, qui retourne les
//! métadonnées d'un titre et son pointeur média chiffré.

use crate::error::{Result, SaavnError};
use crate::models::{SongDetails, extract_song};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// URL de l'API publique
pub const DEFAULT_API_URL: &str = "https://www.jiosaavn.com/api.php";

/// Client bas-niveau pour le catalogue JioSaavn
#[derive(Debug, Clone)]
pub struct SaavnClient {
    client: Client,
    api_url: String,
}

impl SaavnClient {
    /// Crée un client avec l'URL d'API donnée
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36")
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Récupère la fiche d'un titre du catalogue
    pub async fn song_details(&self, id: &str) -> Result<SongDetails> {
        let params = [
            ("__call", "song.getDetails"),
            ("_format", "json"),
            ("_marker", "0"),
            ("cc", "in"),
            ("pids", id),
        ];

        debug!("GET {} song.getDetails pids={}", self.api_url, id);

        let response = self.client.get(&self.api_url).query(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Catalog API error ({}) for {}", status, id);
            return Err(SaavnError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let json: Value = serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse song.getDetails response: {}", e);
            SaavnError::JsonParse(e)
        })?;

        extract_song(json, id).ok_or_else(|| SaavnError::NotFound(id.to_string()))
    }
}
