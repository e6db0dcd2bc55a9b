//! Pool of public Invidious instances
//!
//! Each instance exposes `GET /api/v1/videos/{id}` whose `adaptiveFormats`
//! list carries separate audio-only streams.

use crate::error::{Error, Result};
use crate::models::{InvidiousVideo, best_audio, to_kbps};
use crate::pool::{PoolSettings, build_http_client};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use vtxsource::{InstancePool, SourceKind, StreamDescriptor};

/// Invidious instance pool (ProxyPoolA)
#[derive(Debug, Clone)]
pub struct InvidiousPool {
    client: Client,
    settings: PoolSettings,
}

impl InvidiousPool {
    /// Crée un pool à partir de sa configuration
    pub fn new(settings: PoolSettings) -> Result<Self> {
        let client = build_http_client(settings.instance_timeout)?;
        Ok(Self { client, settings })
    }

    /// Crée un pool avec un client reqwest fourni
    pub fn with_client(client: Client, settings: PoolSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// Interroge une instance et retourne le meilleur flux audio
    pub async fn fetch(&self, instance: &str, video_id: &str) -> Result<StreamDescriptor> {
        let url = format!("{}/api/v1/videos/{}", instance, video_id);
        debug!(%url, "Querying Invidious instance");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                instance: instance.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let video: InvidiousVideo = serde_json::from_str(&text)?;
        if let Some(message) = video.error {
            return Err(Error::Api {
                instance: instance.to_string(),
                message,
            });
        }

        let best = best_audio(video.adaptive_formats.iter().map(|f| {
            (f.mime_type.as_str(), f.url.as_deref(), f.bitrate)
        }))
        .ok_or_else(|| Error::NoAudio(instance.to_string()))?;

        let thumbnail = video
            .video_thumbnails
            .iter()
            .find(|t| t.quality.as_deref() == Some("high"))
            .or_else(|| video.video_thumbnails.first())
            .map(|t| absolute_url(instance, &t.url));

        let descriptor = StreamDescriptor::new(SourceKind::ProxyPoolA, best.url)
            .map_err(|_| Error::NoAudio(instance.to_string()))?
            .with_bitrate(to_kbps(best.bitrate_bps))
            .with_duration(video.length_seconds.filter(|d| *d > 0))
            .with_title(video.title)
            .with_artist(video.author)
            .with_thumbnail(thumbnail);
        Ok(descriptor)
    }
}

/// Invidious sometimes returns instance-relative thumbnail paths
fn absolute_url(instance: &str, url: &str) -> String {
    if url.starts_with('/') && !url.starts_with("//") {
        format!("{}{}", instance, url)
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        url.to_string()
    }
}

#[async_trait::async_trait]
impl InstancePool for InvidiousPool {
    fn kind(&self) -> SourceKind {
        SourceKind::ProxyPoolA
    }

    fn instance_timeout(&self) -> Duration {
        self.settings.instance_timeout
    }

    fn instances(&self) -> Vec<String> {
        self.settings.pick()
    }

    async fn query(&self, instance: &str, video_id: &str) -> vtxsource::Result<StreamDescriptor> {
        Ok(self.fetch(instance, video_id).await?)
    }
}
