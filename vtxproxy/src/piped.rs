//! Pool of public Piped API instances
//!
//! Each instance exposes `GET /streams/{id}` with an `audioStreams` list.

use crate::error::{Error, Result};
use crate::models::{PipedStreams, best_audio, to_kbps};
use crate::pool::{PoolSettings, build_http_client};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use vtxsource::{InstancePool, SourceKind, StreamDescriptor};

/// Piped instance pool (ProxyPoolB)
#[derive(Debug, Clone)]
pub struct PipedPool {
    client: Client,
    settings: PoolSettings,
}

impl PipedPool {
    pub fn new(settings: PoolSettings) -> Result<Self> {
        let client = build_http_client(settings.instance_timeout)?;
        Ok(Self { client, settings })
    }

    pub fn with_client(client: Client, settings: PoolSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// Interroge une instance et retourne le meilleur flux audio
    pub async fn fetch(&self, instance: &str, video_id: &str) -> Result<StreamDescriptor> {
        let url = format!("{}/streams/{}", instance, video_id);
        debug!(%url, "Querying Piped instance");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        // Piped answers errors with a JSON body, sometimes under a 500
        let streams: PipedStreams = match serde_json::from_str(&text) {
            Ok(streams) => streams,
            Err(_) if !status.is_success() => {
                return Err(Error::Status {
                    instance: instance.to_string(),
                    status: status.as_u16(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = streams.error.clone() {
            return Err(Error::Api {
                instance: instance.to_string(),
                message: streams.message.clone().unwrap_or(error),
            });
        }
        if !status.is_success() {
            return Err(Error::Status {
                instance: instance.to_string(),
                status: status.as_u16(),
            });
        }

        let best = best_audio(
            streams
                .audio_streams
                .iter()
                .map(|s| (s.mime_type.as_str(), s.url.as_deref(), s.bitrate)),
        )
        .ok_or_else(|| Error::NoAudio(instance.to_string()))?;

        let descriptor = StreamDescriptor::new(SourceKind::ProxyPoolB, best.url)
            .map_err(|_| Error::NoAudio(instance.to_string()))?
            .with_bitrate(to_kbps(best.bitrate_bps))
            .with_duration(streams.duration.filter(|d| *d > 0))
            .with_title(streams.title)
            .with_artist(streams.uploader)
            .with_thumbnail(streams.thumbnail_url);
        Ok(descriptor)
    }
}

#[async_trait::async_trait]
impl InstancePool for PipedPool {
    fn kind(&self) -> SourceKind {
        SourceKind::ProxyPoolB
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
