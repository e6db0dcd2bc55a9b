//! Implémentation de [`StreamSource`] pour SoundCloud

use crate::client::SoundCloudClient;
use crate::error::{Result, SoundCloudError};
use std::time::Duration;
use tracing::debug;
use vtxsource::{Lookup, SourceError, SourceKind, StreamDescriptor, StreamSource};

/// Adaptateur SocialAudio : recherche par titre/artiste, premier résultat
#[derive(Debug, Clone)]
pub struct SoundCloudSource {
    client: SoundCloudClient,
    timeout: Duration,
}

impl SoundCloudSource {
    pub fn new(client: SoundCloudClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn client(&self) -> &SoundCloudClient {
        &self.client
    }

    /// Cherche `query` et résout le transcodage préféré du premier résultat
    pub async fn resolve_query(&self, query: &str) -> Result<StreamDescriptor> {
        let track = self.client.search_track(query).await?;
        let transcoding = track
            .preferred_transcoding()
            .ok_or_else(|| SoundCloudError::NoTranscoding(track.id.to_string()))?;

        debug!(
            "SoundCloud track {} via {} transcoding",
            track.id, transcoding.format.protocol
        );

        let url = self.client.resolve_transcoding(&transcoding.url).await?;
        let descriptor = StreamDescriptor::new(SourceKind::SocialAudio, url)
            .map_err(|_| SoundCloudError::NoTranscoding(track.id.to_string()))?
            .with_bitrate(transcoding.format.nominal_kbps())
            .with_duration(track.duration_seconds())
            .with_thumbnail(track.artwork())
            .with_artist(track.user.as_ref().and_then(|u| u.username.clone()))
            .with_title(track.title.clone());
        Ok(descriptor)
    }
}

#[async_trait::async_trait]
impl StreamSource for SoundCloudSource {
    fn kind(&self) -> SourceKind {
        SourceKind::SocialAudio
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn resolve(&self, lookup: &Lookup<'_>) -> vtxsource::Result<StreamDescriptor> {
        let query = lookup
            .request
            .search_query()
            .ok_or(SourceError::MissingHints)?;
        Ok(self.resolve_query(&query).await?)
    }
}
