//! Implémentation de [`StreamSource`] pour le catalogue JioSaavn

use crate::client::SaavnClient;
use crate::crypto::{bitrate_from_url, decrypt_media_url, upgrade_bitrate};
use crate::error::{Result, SaavnError};
use std::time::Duration;
use tracing::debug;
use vtxsource::{Lookup, SourceKind, StreamDescriptor, StreamSource, TrackId, TrackRequest};

/// Adaptateur LicensedDirect
///
/// Ne traite que les identifiants du catalogue. Le pointeur média vient de
/// la requête s'il est fourni, sinon d'un appel `song.getDetails`.
#[derive(Debug, Clone)]
pub struct SaavnSource {
    client: SaavnClient,
    des_key: String,
    timeout: Duration,
}

impl SaavnSource {
    pub fn new(client: SaavnClient, des_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            des_key: des_key.into(),
            timeout,
        }
    }

    /// Résout un identifiant du catalogue en descripteur
    pub async fn resolve_catalog(
        &self,
        id: &str,
        pointer: Option<&str>,
        request: &TrackRequest,
    ) -> Result<StreamDescriptor> {
        let descriptor = match pointer {
            // Pointeur fourni par l'appelant : pas d'aller-retour catalogue
            Some(pointer) => {
                let url = upgrade_bitrate(&decrypt_media_url(&self.des_key, pointer)?);
                self.descriptor(url)?
                    .with_duration(request.expected_duration_seconds)
                    .with_title(request.title.clone())
                    .with_artist(request.artist.clone())
            }
            None => {
                let song = self.client.song_details(id).await?;
                let pointer = song
                    .encrypted_media_url
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| SaavnError::MissingPointer(id.to_string()))?;

                let mut url = decrypt_media_url(&self.des_key, pointer)?;
                if song.has_320kbps {
                    url = upgrade_bitrate(&url);
                }
                let image = song.large_image();
                self.descriptor(url)?
                    .with_duration(song.duration.filter(|d| *d > 0))
                    .with_title(song.song)
                    .with_artist(song.primary_artists)
                    .with_thumbnail(image)
            }
        };

        debug!(
            "Catalog id {} resolved at {} kbps",
            id, descriptor.bitrate_kbps
        );
        Ok(descriptor)
    }

    fn descriptor(&self, url: String) -> Result<StreamDescriptor> {
        let bitrate = bitrate_from_url(&url);
        StreamDescriptor::new(SourceKind::LicensedDirect, url)
            .map(|d| d.with_bitrate(bitrate))
            .map_err(|_| SaavnError::Decryption("empty media URL".to_string()))
    }
}

#[async_trait::async_trait]
impl StreamSource for SaavnSource {
    fn kind(&self) -> SourceKind {
        SourceKind::LicensedDirect
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn accepts(&self, request: &TrackRequest) -> bool {
        matches!(request.track_id, TrackId::Catalog { .. })
    }

    async fn resolve(&self, lookup: &Lookup<'_>) -> vtxsource::Result<StreamDescriptor> {
        let request = lookup.request;
        match &request.track_id {
            TrackId::Catalog { id, pointer } => {
                Ok(self.resolve_catalog(id, pointer.as_deref(), request).await?)
            }
            TrackId::Native(id) => Err(vtxsource::SourceError::NotApplicable(format!(
                "{} is not a catalog identifier",
                id
            ))),
        }
    }
}
