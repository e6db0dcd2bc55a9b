//! Relais HTTP compatible `Range`
//!
//! Le relais ouvre l'URL amont et rend un flux de [`Bytes`] découpé en
//! morceaux d'au plus `chunk_size` octets. Le client lit ainsi une URL
//! stable alors que l'URL amont est signée et de durée de vie limitée.
//!
//! Avec un décalage, la requête amont porte `Range: bytes=<offset>-` et la
//! réponse est partielle. Certains CDN ignorent l'en-tête et renvoient le
//! fichier entier (200) : les `offset` premiers octets sont alors sautés
//! localement et le `Content-Range` est calculé. Sans longueur connue, il
//! prend la forme `bytes <offset>-*/*`.

use crate::error::{RelayError, Result};
use async_stream::try_stream;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, RANGE};
use reqwest::{Client, Response, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Taille maximale d'un morceau envoyé au client
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Nature de la réponse relayée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStatus {
    /// Ressource entière depuis l'octet 0 (200)
    Full,
    /// Ressource depuis un décalage (206)
    Partial,
}

/// Réponse prête à être renvoyée au client
pub struct RelayResponse {
    pub status: RelayStatus,
    pub content_type: Option<String>,
    /// Longueur du corps relayé, si connue
    pub content_length: Option<u64>,
    /// `bytes <start>-<end>/<total>` pour une réponse partielle
    pub content_range: Option<String>,
    pub body: BoxStream<'static, Result<Bytes>>,
}

impl fmt::Debug for RelayResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayResponse")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .field("content_range", &self.content_range)
            .finish_non_exhaustive()
    }
}

/// Relais de flux vers une URL amont
#[derive(Debug, Clone)]
pub struct StreamRelay {
    client: Client,
    chunk_size: usize,
}

impl Default for StreamRelay {
    fn default() -> Self {
        Self::with_client(Client::new(), DEFAULT_CHUNK_SIZE)
    }
}

impl StreamRelay {
    /// Crée un relais ; seule la connexion est bornée, pas le transfert
    pub fn new(chunk_size: usize, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder().connect_timeout(connect_timeout).build()?;
        Ok(Self::with_client(client, chunk_size))
    }

    pub fn with_client(client: Client, chunk_size: usize) -> Self {
        Self {
            client,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Ouvre `url`, depuis `offset` s'il est donné
    pub async fn open(&self, url: &str, offset: Option<u64>) -> Result<RelayResponse> {
        let mut request = self.client.get(url);
        if let Some(offset) = offset {
            request = request.header(RANGE, format!("bytes={}-", offset));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Upstream answered {} (offset {:?})", status, offset);

        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Err(RelayError::RangeNotSatisfiable);
        }
        if !status.is_success() {
            warn!("Upstream refused the stream with status {}", status);
            return Err(RelayError::UpstreamStatus(status.as_u16()));
        }

        let content_type = header_string(&response, CONTENT_TYPE);
        let upstream_length = response.content_length();

        let Some(offset) = offset else {
            return Ok(RelayResponse {
                status: RelayStatus::Full,
                content_type,
                content_length: upstream_length,
                content_range: None,
                body: self.body(response, 0),
            });
        };

        if status == StatusCode::PARTIAL_CONTENT {
            let content_range = header_string(&response, CONTENT_RANGE).unwrap_or_else(|| {
                match total_from_length(offset, upstream_length) {
                    Some(total) => range_header(offset, total),
                    None => open_range_header(offset),
                }
            });
            return Ok(RelayResponse {
                status: RelayStatus::Partial,
                content_type,
                content_length: upstream_length,
                content_range: Some(content_range),
                body: self.body(response, 0),
            });
        }

        // Range ignoré : l'amont envoie tout depuis l'octet 0
        debug!("Upstream ignored Range, skipping {} bytes locally", offset);
        if let Some(total) = upstream_length {
            if offset > 0 && offset >= total {
                return Err(RelayError::RangeNotSatisfiable);
            }
        }

        Ok(RelayResponse {
            status: RelayStatus::Partial,
            content_type,
            content_length: upstream_length.map(|total| total.saturating_sub(offset)),
            content_range: Some(match upstream_length {
                Some(total) => range_header(offset, total),
                None => open_range_header(offset),
            }),
            body: self.body(response, offset),
        })
    }

    fn body(&self, response: Response, skip: u64) -> BoxStream<'static, Result<Bytes>> {
        rechunk(response.bytes_stream(), skip, self.chunk_size).boxed()
    }
}

/// Saute `skip` octets puis redécoupe en morceaux d'au plus `chunk_size`
pub fn rechunk<S, E>(
    upstream: S,
    skip: u64,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes>> + Send + 'static
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    try_stream! {
        let mut upstream = Box::pin(upstream);
        let mut skip = skip;

        while let Some(chunk) = upstream.next().await {
            let mut chunk = chunk.map_err(|e| RelayError::Upstream(e.to_string()))?;

            if skip > 0 {
                let len = chunk.len() as u64;
                if len <= skip {
                    skip -= len;
                    continue;
                }
                chunk = chunk.split_off(skip as usize);
                skip = 0;
            }

            while chunk.len() > chunk_size {
                yield chunk.split_to(chunk_size);
            }
            if !chunk.is_empty() {
                yield chunk;
            }
        }
    }
}

fn header_string(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Avec un 206 sans `Content-Range`, la longueur est celle du reste
fn total_from_length(offset: u64, remaining: Option<u64>) -> Option<u64> {
    remaining.map(|len| offset.saturating_add(len))
}

fn range_header(offset: u64, total: u64) -> String {
    format!("bytes {}-{}/{}", offset, total.saturating_sub(1), total)
}

/// Taille totale inconnue : seul le début de la plage est garanti
fn open_range_header(offset: u64) -> String {
    format!("bytes {}-*/*", offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    async fn collect(s: impl Stream<Item = Result<Bytes>>) -> Vec<Result<Bytes>> {
        Box::pin(s).collect::<Vec<_>>().await
    }

    fn chunks(
        parts: Vec<&'static str>,
    ) -> impl Stream<Item = std::result::Result<Bytes, String>> + Send + 'static {
        stream::iter(parts.into_iter().map(|p| Ok(Bytes::from_static(p.as_bytes()))))
    }

    #[tokio::test]
    async fn test_rechunk_splits_large_chunks() {
        let out = collect(rechunk(chunks(vec!["abcdefghij"]), 0, 4)).await;
        let sizes: Vec<usize> = out.iter().map(|c| c.as_ref().unwrap().len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_rechunk_skips_across_chunks() {
        let out = collect(rechunk(chunks(vec!["abc", "defg", "hij"]), 5, 64)).await;
        let joined: Vec<u8> = out.into_iter().flat_map(|c| c.unwrap().to_vec()).collect();
        assert_eq!(joined, b"fghij");
    }

    #[tokio::test]
    async fn test_rechunk_ends_on_error() {
        let upstream = stream::iter(vec![
            Ok(Bytes::from_static(b"ab")),
            Err("connection reset".to_string()),
            Ok(Bytes::from_static(b"cd")),
        ]);
        let out = collect(rechunk(upstream, 0, 64)).await;
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], Err(RelayError::Upstream(_))));
    }

    #[test]
    fn test_range_header() {
        assert_eq!(range_header(100, 1000), "bytes 100-999/1000");
    }

    #[test]
    fn test_range_header_with_unknown_total() {
        assert_eq!(open_range_header(100), "bytes 100-*/*");
    }

    #[test]
    fn test_total_from_length_saturates() {
        assert_eq!(total_from_length(100, Some(900)), Some(1000));
        assert_eq!(total_from_length(u64::MAX, Some(10)), Some(u64::MAX));
        assert_eq!(total_from_length(100, None), None);
    }
}
