//! Data model shared by every source adapter and by the resolver

use crate::error::{Result, SourceError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of a native video identifier
pub const NATIVE_ID_LEN: usize = 11;

/// Prefix used by clients to tag catalog identifiers
pub const CATALOG_ID_PREFIX: &str = "saavn_";

/// The upstream family a descriptor was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Rotating pool of public Invidious instances
    #[serde(rename = "invidious")]
    ProxyPoolA,
    /// Rotating pool of public Piped API instances
    #[serde(rename = "piped")]
    ProxyPoolB,
    /// JioSaavn catalog, encrypted media pointer decrypted locally
    #[serde(rename = "jiosaavn")]
    LicensedDirect,
    /// The yt-dlp extraction tool
    #[serde(rename = "yt-dlp")]
    GeneralExtractor,
    /// SoundCloud search and transcodings
    #[serde(rename = "soundcloud")]
    SocialAudio,
}

impl SourceKind {
    /// Stable label, also used in logs and in the HTTP surface
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::ProxyPoolA => "invidious",
            SourceKind::ProxyPoolB => "piped",
            SourceKind::LicensedDirect => "jiosaavn",
            SourceKind::GeneralExtractor => "yt-dlp",
            SourceKind::SocialAudio => "soundcloud",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized result of one adapter
///
/// `upstream_url` is guaranteed non-empty: the only constructor rejects empty
/// URLs, so an adapter that cannot produce a playable URL has to fail.
/// The URL is time-limited and must not be persisted beyond the result cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    pub source_kind: SourceKind,
    upstream_url: String,
    /// Bitrate in kbps, 0 when unknown
    pub bitrate_kbps: u32,
    pub duration_seconds: Option<u32>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl StreamDescriptor {
    /// Creates a descriptor with no metadata
    pub fn new(source_kind: SourceKind, upstream_url: impl Into<String>) -> Result<Self> {
        let upstream_url = upstream_url.into();
        if upstream_url.trim().is_empty() {
            return Err(SourceError::EmptyUrl);
        }
        Ok(Self {
            source_kind,
            upstream_url,
            bitrate_kbps: 0,
            duration_seconds: None,
            title: None,
            artist: None,
            thumbnail_url: None,
        })
    }

    /// The real media location
    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    pub fn with_bitrate(mut self, kbps: u32) -> Self {
        self.bitrate_kbps = kbps;
        self
    }

    pub fn with_duration(mut self, seconds: Option<u32>) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = non_empty(title);
        self
    }

    pub fn with_artist(mut self, artist: Option<String>) -> Self {
        self.artist = non_empty(artist);
        self
    }

    pub fn with_thumbnail(mut self, url: Option<String>) -> Self {
        self.thumbnail_url = non_empty(url);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Identifier of the requested track, tagged by provenance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackId {
    /// Identifier understood directly by the proxy pools and the extractor
    Native(String),
    /// Catalog identifier, to be mapped to a native one by metadata search
    Catalog {
        id: String,
        /// Encrypted media pointer, saves a metadata round trip when present
        pointer: Option<String>,
    },
}

impl TrackId {
    pub fn native(id: impl Into<String>) -> Self {
        TrackId::Native(id.into())
    }

    pub fn catalog(id: impl Into<String>, pointer: Option<String>) -> Self {
        TrackId::Catalog {
            id: id.into(),
            pointer: pointer.filter(|p| !p.trim().is_empty()),
        }
    }

    /// Tags a raw identifier received at the HTTP boundary
    ///
    /// `saavn_`-prefixed identifiers are catalog identifiers (prefix removed),
    /// 11-character video codes are native, anything else is treated as a
    /// catalog identifier.
    pub fn classify(raw: &str, pointer: Option<String>) -> Self {
        let raw = raw.trim();
        if let Some(id) = raw.strip_prefix(CATALOG_ID_PREFIX) {
            return Self::catalog(id, pointer);
        }
        if is_native_id(raw) {
            return Self::native(raw);
        }
        Self::catalog(raw, pointer)
    }

    /// The bare identifier
    pub fn as_str(&self) -> &str {
        match self {
            TrackId::Native(id) => id,
            TrackId::Catalog { id, .. } => id,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, TrackId::Native(_))
    }

    pub fn pointer(&self) -> Option<&str> {
        match self {
            TrackId::Native(_) => None,
            TrackId::Catalog { pointer, .. } => pointer.as_deref(),
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackId::Native(id) => f.write_str(id),
            TrackId::Catalog { id, .. } => write!(f, "{}{}", CATALOG_ID_PREFIX, id),
        }
    }
}

/// Whether `id` has the shape of a native video identifier
pub fn is_native_id(id: &str) -> bool {
    id.len() == NATIVE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Input of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRequest {
    pub track_id: TrackId,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub expected_duration_seconds: Option<u32>,
}

impl TrackRequest {
    pub fn new(track_id: TrackId) -> Self {
        Self {
            track_id,
            title: None,
            artist: None,
            expected_duration_seconds: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(Some(title.into()));
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = non_empty(Some(artist.into()));
        self
    }

    pub fn with_expected_duration(mut self, seconds: u32) -> Self {
        self.expected_duration_seconds = Some(seconds);
        self
    }

    /// Key under which the resolved descriptor is cached
    pub fn cache_key(&self) -> String {
        self.track_id.to_string()
    }

    /// `"title artist"`, or `None` without a title
    pub fn search_query(&self) -> Option<String> {
        let title = self.title.as_deref()?.trim();
        if title.is_empty() {
            return None;
        }
        Some(match self.artist.as_deref().map(str::trim) {
            Some(artist) if !artist.is_empty() => format!("{} {}", title, artist),
            _ => title.to_string(),
        })
    }
}

/// What an adapter is asked to resolve
///
/// `effective_id` is the identifier after normalization: a native id found by
/// metadata search, or the original id when the search failed.
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    pub effective_id: &'a str,
    pub request: &'a TrackRequest,
}

impl<'a> Lookup<'a> {
    pub fn new(effective_id: &'a str, request: &'a TrackRequest) -> Self {
        Self {
            effective_id,
            request,
        }
    }
}
