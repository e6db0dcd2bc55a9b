//! Documents api-v2 utilisés par l'adaptateur

use serde::Deserialize;

/// `GET /search/tracks`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub collection: Vec<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    /// Durée en millisecondes
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub media: Media,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub transcodings: Vec<Transcoding>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transcoding {
    pub url: String,
    pub format: TranscodingFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscodingFormat {
    /// `hls` ou `progressive`
    pub protocol: String,
    #[serde(default)]
    pub mime_type: String,
}

/// Réponse de `{transcoding.url}?client_id=`
#[derive(Debug, Clone, Deserialize)]
pub struct StreamLocation {
    pub url: String,
}

impl Track {
    /// Transcodage `hls` de préférence, sinon `progressive`
    pub fn preferred_transcoding(&self) -> Option<&Transcoding> {
        let by_protocol = |protocol: &str| {
            self.media
                .transcodings
                .iter()
                .find(|t| t.format.protocol == protocol)
        };
        by_protocol("hls").or_else(|| by_protocol("progressive"))
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration
            .filter(|ms| *ms > 0)
            .and_then(|ms| u32::try_from(ms.saturating_add(500) / 1000).ok())
    }

    /// Pochette 500x500 au lieu de la vignette `large` (100x100)
    pub fn artwork(&self) -> Option<String> {
        self.artwork_url
            .as_ref()
            .map(|url| url.replace("-large.", "-t500x500."))
    }
}

impl TranscodingFormat {
    /// Débits nominaux des encodages servis par SoundCloud
    pub fn nominal_kbps(&self) -> u32 {
        let mime = self.mime_type.as_str();
        if mime.contains("opus") {
            64
        } else if mime.contains("mpeg") {
            128
        } else if mime.contains("mp4") || mime.contains("aac") {
            160
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(json: &str) -> Track {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_prefers_hls() {
        let t = track(
            r#"{"id": 1, "media": {"transcodings": [
                {"url": "https://api/progressive", "format": {"protocol": "progressive", "mime_type": "audio/mpeg"}},
                {"url": "https://api/hls", "format": {"protocol": "hls", "mime_type": "audio/mpeg"}}
            ]}}"#,
        );
        assert_eq!(t.preferred_transcoding().unwrap().url, "https://api/hls");
    }

    #[test]
    fn test_falls_back_to_progressive() {
        let t = track(
            r#"{"id": 1, "media": {"transcodings": [
                {"url": "https://api/progressive", "format": {"protocol": "progressive", "mime_type": "audio/mpeg"}}
            ]}}"#,
        );
        assert_eq!(t.preferred_transcoding().unwrap().url, "https://api/progressive");
        assert!(track(r#"{"id": 2}"#).preferred_transcoding().is_none());
    }

    #[test]
    fn test_duration_and_artwork() {
        let t = track(
            r#"{"id": 1, "duration": 212480, "artwork_url": "https://i1.sndcdn.com/artworks-abc-large.jpg"}"#,
        );
        assert_eq!(t.duration_seconds(), Some(212));
        assert_eq!(
            track(r#"{"id": 1, "duration": 18446744073709551615}"#).duration_seconds(),
            None
        );
        assert_eq!(
            t.artwork().as_deref(),
            Some("https://i1.sndcdn.com/artworks-abc-t500x500.jpg")
        );
    }

    #[test]
    fn test_nominal_bitrates() {
        let format = |mime: &str| TranscodingFormat {
            protocol: "hls".into(),
            mime_type: mime.into(),
        };
        assert_eq!(format("audio/ogg; codecs=\"opus\"").nominal_kbps(), 64);
        assert_eq!(format("audio/mpeg").nominal_kbps(), 128);
        assert_eq!(format("audio/mp4; codecs=\"mp4a.40.2\"").nominal_kbps(), 160);
    }
}
