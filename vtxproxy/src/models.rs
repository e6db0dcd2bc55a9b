//! Response documents of the Invidious and Piped APIs
//!
//! Only the fields used for stream selection and display are mapped.

use serde::{Deserialize, Deserializer};

/// Bitrate as sent by the instances: a number, or a number inside a string
/// (Invidious), in bits per second.
fn de_bitrate<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Float(f64),
        Text(String),
        Null(Option<()>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Float(f) if f.is_finite() && f > 0.0 => f as u64,
        Raw::Float(_) => 0,
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
        Raw::Null(_) => 0,
    })
}

/// `GET /api/v1/videos/{id}` (Invidious)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvidiousVideo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub length_seconds: Option<u32>,
    #[serde(default)]
    pub video_thumbnails: Vec<InvidiousThumbnail>,
    #[serde(default)]
    pub adaptive_formats: Vec<InvidiousFormat>,
    /// Present instead of the fields above when the instance refuses the request
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvidiousThumbnail {
    #[serde(default)]
    pub quality: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvidiousFormat {
    #[serde(default)]
    pub url: Option<String>,
    /// MIME type with codecs, e.g. `audio/webm; codecs="opus"`
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default, deserialize_with = "de_bitrate")]
    pub bitrate: u64,
}

/// `GET /streams/{id}` (Piped)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedStreams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub audio_streams: Vec<PipedAudioStream>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipedAudioStream {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, deserialize_with = "de_bitrate")]
    pub bitrate: u64,
}

/// One playable audio-only candidate, whatever the instance flavour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCandidate<'a> {
    pub url: &'a str,
    pub bitrate_bps: u64,
}

/// Picks the highest-bitrate `audio/*` entry carrying a URL
pub fn best_audio<'a, I>(candidates: I) -> Option<AudioCandidate<'a>>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>, u64)>,
{
    candidates
        .into_iter()
        .filter(|(mime, _, _)| mime.starts_with("audio/"))
        .filter_map(|(_, url, bitrate)| {
            url.filter(|u| !u.is_empty())
                .map(|url| AudioCandidate { url, bitrate_bps: bitrate })
        })
        .max_by_key(|c| c.bitrate_bps)
}

/// Converts bits per second to kbps, rounding to nearest
pub fn to_kbps(bps: u64) -> u32 {
    u32::try_from(bps.saturating_add(500) / 1000).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invidious_string_bitrate() {
        let json = r#"{
            "title": "Song",
            "adaptiveFormats": [
                {"url": "https://a", "type": "audio/webm; codecs=\"opus\"", "bitrate": "130000"},
                {"url": "https://v", "type": "video/mp4", "bitrate": "900000"}
            ]
        }"#;
        let video: InvidiousVideo = serde_json::from_str(json).unwrap();
        assert_eq!(video.adaptive_formats[0].bitrate, 130_000);
        assert_eq!(video.adaptive_formats[1].mime_type, "video/mp4");
    }

    #[test]
    fn test_piped_numeric_bitrate() {
        let json = r#"{"audioStreams": [{"url": "https://a", "mimeType": "audio/mp4", "bitrate": 129000}]}"#;
        let streams: PipedStreams = serde_json::from_str(json).unwrap();
        assert_eq!(streams.audio_streams[0].bitrate, 129_000);
    }

    #[test]
    fn test_best_audio_ignores_video_and_missing_urls() {
        let entries = vec![
            ("video/mp4", Some("https://video"), 2_000_000),
            ("audio/mp4", Some("https://low"), 48_000),
            ("audio/webm", None, 160_000),
            ("audio/webm", Some("https://high"), 130_000),
        ];
        let best = best_audio(entries).unwrap();
        assert_eq!(best.url, "https://high");
        assert_eq!(to_kbps(best.bitrate_bps), 130);
    }

    #[test]
    fn test_best_audio_none() {
        let entries: Vec<(&str, Option<&str>, u64)> = vec![("video/webm", Some("https://v"), 1)];
        assert!(best_audio(entries).is_none());
    }

    #[test]
    fn test_to_kbps_saturates() {
        assert_eq!(to_kbps(0), 0);
        assert_eq!(to_kbps(127_600), 128);
        assert_eq!(to_kbps(u64::MAX), u32::MAX);
    }
}
