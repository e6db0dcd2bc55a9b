//! Subset of the yt-dlp info JSON (`-J`)

use serde::Deserialize;

/// Info document of a single video, or of a search playlist
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    /// Seconds, fractional
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// URL of the format picked by `-f`, when a single format was selected
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default)]
    pub formats: Vec<Format>,
    /// Present for `ytsearch` playlists
    #[serde(default)]
    pub entries: Vec<VideoInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Format {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub abr: Option<f64>,
}

impl Format {
    /// Audio only, served over plain HTTP(S)
    fn is_progressive_audio(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
            && self
                .protocol
                .as_deref()
                .is_some_and(|p| p.starts_with("http"))
            && self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// A stream picked from an info document
#[derive(Debug, Clone, PartialEq)]
pub struct PickedStream<'a> {
    pub url: &'a str,
    pub bitrate_kbps: u32,
}

impl VideoInfo {
    /// Unwraps search playlists down to their first entry
    pub fn into_video(mut self) -> VideoInfo {
        if self.entries.is_empty() {
            self
        } else {
            self.entries.swap_remove(0)
        }
    }

    /// Top-level `url` first, else the highest-`abr` progressive audio format
    pub fn pick_stream(&self) -> Option<PickedStream<'_>> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(PickedStream {
                url,
                bitrate_kbps: kbps(self.abr.or(self.tbr)),
            });
        }

        self.formats
            .iter()
            .filter(|f| f.is_progressive_audio())
            .max_by(|a, b| a.abr.unwrap_or(0.0).total_cmp(&b.abr.unwrap_or(0.0)))
            .and_then(|f| {
                f.url.as_deref().map(|url| PickedStream {
                    url,
                    bitrate_kbps: kbps(f.abr),
                })
            })
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d.round() as u32)
    }

    /// `artist` when tagged, else the uploader or channel
    pub fn display_artist(&self) -> Option<String> {
        self.artist
            .clone()
            .or_else(|| self.uploader.clone())
            .or_else(|| self.channel.clone())
    }
}

fn kbps(value: Option<f64>) -> u32 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u32)
        .unwrap_or(0)
}

/// `--flat-playlist -J ytsearch1:…` output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub entries: Vec<SearchEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchEntry {
    pub id: String,
}
