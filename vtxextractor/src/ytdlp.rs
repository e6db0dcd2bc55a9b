//! yt-dlp integration for extracting playable stream URLs
//!
//! The tool is spawned once per call. Mobile player personas are requested
//! because they expose progressive audio formats without a signature step.
//! The child is killed when the future is dropped, so a cancelled race never
//! leaves a process behind.

use crate::error::{ExtractorError, Result};
use crate::models::{SearchResult, VideoInfo};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};
use vtxsource::{
    Lookup, SourceKind, StreamDescriptor, StreamSource, TrackSearch, is_native_id,
};

pub const DEFAULT_BINARY: &str = "yt-dlp";
pub const DEFAULT_PLAYER_CLIENTS: &str = "ios,android";
pub const DEFAULT_TIMEOUT_SECS: u64 = 7;

const FORMAT_SELECTOR: &str = "bestaudio[protocol^=http]/bestaudio/best";

/// GeneralExtractor adapter, also used as metadata search
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
    player_clients: String,
    timeout: Duration,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY)
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            player_clients: DEFAULT_PLAYER_CLIENTS.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn player_clients(mut self, clients: impl Into<String>) -> Self {
        self.player_clients = clients.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments of a single-video extraction
    pub fn extract_args(&self, target: &str) -> Vec<String> {
        vec![
            "-J".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "-f".to_string(),
            FORMAT_SELECTOR.to_string(),
            "--extractor-args".to_string(),
            format!("youtube:player_client={};skip=hls,dash", self.player_clients),
            target.to_string(),
        ]
    }

    /// Runs the tool and returns its stdout
    async fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        debug!("Running {} {}", self.binary, args.join(" "));

        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExtractorError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("{} exited with {}: {}", self.binary, output.status, stderr);
            return Err(ExtractorError::Exit {
                code: output.status.code(),
                stderr,
            });
        }

        Ok(output.stdout)
    }

    /// Extracts the best audio stream of a video
    ///
    /// `target` is a native id, a full URL or a `ytsearch1:` expression.
    pub async fn extract(&self, target: &str) -> Result<StreamDescriptor> {
        let stdout = self.run(&self.extract_args(&watch_target(target))).await?;
        let info: VideoInfo = serde_json::from_slice(&stdout)?;
        let video = info.into_video();

        let picked = video
            .pick_stream()
            .ok_or_else(|| ExtractorError::NoAudio(target.to_string()))?;

        let descriptor = StreamDescriptor::new(SourceKind::GeneralExtractor, picked.url)
            .map_err(|_| ExtractorError::NoAudio(target.to_string()))?
            .with_bitrate(picked.bitrate_kbps)
            .with_duration(video.duration_seconds())
            .with_artist(video.display_artist())
            .with_title(video.title.clone())
            .with_thumbnail(video.thumbnail.clone());
        Ok(descriptor)
    }

    /// First native id matching `query`, if any
    pub async fn search(&self, query: &str) -> Result<Option<String>> {
        let args = vec![
            "--flat-playlist".to_string(),
            "-J".to_string(),
            "--no-warnings".to_string(),
            format!("ytsearch1:{}", query),
        ];
        let stdout = self.run(&args).await?;
        let result: SearchResult = serde_json::from_slice(&stdout)?;

        Ok(result
            .entries
            .into_iter()
            .map(|e| e.id)
            .find(|id| is_native_id(id)))
    }
}

/// Native ids become watch URLs, anything else is passed through
fn watch_target(target: &str) -> String {
    if is_native_id(target) {
        format!("https://www.youtube.com/watch?v={}", target)
    } else {
        target.to_string()
    }
}

#[async_trait::async_trait]
impl StreamSource for YtDlp {
    fn kind(&self) -> SourceKind {
        SourceKind::GeneralExtractor
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn resolve(&self, lookup: &Lookup<'_>) -> vtxsource::Result<StreamDescriptor> {
        // An unmapped catalog id means nothing to the tool, search its hints instead
        let target = if is_native_id(lookup.effective_id) {
            lookup.effective_id.to_string()
        } else {
            match lookup.request.search_query() {
                Some(query) => format!("ytsearch1:{}", query),
                None => lookup.effective_id.to_string(),
            }
        };
        Ok(self.extract(&target).await?)
    }
}

#[async_trait::async_trait]
impl TrackSearch for YtDlp {
    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn find_native_id(&self, query: &str) -> vtxsource::Result<Option<String>> {
        Ok(self.search(query).await?)
    }
}
