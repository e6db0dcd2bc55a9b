//! Instance list handling shared by both pool flavours

use rand::seq::SliceRandom;
use reqwest::Client;
use std::time::Duration;

/// Default per-instance timeout
pub const DEFAULT_INSTANCE_TIMEOUT_SECS: u64 = 4;

/// Default number of instances raced per resolution
pub const DEFAULT_RACE_WIDTH: usize = 6;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings of one instance pool
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Base URLs, without trailing slash
    pub instances: Vec<String>,
    /// How many instances are raced per resolution (0 = all)
    pub race_width: usize,
    pub instance_timeout: Duration,
}

impl PoolSettings {
    pub fn new(instances: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            instances: instances
                .into_iter()
                .map(|i| i.into().trim_end_matches('/').to_string())
                .filter(|i| !i.is_empty())
                .collect(),
            race_width: DEFAULT_RACE_WIDTH,
            instance_timeout: Duration::from_secs(DEFAULT_INSTANCE_TIMEOUT_SECS),
        }
    }

    pub fn race_width(mut self, width: usize) -> Self {
        self.race_width = width;
        self
    }

    pub fn instance_timeout(mut self, timeout: Duration) -> Self {
        self.instance_timeout = timeout;
        self
    }

    /// A random selection of instances, at most `race_width` long
    pub fn pick(&self) -> Vec<String> {
        let mut picked = self.instances.clone();
        picked.shuffle(&mut rand::rng());
        if self.race_width > 0 {
            picked.truncate(self.race_width);
        }
        picked
    }
}

/// HTTP client shared by the instance calls of one pool
pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_are_trimmed() {
        let settings = PoolSettings::new(["https://a/", "", "https://b"]);
        assert_eq!(settings.instances, vec!["https://a", "https://b"]);
    }

    #[test]
    fn test_pick_respects_width() {
        let settings = PoolSettings::new(["a", "b", "c", "d"]).race_width(2);
        let picked = settings.pick();
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|p| settings.instances.contains(p)));
    }

    #[test]
    fn test_zero_width_means_all() {
        let settings = PoolSettings::new(["a", "b", "c"]).race_width(0);
        let mut picked = settings.pick();
        picked.sort();
        assert_eq!(picked, vec!["a", "b", "c"]);
    }
}
