//! Documents retournés par `song.getDetails`

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Nombre transmis tantôt en chaîne, tantôt en entier
fn de_lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `"true"`, `true` ou absent
fn de_lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// Un titre du catalogue
#[derive(Debug, Clone, Deserialize)]
pub struct SongDetails {
    #[serde(default)]
    pub id: Option<String>,
    /// Titre (le catalogue l'appelle `song`)
    #[serde(default, alias = "title")]
    pub song: Option<String>,
    #[serde(default, alias = "singers")]
    pub primary_artists: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub duration: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub encrypted_media_url: Option<String>,
    /// Le titre existe en 320 kbps
    #[serde(rename = "320kbps", default, deserialize_with = "de_lenient_bool")]
    pub has_320kbps: bool,
}

impl SongDetails {
    /// Pochette en 500x500 plutôt que la vignette 150x150 du catalogue
    pub fn large_image(&self) -> Option<String> {
        self.image
            .as_ref()
            .map(|url| url.replace("150x150", "500x500").replace("50x50", "500x500"))
    }
}

/// Extrait le titre `id` d'une réponse `song.getDetails`
///
/// Selon la version de l'API, la réponse est indexée par identifiant
/// (`{"<id>": {...}}`) ou enveloppée dans `{"songs": [...]}`.
pub fn extract_song(response: Value, id: &str) -> Option<SongDetails> {
    let Value::Object(mut map) = response else {
        return None;
    };

    let raw = match map.remove(id) {
        Some(song) => song,
        None => match map.remove("songs") {
            Some(Value::Array(songs)) => songs.into_iter().next()?,
            _ => return None,
        },
    };

    serde_json::from_value(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_keyed_by_id() {
        let response = json!({
            "QQ8jRRlh": {
                "id": "QQ8jRRlh",
                "song": "Kesariya",
                "primary_artists": "Arijit Singh",
                "duration": "268",
                "image": "https://c.saavncdn.com/191/Kesariya-150x150.jpg",
                "encrypted_media_url": "abc",
                "320kbps": "true"
            }
        });
        let song = extract_song(response, "QQ8jRRlh").unwrap();
        assert_eq!(song.song.as_deref(), Some("Kesariya"));
        assert_eq!(song.duration, Some(268));
        assert!(song.has_320kbps);
        assert_eq!(
            song.large_image().as_deref(),
            Some("https://c.saavncdn.com/191/Kesariya-500x500.jpg")
        );
    }

    #[test]
    fn test_extract_songs_envelope() {
        let response = json!({"songs": [{"id": "x", "duration": 200, "320kbps": false}]});
        let song = extract_song(response, "x").unwrap();
        assert_eq!(song.duration, Some(200));
        assert!(!song.has_320kbps);
        assert!(song.encrypted_media_url.is_none());
    }

    #[test]
    fn test_extract_unknown_id() {
        assert!(extract_song(json!({}), "x").is_none());
        assert!(extract_song(json!([]), "x").is_none());
        assert!(extract_song(json!({"songs": []}), "x").is_none());
    }
}
