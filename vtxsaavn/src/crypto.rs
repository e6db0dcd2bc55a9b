//! Déchiffrement des pointeurs média JioSaavn
//!
//! Le catalogue publie `encrypted_media_url` : l'URL du fichier AAC chiffrée
//! en DES-ECB avec une clé fixe de 8 octets, bourrage PKCS#5, encodée en
//! base64. Le déchiffrement est local et synchrone.

use crate::error::{Result, SaavnError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use des::Des;
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, KeyInit};
use lazy_static::lazy_static;
use regex::Regex;

type DesEcbDec = ecb::Decryptor<Des>;

/// Clé publiée par le lecteur web
pub const DEFAULT_DES_KEY: &str = "38346591";

lazy_static! {
    static ref LOW_BITRATE_SUFFIX: Regex = Regex::new(r"_(?:96|160|48)\.mp4").unwrap();
    static ref BITRATE_SUFFIX: Regex = Regex::new(r"_(\d+)\.mp4").unwrap();
}

/// Déchiffre un pointeur média et retourne l'URL en clair
///
/// # Errors
///
/// [`SaavnError::Decryption`] si la clé n'a pas 8 octets, si le base64 est
/// invalide, si la longueur n'est pas un multiple du bloc, si le bourrage
/// est incorrect ou si le texte clair n'est pas de l'UTF-8.
///
/// # Exemple
///
/// ```
/// use vtxsaavn::crypto::{decrypt_media_url, DEFAULT_DES_KEY};
///
/// let url = decrypt_media_url(
///     DEFAULT_DES_KEY,
///     "ID2ieOjCrwfgWvL5sXl4B1ImC5QfbsDyQd+aqn5Yzr2U+KewMUhPxQ==",
/// )
/// .unwrap();
/// assert_eq!(url, "https://aac.saavncdn.com/123/abc_96.mp4");
/// ```
pub fn decrypt_media_url(key: &str, encrypted: &str) -> Result<String> {
    let mut buffer = STANDARD
        .decode(encrypted.trim())
        .map_err(|e| SaavnError::Decryption(format!("invalid base64: {}", e)))?;

    let cipher = DesEcbDec::new_from_slice(key.as_bytes())
        .map_err(|_| SaavnError::Decryption(format!("key must be 8 bytes, got {}", key.len())))?;

    let plain = cipher
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|_| SaavnError::Decryption("invalid block length or padding".to_string()))?;

    let url = std::str::from_utf8(plain)
        .map_err(|e| SaavnError::Decryption(format!("plaintext is not UTF-8: {}", e)))?
        .trim()
        .to_string();

    if url.is_empty() {
        return Err(SaavnError::Decryption("empty plaintext".to_string()));
    }
    Ok(url)
}

/// Remplace le suffixe de débit réduit par la variante 320 kbps
pub fn upgrade_bitrate(url: &str) -> String {
    LOW_BITRATE_SUFFIX.replace(url, "_320.mp4").into_owned()
}

/// Débit en kbps d'après le suffixe `_<n>.mp4`, 0 si absent
pub fn bitrate_from_url(url: &str) -> u32 {
    BITRATE_SUFFIX
        .captures_iter(url)
        .last()
        .and_then(|cap| cap[1].parse().ok())
        .unwrap_or(0)
}
