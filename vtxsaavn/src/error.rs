//! Gestion des erreurs pour l'adaptateur JioSaavn

use thiserror::Error;
use vtxsource::SourceError;

/// Type Result personnalisé pour vtxsaavn
pub type Result<T> = std::result::Result<T, SaavnError>;

/// Erreurs possibles lors de la résolution d'un titre du catalogue
#[derive(Error, Debug)]
pub enum SaavnError {
    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Statut HTTP non attendu
    #[error("Catalog API returned status {0}")]
    Status(u16),

    /// Le catalogue ne connaît pas ce titre
    #[error("Song not found in catalog: {0}")]
    NotFound(String),

    /// Le titre existe mais n'a pas de pointeur média
    #[error("No encrypted media pointer for {0}")]
    MissingPointer(String),

    /// Décodage base64, clé, bourrage ou UTF-8 invalide
    #[error("Media pointer decryption failed: {0}")]
    Decryption(String),
}

impl From<SaavnError> for SourceError {
    fn from(err: SaavnError) -> Self {
        match err {
            SaavnError::Decryption(message) => SourceError::Decryption(message),
            SaavnError::NotFound(_) | SaavnError::MissingPointer(_) => {
                SourceError::no_stream(err.to_string())
            }
            other => SourceError::unavailable(other.to_string()),
        }
    }
}
