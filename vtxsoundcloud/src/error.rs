//! Gestion des erreurs pour l'adaptateur SoundCloud

use thiserror::Error;
use vtxsource::SourceError;

/// Type Result personnalisé pour vtxsoundcloud
pub type Result<T> = std::result::Result<T, SoundCloudError>;

#[derive(Error, Debug)]
pub enum SoundCloudError {
    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Le client_id a été refusé (401/403)
    #[error("Client id rejected with status {0}")]
    Unauthorized(u16),

    /// Aucun client_id trouvé dans les scripts de la page d'accueil
    #[error("Could not obtain a client id: {0}")]
    ClientId(String),

    /// Statut HTTP non attendu
    #[error("SoundCloud API returned status {0}")]
    Status(u16),

    /// La recherche n'a rien donné
    #[error("No track matches {0:?}")]
    NoResults(String),

    /// Le titre n'a pas de transcodage lisible
    #[error("No usable transcoding for track {0}")]
    NoTranscoding(String),
}

impl SoundCloudError {
    /// Erreur de credentials (401/403)
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SoundCloudError::Unauthorized(_))
    }

    pub fn from_status_code(code: u16) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(code),
            _ => Self::Status(code),
        }
    }
}

impl From<SoundCloudError> for SourceError {
    fn from(err: SoundCloudError) -> Self {
        match err {
            SoundCloudError::Unauthorized(_) | SoundCloudError::ClientId(_) => {
                SourceError::Credential(err.to_string())
            }
            SoundCloudError::NoResults(_) | SoundCloudError::NoTranscoding(_) => {
                SourceError::no_stream(err.to_string())
            }
            other => SourceError::unavailable(other.to_string()),
        }
    }
}
