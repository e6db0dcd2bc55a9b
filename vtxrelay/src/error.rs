//! Erreurs du relais de flux

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Connexion à l'amont impossible
    #[error("Upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// L'amont a répondu avec un statut d'erreur
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Décalage au-delà de la fin de la ressource
    #[error("Requested range not satisfiable")]
    RangeNotSatisfiable,

    /// Le flux amont s'est interrompu en cours de transfert
    #[error("Upstream stream failed: {0}")]
    Upstream(String),
}
