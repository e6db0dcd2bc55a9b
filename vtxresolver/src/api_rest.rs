//! Endpoints API REST du résolveur
//!
//! - `GET /health` : état du service, purge le cache au passage
//! - `GET /stream-info` : résolution d'une piste, métadonnées en JSON
//! - `GET /stream` : octets relayés depuis l'amont, `Range` supporté
//! - `GET /warmup` : résolution en tâche de fond d'une liste d'identifiants
//!
//! Un échec de résolution donne toujours un 503 au message neutre : la
//! source fautive n'est jamais exposée.

use crate::error::ResolveError;
use crate::resolver::Resolver;
use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use vtxrelay::{RelayError, RelayResponse, RelayStatus, StreamRelay};
use vtxsource::{StreamDescriptor, TrackId, TrackRequest};

const UNAVAILABLE_MESSAGE: &str = "no playable stream found";

/// État partagé des handlers
#[derive(Clone)]
pub struct ResolverState {
    pub resolver: Arc<Resolver>,
    pub relay: Arc<StreamRelay>,
}

/// Paramètres d'identification d'une piste
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TrackQuery {
    /// Identifiant natif, ou identifiant catalogue (préfixe `saavn_`)
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Durée attendue, en secondes
    pub duration_total: Option<f64>,
    /// Pointeur média chiffré fourni par le catalogue
    pub pointer: Option<String>,
}

impl TrackQuery {
    /// Construit la requête de résolution ; la classification de l'id se fait ici
    pub fn to_request(&self) -> TrackRequest {
        let mut request = TrackRequest::new(TrackId::classify(&self.id, self.pointer.clone()));
        if let Some(title) = &self.title {
            request = request.with_title(title.clone());
        }
        if let Some(artist) = &self.artist {
            request = request.with_artist(artist.clone());
        }
        if let Some(duration) = self.duration_total.filter(|d| d.is_finite() && *d > 0.0) {
            request = request.with_expected_duration(duration.round() as u32);
        }
        request
    }
}

/// Paramètres de `/warmup`
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct WarmupQuery {
    /// Identifiants séparés par des virgules
    pub ids: String,
}

/// Réponse de `/stream-info`
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StreamInfo {
    pub stream_url: String,
    /// `invidious`, `piped`, `jiosaavn`, `yt-dlp` ou `soundcloud`
    pub source: String,
    /// kbps, 0 si inconnu
    pub bitrate: u32,
    pub duration: Option<u32>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub thumbnail: Option<String>,
}

impl From<StreamDescriptor> for StreamInfo {
    fn from(d: StreamDescriptor) -> Self {
        Self {
            stream_url: d.upstream_url().to_string(),
            source: d.source_kind.label().to_string(),
            bitrate: d.bitrate_kbps,
            duration: d.duration_seconds,
            title: d.title,
            artist: d.artist,
            thumbnail: d.thumbnail_url,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Résolutions en cache après purge
    pub cached: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct WarmupResponse {
    /// Pistes effectivement mises en file
    pub queued: usize,
}

/// Crée le router Axum avec tous les endpoints du résolveur
pub fn create_router(state: ResolverState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stream-info", get(stream_info))
        .route("/stream", get(stream))
        .route("/warmup", get(warmup))
        .with_state(state)
}

// ============ Handlers ============

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "resolver"
)]
pub async fn health(State(state): State<ResolverState>) -> Json<HealthResponse> {
    let swept = state.resolver.sweep_cache();
    if swept > 0 {
        debug!("Health check swept {} expired resolutions", swept);
    }
    Json(HealthResponse {
        status: "healthy".to_string(),
        cached: state.resolver.cached_count(),
    })
}

#[utoipa::path(
    get,
    path = "/stream-info",
    params(TrackQuery),
    responses(
        (status = 200, description = "Resolved stream", body = StreamInfo),
        (status = 503, description = "No source could provide the track")
    ),
    tag = "resolver"
)]
pub async fn stream_info(
    State(state): State<ResolverState>,
    Query(query): Query<TrackQuery>,
) -> Result<Json<StreamInfo>, AppError> {
    let descriptor = state.resolver.resolve(&query.to_request()).await?;
    Ok(Json(descriptor.into()))
}

#[utoipa::path(
    get,
    path = "/stream",
    params(TrackQuery),
    responses(
        (status = 200, description = "Whole media body"),
        (status = 206, description = "Media body from the requested offset"),
        (status = 416, description = "Offset past the end of the media"),
        (status = 502, description = "Upstream refused the stream"),
        (status = 503, description = "No source could provide the track")
    ),
    tag = "resolver"
)]
pub async fn stream(
    State(state): State<ResolverState>,
    Query(query): Query<TrackQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let descriptor = state.resolver.resolve(&query.to_request()).await?;
    let offset = range_start(&headers);

    match state.relay.open(descriptor.upstream_url(), offset).await {
        Ok(relayed) => Ok(relay_response(relayed)),
        Err(RelayError::RangeNotSatisfiable) => {
            Ok(StatusCode::RANGE_NOT_SATISFIABLE.into_response())
        }
        Err(e) => {
            warn!(source = %descriptor.source_kind, "Relay failed: {}", e);
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "upstream stream unavailable" })),
            )
                .into_response())
        }
    }
}

#[utoipa::path(
    get,
    path = "/warmup",
    params(WarmupQuery),
    responses((status = 202, description = "Resolutions queued", body = WarmupResponse)),
    tag = "resolver"
)]
pub async fn warmup(
    State(state): State<ResolverState>,
    Query(query): Query<WarmupQuery>,
) -> (StatusCode, Json<WarmupResponse>) {
    let requests = query
        .ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| TrackRequest::new(TrackId::classify(id, None)))
        .collect();

    let selected = state.resolver.select_for_warm_up(requests);
    let queued = selected.len();
    if queued > 0 {
        let resolver = state.resolver.clone();
        tokio::spawn(async move {
            resolver.warm_up(selected).await;
        });
    }

    (StatusCode::ACCEPTED, Json(WarmupResponse { queued }))
}

/// Début de la plage demandée dans `Range: bytes=<start>-[<end>]`
///
/// La fin éventuelle est ignorée : le relais envoie toujours jusqu'au bout.
fn range_start(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(header::RANGE)?.to_str().ok()?;
    let ranges = value.trim().strip_prefix("bytes=")?;
    let first = ranges.split(',').next()?;
    first.split('-').next()?.trim().parse().ok()
}

fn relay_response(relayed: RelayResponse) -> Response {
    let status = match relayed.status {
        RelayStatus::Full => StatusCode::OK,
        RelayStatus::Partial => StatusCode::PARTIAL_CONTENT,
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_TYPE,
            relayed
                .content_type
                .as_deref()
                .unwrap_or("application/octet-stream"),
        );
    if let Some(length) = relayed.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }
    if let Some(range) = &relayed.content_range {
        builder = builder.header(header::CONTENT_RANGE, range.as_str());
    }

    builder
        .body(Body::from_stream(relayed.body))
        .unwrap_or_else(|e| {
            warn!("Invalid relay headers: {}", e);
            StatusCode::BAD_GATEWAY.into_response()
        })
}

// ============ Gestion des erreurs ============

/// Erreur renvoyée par les handlers
#[derive(Debug)]
pub struct AppError(ResolveError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        debug!("Resolution failed: {}", self.0);
        let body = Json(serde_json::json!({ "error": UNAVAILABLE_MESSAGE }));
        (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        Self(err)
    }
}

/// Documentation OpenAPI des endpoints du résolveur
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(health, stream_info, stream, warmup),
    components(schemas(StreamInfo, HealthResponse, WarmupResponse)),
    tags((name = "resolver", description = "Track to audio stream resolution"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_range(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::RANGE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_range_start() {
        assert_eq!(range_start(&with_range("bytes=1024-")), Some(1024));
        assert_eq!(range_start(&with_range("bytes=0-499")), Some(0));
        assert_eq!(range_start(&with_range("bytes=-500")), None);
        assert_eq!(range_start(&with_range("items=1-2")), None);
        assert_eq!(range_start(&HeaderMap::new()), None);
    }

    #[test]
    fn test_query_to_request() {
        let query = TrackQuery {
            id: "saavn_QQ8jRRlhBEs".to_string(),
            title: Some("Gehra Hua".to_string()),
            artist: Some("Arijit Singh".to_string()),
            duration_total: Some(212.6),
            pointer: Some("".to_string()),
        };
        let request = query.to_request();
        assert_eq!(request.track_id, TrackId::catalog("QQ8jRRlhBEs", None));
        assert_eq!(request.expected_duration_seconds, Some(213));
        assert_eq!(request.search_query().as_deref(), Some("Gehra Hua Arijit Singh"));
    }

    #[test]
    fn test_stream_info_labels_source() {
        let descriptor =
            StreamDescriptor::new(vtxsource::SourceKind::GeneralExtractor, "https://cdn/a")
                .unwrap()
                .with_bitrate(160);
        let info = StreamInfo::from(descriptor);
        assert_eq!(info.source, "yt-dlp");
        assert_eq!(info.bitrate, 160);
        assert_eq!(info.stream_url, "https://cdn/a");
    }
}
