//! Initialisation du logging et consultation des derniers logs
//!
//! Le subscriber global combine :
//! - un [`EnvFilter`] dont le niveau vient de `host.logger.min_level`
//!   (surchargé par `RUST_LOG` s'il est défini) ;
//! - un [`BufferLayer`] qui garde les dernières entrées en mémoire ;
//! - optionnellement la sortie console de `tracing_subscriber::fmt`.
//!
//! Les entrées mémorisées sont servies en JSON par `GET /api/logs/dump`.

use std::{
    collections::VecDeque,
    fmt::{self, Write as _},
    sync::{Arc, PoisonError, RwLock},
    time::SystemTime,
};

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{
    Event, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    EnvFilter, Layer, layer::Context, layer::SubscriberExt, util::SubscriberInitExt,
};
use vtxconfig::Config;

/// Représente une entrée de log
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LogEntry {
    #[schema(value_type = Object)]
    pub timestamp: SystemTime,
    pub level: String,
    pub target: String,
    pub message: String,
}

/// Buffer circulaire partagé
#[derive(Clone)]
pub struct LogState {
    buffer: Arc<RwLock<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl LogState {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn push(&self, entry: LogEntry) {
        let mut buf = self.buffer.write().unwrap_or_else(PoisonError::into_inner);
        if buf.len() == self.capacity {
            buf.pop_front();
        }
        buf.push_back(entry);
    }

    pub fn dump(&self) -> Vec<LogEntry> {
        self.buffer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Layer tracing qui recopie chaque événement dans un [`LogState`]
pub struct BufferLayer {
    state: LogState,
}

impl BufferLayer {
    pub fn new(state: LogState) -> Self {
        Self { state }
    }
}

impl<S: Subscriber> Layer<S> for BufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        self.state.push(LogEntry {
            timestamp: SystemTime::now(),
            level: meta.level().to_string(),
            target: meta.target().to_string(),
            message: visitor.finish(),
        });
    }
}

/// Reconstitue le message et les champs structurés d'un événement
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Options d'initialisation du système de logging
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Capacité du buffer circulaire (nombre d'entrées conservées)
    pub buffer_capacity: usize,
    /// Activer la sortie console
    pub enable_console: bool,
    /// Niveau minimum quand `RUST_LOG` n'est pas défini
    pub min_level: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 500,
            enable_console: true,
            min_level: "INFO".to_string(),
        }
    }
}

impl LoggingOptions {
    /// Lit `host.logger.*` dans la configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            buffer_capacity: config.get_u64_or(&["host", "logger", "buffer_capacity"], 500)
                as usize,
            enable_console: config.get_log_enable_console(),
            min_level: config.get_log_min_level(),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.min_level.to_lowercase()))
    }
}

/// Installe le subscriber global et retourne le buffer associé
///
/// Un second appel ne remplace pas le subscriber déjà installé : le
/// `LogState` retourné reste alors vide.
pub fn init_logging(options: LoggingOptions) -> LogState {
    let log_state = LogState::new(options.buffer_capacity);

    let console = options.enable_console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(true)
    });

    let installed = tracing_subscriber::registry()
        .with(options.env_filter())
        .with(BufferLayer::new(log_state.clone()))
        .with(console)
        .try_init();

    if let Err(e) = installed {
        tracing::debug!("Logging already initialised: {}", e);
    }

    log_state
}

/// Paramètres de `GET /dump`
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct DumpQuery {
    /// Ne garder que ce niveau (ERROR, WARN, INFO, DEBUG, TRACE)
    pub level: Option<String>,
    /// Mot-clé recherché dans le message ou la cible
    pub search: Option<String>,
}

fn filter_entry(entry: &LogEntry, q: &DumpQuery) -> bool {
    if let Some(level) = &q.level {
        if !entry.level.eq_ignore_ascii_case(level) {
            return false;
        }
    }
    match &q.search {
        Some(search) => entry.message.contains(search) || entry.target.contains(search),
        None => true,
    }
}

/// Handler REST (dump JSON du buffer)
#[utoipa::path(
    get,
    path = "/dump",
    params(DumpQuery),
    responses(
        (status = 200, description = "Buffered log entries, oldest first", body = Vec<LogEntry>)
    ),
    tag = "logs"
)]
pub async fn log_dump(
    State(state): State<LogState>,
    Query(params): Query<DumpQuery>,
) -> impl IntoResponse {
    let entries: Vec<LogEntry> = state
        .dump()
        .into_iter()
        .filter(|e| filter_entry(e, &params))
        .collect();
    Json(entries)
}

/// Crée le router pour la consultation des logs
pub fn create_logs_router(log_state: LogState) -> Router {
    Router::new()
        .route("/dump", get(log_dump))
        .with_state(log_state)
}

/// API OpenAPI pour la consultation des logs
#[derive(utoipa::OpenApi)]
#[openapi(
    paths(log_dump),
    components(schemas(LogEntry)),
    tags((name = "logs", description = "Recent log entries"))
)]
pub struct LogsApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: &str, target: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: SystemTime::now(),
            level: level.to_string(),
            target: target.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_buffer_drops_oldest() {
        let state = LogState::new(2);
        state.push(entry("INFO", "a", "one"));
        state.push(entry("INFO", "a", "two"));
        state.push(entry("INFO", "a", "three"));

        let messages: Vec<String> = state.dump().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_filter_entry() {
        let e = entry("WARN", "vtxproxy::pool", "instance timed out");
        assert!(filter_entry(&e, &DumpQuery::default()));
        assert!(filter_entry(
            &e,
            &DumpQuery {
                level: Some("warn".into()),
                search: Some("vtxproxy".into()),
            }
        ));
        assert!(!filter_entry(
            &e,
            &DumpQuery {
                level: Some("ERROR".into()),
                search: None,
            }
        ));
    }

    #[test]
    fn test_layer_records_events() {
        let state = LogState::new(10);
        let subscriber = tracing_subscriber::registry().with(BufferLayer::new(state.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(instance = "https://a", "Instance failed");
        });

        let dump = state.dump();
        assert_eq!(dump.len(), 1);
        assert_eq!(dump[0].level, "WARN");
        assert_eq!(dump[0].message, "Instance failed instance=https://a");
    }
}
