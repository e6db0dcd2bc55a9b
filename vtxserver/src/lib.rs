//! # vtxserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate cache la plomberie Axum du binaire Vortex : montage des
//! routers, documentation OpenAPI/Swagger, démarrage et arrêt gracieux,
//! et initialisation de `tracing`.
//!
//! - [`server`] : le serveur et son builder
//! - [`logs`] : subscriber `tracing` et consultation des derniers logs
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use vtxserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 8080).build();
//!     server.init_logging(LoggingOptions::default()).await;
//!
//!     server.add_route("/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await;
//!     server.wait().await;
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions, init_logging};
pub use server::{Server, ServerBuilder, ServerInfo};
