use tracing::info;
use vtxconfig::get_config;
use vtxresolver::ResolverServerExt;
use vtxserver::{LoggingOptions, ServerBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = get_config();

    // ========== PHASE 1 : Infrastructure HTTP ==========

    let mut server = ServerBuilder::new_configured().build();
    server
        .init_logging(LoggingOptions::from_config(&config))
        .await;

    server
        .add_route("/info", || async {
            serde_json::json!({"version": env!("CARGO_PKG_VERSION")})
        })
        .await;

    // ========== PHASE 2 : Sources et résolveur ==========

    info!("🎵 Building stream sources...");
    let resolver = server.init_resolver_api_configured().await?;
    info!("✅ {} stream source(s) ready", resolver.source_count());

    // ========== PHASE 3 : Démarrage du serveur ==========

    info!("🌐 Starting HTTP server...");
    server.start().await;

    info!("✅ Vortex is ready!");
    info!("Press Ctrl+C to stop...");
    server.wait().await;

    Ok(())
}
