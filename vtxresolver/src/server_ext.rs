//! Extension de vtxserver::Server pour monter les endpoints du résolveur
//!
//! `vtxserver` ne connaît pas le résolveur : c'est cette crate qui étend le
//! serveur générique par un trait.

use crate::api_rest::{ApiDoc, ResolverState, create_router};
use crate::resolver::Resolver;
use anyhow::Result;
use std::sync::Arc;
use utoipa::OpenApi;
use vtxconfig::get_config;
use vtxrelay::StreamRelay;
use vtxserver::Server;

/// Trait d'extension pour ajouter le résolveur à un serveur vtxserver
///
/// # Exemple
///
/// ```rust,no_run
/// use vtxresolver::ResolverServerExt;
/// use vtxserver::ServerBuilder;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let mut server = ServerBuilder::new_configured().build();
///     server.init_resolver_api_configured().await?;
///     server.start().await;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait ResolverServerExt {
    /// Enregistre les routes HTTP du résolveur à la racine du serveur
    ///
    /// # Routes enregistrées
    ///
    /// - `GET /health`
    /// - `GET /stream-info?id=&title=&artist=&duration_total=&pointer=`
    /// - `GET /stream?id=...` (en-tête `Range` supporté)
    /// - `GET /warmup?ids=a,b,c`
    /// - `GET /swagger-ui/vortex` - Documentation interactive
    async fn init_resolver_api(&mut self, resolver: Arc<Resolver>, relay: Arc<StreamRelay>);

    /// Construit résolveur et relais depuis la configuration globale, puis
    /// enregistre les routes
    async fn init_resolver_api_configured(&mut self) -> Result<Arc<Resolver>>;
}

impl ResolverServerExt for Server {
    async fn init_resolver_api(&mut self, resolver: Arc<Resolver>, relay: Arc<StreamRelay>) {
        let router = create_router(ResolverState { resolver, relay });
        self.add_router("/", router).await;
        self.add_api_docs(ApiDoc::openapi(), "vortex").await;
    }

    async fn init_resolver_api_configured(&mut self) -> Result<Arc<Resolver>> {
        let config = get_config();
        let resolver = Arc::new(Resolver::from_config(&config)?);
        let relay = Arc::new(StreamRelay::from_config(&config)?);

        self.init_resolver_api(resolver.clone(), relay).await;
        Ok(resolver)
    }
}
