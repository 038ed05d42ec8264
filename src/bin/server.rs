use std::net::SocketAddr;

use tower::ServiceBuilder;
use tower_http::cors::{any, CorsLayer};
use tower_http::{add_extension::AddExtensionLayer, trace::TraceLayer};

use virtty::cluster::ClusterClient;
use virtty::{env, metrics, service};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "virtty=debug,tower_http=debug")
    }
    tracing_subscriber::fmt::init();

    let cluster = ClusterClient::try_default().await?;
    tracing::info!(namespace = cluster.namespace(), "connected to cluster");

    let app = service::routes()
        .merge(metrics::routes())
        // Add middleware to all routes
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(AddExtensionLayer::new(cluster))
                .into_inner(),
        )
        .layer(
            // The API carries no browser credentials, so every route is
            // callable from any origin.
            CorsLayer::new()
                .allow_origin(any())
                .allow_methods(any())
                .allow_headers(any()),
        );

    let addr: SocketAddr = env::LISTEN_ADDR.parse()?;
    tracing::debug!("listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
