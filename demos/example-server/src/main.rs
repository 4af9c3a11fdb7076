use keystone::config::HttpClientProps;
use keystone::prelude::*;
use keystone::util::http::init_http_client;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod modules;

use modules::ApiKeyGuard;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,keystone=debug")),
        )
        .init();

    tracing::info!("Starting example server...");

    let config = ConfigService::new();
    init_http_client(HttpClientProps::from_config(&config)?)?;

    let api_key = config.get("demo.api-key").unwrap_or_else(|| "local-dev-key".to_string());
    let app = WebStarter::from_config(&config)?
        .guard(ApiKeyGuard::new(api_key))
        .interceptor(LoggingInterceptor)
        .apply(modules::order::router())
        .layer(TraceLayer::new_for_http());

    let host = config.get("host").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = config.get("port").unwrap_or_else(|| "3000".to_string());
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
