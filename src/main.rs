use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use streamfront::{
    api::{create_router, AppState},
    config::Config,
    services::HttpCatalogApi,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("streamfront=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let api = HttpCatalogApi::new(config.upstream_api_url.clone(), config.upstream_token.clone());

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(api), config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %bind_address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
