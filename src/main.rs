//! API сервер для очистки объявлений и модели цены

use anyhow::{Context as _, Result};

use listings_ml::{
    api::{router, AppState},
    config::AppConfig,
    logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Guard держится до выхода, чтобы дописать файл лога
    let (_guard, _log_path) = logging::init(&config)?;

    let addr = config.bind_addr;
    let app = router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
