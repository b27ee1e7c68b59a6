use std::{path::Path, sync::Arc};

use anyhow::Context;
use dnsview_mock::{Fixture, Registry};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let registry = Arc::new(Registry::new());
    if let Ok(path) = std::env::var("MOCK_FIXTURES") {
        let count = Fixture::load(Path::new(&path))
            .and_then(|fixture| fixture.register_into(&registry))
            .with_context(|| format!("failed to load fixtures from {path}"))?;
        info!(count, %path, "loaded mock calls");
    }

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    dnsview_mock::run(listener, registry).await?;
    Ok(())
}
