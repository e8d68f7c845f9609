use rustilms_portal::{
    api::ApiClient,
    config::Config,
    urls::{Environment, Urls},
};
use std::env;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "rustilms_portal=info,axum=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let urls = Urls::new(config.backend_url.clone(), config.environment, config.storage.clone());
    if config.environment == Environment::Development {
        tracing::debug!(
            backend = urls.backend(),
            environment = %urls.environment(),
            bucket = ?config.storage.bucket,
            region = %config.storage.region,
            "url configuration"
        );
    }

    let api = ApiClient::new(urls, config.request_timeout)?;
    let app = rustilms_portal::app(api, &config.static_dir);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("listening on http://0.0.0.0:{}", config.port);

    axum::serve(listener, app).await?;
    Ok(())
}
