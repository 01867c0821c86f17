mod advisory;
mod aggregator;
mod config;
mod constants;
mod error;
mod formatters;
mod gdd;
mod models;
mod reference;
mod report;
mod service;

use anyhow::Result;
use rmcp::ServiceExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::service::AgroWeather;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcp_agro_weather_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting MCP agro weather server");
    tracing::info!("Default city: {}, default crop: {}", config.defaults.city, config.defaults.crop);
    if config.api_key().is_none() {
        tracing::warn!("No OpenWeatherMap API key configured, forecast reports will fail");
    }

    let service = AgroWeather::new(config)?;
    let server = service.serve(rmcp::transport::stdio()).await?;
    server.waiting().await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}
