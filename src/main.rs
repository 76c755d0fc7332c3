use std::sync::Arc;

use anyhow::Context;

use repcall::channels::sms_routes;
use repcall::config::ServiceConfig;
use repcall::pipeline::processor::MessageProcessor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env().context("Invalid configuration")?;

    eprintln!("📞 repcall v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Webhook: http://0.0.0.0:{}/sms", config.port);
    eprintln!("   Outbound numbers: {}", config.outbound_numbers.len());
    eprintln!(
        "   ZIP cache: {}",
        config
            .zip_cache_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    eprintln!("   Dedup: {:?}\n", config.dedup);

    let processor =
        Arc::new(MessageProcessor::from_config(&config).context("Failed to build pipeline")?);
    let app = sms_routes(processor);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    tracing::info!(port = config.port, "SMS webhook server started");

    axum::serve(listener, app).await?;
    Ok(())
}
