//! # Bank Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the ledger store adapter
//! - Create the balance service
//! - Start the HTTP server

mod config;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bank_hex::{BalanceService, inbound::HttpServer};
use bank_repo::build_ledger;

use config::{Config, LogFormat};

fn init_tracer() -> anyhow::Result<sdktrace::SdkTracerProvider> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .map_err(|e| anyhow::anyhow!("failed to create OTLP span exporter: {}", e))?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());
    Ok(provider)
}

/// Installs the global subscriber. Returns the OTel provider when export is on.
fn init_tracing(config: &Config) -> anyhow::Result<Option<sdktrace::SdkTracerProvider>> {
    let provider = if config.otel_enabled {
        Some(init_tracer()?)
    } else {
        None
    };

    let telemetry = provider.as_ref().map(|provider| {
        use opentelemetry::trace::TracerProvider as _;
        tracing_opentelemetry::layer().with_tracer(provider.tracer("bank-service"))
    });

    let (pretty, json) = match config.log_format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer()), None),
        LogFormat::Json => (None, Some(tracing_subscriber::fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bank_app=debug,bank_hex=debug".into()),
        )
        .with(pretty)
        .with(json)
        .with(telemetry)
        .init();

    Ok(provider)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let otel_provider = init_tracing(&config)?;

    tracing::info!("Starting bank server on port {}", config.port);
    tracing::info!(
        backend = config.database_scheme(),
        account_id = %config.account_id,
        otel = config.otel_enabled,
        "Using database"
    );

    // Build ledger (handles connection and migration)
    let ledger = build_ledger(&config.database_url).await?;

    let service = BalanceService::with_account(ledger, config.account_id);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        if let Err(e) = provider.shutdown() {
            tracing::warn!("Failed to flush traces: {}", e);
        }
    }
    Ok(())
}
