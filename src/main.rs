use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use pawhaven_api::app::app;
use pawhaven_api::auth::JwtVerifier;
use pawhaven_api::config;
use pawhaven_api::context::AppContext;
use pawhaven_api::payment::StripeGateway;
use pawhaven_api::store::{postgres, DataContext, StoreManager};

#[derive(Parser, Debug)]
#[command(name = "pawhaven-api", about = "Backend API for the PawHaven pet adoption platform", version)]
struct Cli {
    /// Port to listen on (overrides PORT / config)
    #[arg(long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting PawHaven API in {:?} mode", config.environment);

    let pool = StoreManager::pool()
        .await
        .context("failed to connect to the database")?;
    postgres::ensure_schema(&pool)
        .await
        .context("failed to ensure store schema")?;

    let verifier =
        JwtVerifier::new(&config.security.jwt_secret).context("failed to build token verifier")?;

    let ctx = AppContext {
        data: DataContext::postgres(pool),
        verifier: Arc::new(verifier),
        payments: Arc::new(StripeGateway::from_config()),
    };

    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", cli.bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("PawHaven API listening on http://{}", bind_addr);

    axum::serve(listener, app(ctx)).await?;
    Ok(())
}
