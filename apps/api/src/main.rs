use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skillsync_api::analysis::store::PgAnalysisStore;
use skillsync_api::auth::JwtVerifier;
use skillsync_api::config::Config;
use skillsync_api::db::create_pool;
use skillsync_api::llm_client::{self, LlmClient};
use skillsync_api::routes::build_router;
use skillsync_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("skillsync_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillSync API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize AI gateway client
    let gateway = LlmClient::new(
        config.ai_gateway_api_key.clone(),
        config.ai_gateway_url.clone(),
    );
    info!("AI gateway client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        gateway: Arc::new(gateway),
        store: Arc::new(PgAnalysisStore::new(db)),
        auth: JwtVerifier::new(&config.jwt_secret),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
