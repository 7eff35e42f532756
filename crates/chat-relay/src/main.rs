use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use chat_relay::config::Settings;
use chat_relay::services::conversation::{MemoryStore, PromptBuilder};
use chat_relay::services::{ChatRelay, GroqClient};
use chat_relay::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,chat_relay=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("Starting chat relay...");

    // Load configuration
    let settings = Arc::new(Settings::load()?);
    info!(
        "Configuration loaded: model={}, max_turns={}, upstream timeout={:?}",
        settings.upstream.model,
        settings.memory.max_turns,
        settings.upstream.timeout()
    );

    if settings.upstream.api_key.is_empty() {
        warn!("GROQ_API_KEY is not set, upstream calls will be rejected");
    }

    // Initialize memory store
    let store = MemoryStore::new(settings.memory.idle_ttl());
    let sweeper = settings
        .memory
        .idle_ttl()
        .map(|_| store.spawn_sweeper(settings.memory.sweep_interval()));

    // Initialize relay
    let provider = Arc::new(GroqClient::new(settings.upstream.clone())?);
    let relay = Arc::new(ChatRelay::new(
        store.clone(),
        provider,
        PromptBuilder::new(settings.prompts.default_system_prompt.clone()),
        settings.memory.max_turns,
    ));

    let app = build_router(AppState {
        relay,
        store,
        settings: settings.clone(),
    });

    // Server address
    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("Chat relay stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
