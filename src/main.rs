//! Timerboard - HTTP server for countdown timers that survive page reloads
//!
//! This is the main entry point for the timerboard server.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use timerboard::{
    api::create_router,
    config::Config,
    state::{AppState, TimerStore},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timerboard={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timerboard server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, data_file={}, ephemeral={}",
        config.host,
        config.port,
        config.data_file.display(),
        config.ephemeral
    );

    // Open the timer store; an unreadable snapshot is fatal
    let store = if config.ephemeral {
        TimerStore::ephemeral()
    } else {
        match TimerStore::open(config.data_file.clone()) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to open timer store: {}", e);
                std::process::exit(1);
            }
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(store, config.port, config.host.clone()));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /api/timers                       - Create or overwrite a timer");
    info!("  GET    /api/timers                       - List timers with remaining time");
    info!("  GET    /api/timers/:server/:event        - Get one timer");
    info!("  PUT    /api/timers/:server/:event/pause  - Pause a running timer");
    info!("  PUT    /api/timers/:server/:event/start  - Resume a paused timer");
    info!("  PUT    /api/timers/:server/:event/reset  - Restart the current budget");
    info!("  DELETE /api/timers/:server/:event        - Delete a timer");
    info!("  GET    /status                           - Server status");
    info!("  GET    /health                           - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
