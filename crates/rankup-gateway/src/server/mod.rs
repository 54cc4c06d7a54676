//! Server setup and initialization
//!
//! Provides the application builder and server runner.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use rankup_common::{load_ladder, AppConfig, AppError};
use rankup_core::{EventSink, SnowflakeGenerator};
use rankup_db::{
    create_pool, run_migrations, PgBlacklistRepository, PgLedgerRepository,
    PgResetScheduleRepository, PoolConfig,
};
use rankup_service::{RankSettings, ResetScheduler, SchedulerConfig, ServiceContextBuilder};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::discord::{DiscordAnnouncer, DiscordClient, DiscordRoleGateway, LogEventSink};
use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState, request_timeout: Duration) -> Router {
    let router = create_router();
    let router = apply_middleware(router, request_timeout);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    let ladder = load_ladder(&config.rank.ladder_path)?;
    info!(
        path = %config.rank.ladder_path,
        ranks = ladder.len(),
        "Rank ladder loaded"
    );

    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&PoolConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    run_migrations(&pool, config.database.migrations_path.as_deref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    let ledger_repo = Arc::new(PgLedgerRepository::new(pool.clone()));
    let blacklist_repo = Arc::new(PgBlacklistRepository::new(pool.clone()));
    let schedule_repo = Arc::new(PgResetScheduleRepository::new(pool));

    let client = Arc::new(
        DiscordClient::new(&config.discord).map_err(|e| AppError::Platform(e.to_string()))?,
    );
    let role_gateway = Arc::new(DiscordRoleGateway::new(
        Arc::clone(&client),
        config.discord.guild_id,
    ));
    let event_sink: Arc<dyn EventSink> = match config.discord.announce_channel_id {
        Some(channel_id) => {
            info!(channel_id = %channel_id, "Announcements enabled");
            Arc::new(DiscordAnnouncer::new(client, channel_id))
        }
        None => Arc::new(LogEventSink),
    };

    let service_context = ServiceContextBuilder::new()
        .ledger_repo(ledger_repo)
        .blacklist_repo(blacklist_repo)
        .schedule_repo(schedule_repo)
        .role_gateway(role_gateway)
        .event_sink(event_sink)
        .ladder(Arc::new(ladder))
        .settings(RankSettings::from(&config.rank))
        .snowflake_generator(Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id)))
        .build()?;

    let scheduler = ResetScheduler::new_shared(
        service_context.clone(),
        SchedulerConfig::from(&config.reset),
    );

    Ok(AppState::new(service_context, scheduler)
        .with_command_token(config.server.command_token.clone()))
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .server
        .address()
        .parse()
        .map_err(|e| AppError::Validation(format!("Invalid server address: {e}")))?;

    let state = create_app_state(&config).await?;
    state.scheduler().start();

    let app = create_app(
        state.clone(),
        Duration::from_secs(config.server.request_timeout_secs),
    );
    let result = run_server(app, addr).await;

    state.scheduler().cancel();
    let dropped = state.service_context().tracking().clear();
    info!(open_voice_sessions = dropped, "Shutdown complete");

    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
