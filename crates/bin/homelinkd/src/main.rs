//! # homelinkd — homelink daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file + environment overrides)
//! - Initialize the `SQLite` pool and run migrations
//! - Seed the default admin into an empty user store
//! - Construct the state store, fanout, decay scheduler, and dispatcher
//! - Open the MQTT link and spawn the ingestion loop
//! - Build the axum router, bind, and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use homelink_adapter_http_axum::router;
use homelink_adapter_http_axum::state::AppState;
use homelink_adapter_mqtt::MqttLink;
use homelink_adapter_storage_sqlite_sqlx::{Config as DbConfig, SqliteUserRepository};
use homelink_app::broadcast::StateBroadcaster;
use homelink_app::decay::DecayScheduler;
use homelink_app::dispatch::CommandDispatcher;
use homelink_app::ingest::IngestPipeline;
use homelink_app::services::auth_service::AuthService;
use homelink_app::services::user_service::UserService;
use homelink_app::state_store::StateStore;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DbConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let user_repo = Arc::new(SqliteUserRepository::new(db.pool().clone()));

    // Services
    let user_service = UserService::new(Arc::clone(&user_repo));
    if config.auth.admin_password.is_empty() {
        tracing::warn!("auth.admin_password is empty, skipping admin seeding");
    } else {
        user_service
            .seed_admin(&config.auth.admin_username, &config.auth.admin_password)
            .await?;
    }
    let auth_service = AuthService::new(
        user_repo,
        config.auth.token_secret.as_bytes(),
        chrono::Duration::hours(config.auth.token_ttl_hours),
    );

    // State-sync core
    let topics = Arc::new(config.topic_map()?);
    let store = Arc::new(StateStore::new(&topics));
    let fanout = Arc::new(StateBroadcaster::new(256));
    let decay = Arc::new(DecayScheduler::new(
        Duration::from_secs(config.decay.window_secs),
        Arc::clone(&store),
        Arc::clone(&fanout),
    ));

    // Transport
    let (link, link_events, _driver) = MqttLink::connect(&config.mqtt, topics.subscriptions());
    let pipeline = IngestPipeline::new(
        Arc::clone(&topics),
        Arc::clone(&store),
        Arc::clone(&decay),
        Arc::clone(&fanout),
    );
    tokio::spawn(pipeline.run(link_events));

    let dispatcher = CommandDispatcher::new(topics, link);

    // HTTP
    let state = AppState::new(store, fanout, dispatcher, auth_service, user_service);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, mqtt_broker = %config.mqtt.host, "homelinkd listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // No decay timer may fire into a torn-down store.
    decay.shutdown();
    tracing::info!("homelinkd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install sigterm handler");
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
    tracing::info!("shutdown signal received");
}
