use std::error::Error;
use std::io::BufRead;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plug_api::auth::password::hash_password;
use plug_api::config::ServerConfig;
use plug_api::router::build_app_router;
use plug_api::state::AppState;
use plug_api::uploads::LocalUploadStore;
use plug_core::catalog::builtin_descriptors;
use plug_core::schema::SchemaRegistry;
use plug_db::store::PgRecordStore;
use plug_events::delivery::Notifier;
use plug_events::{EmailConfig, EmailDelivery, EventBus, NotificationDispatcher};

/// How long background tasks get to drain after the server stops.
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    // `plug-api hash-password [PASSWORD]` prints a value for ADMIN_PASSWORD_HASH.
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("hash-password") {
        let password = match args.next() {
            Some(password) => password,
            None => read_password_line()?,
        };
        let hash = hash_password(&password).map_err(|e| format!("Failed to hash password: {e}"))?;
        println!("{hash}");
        return Ok(());
    }

    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env()?;
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let registry = SchemaRegistry::new(builtin_descriptors())?;
    tracing::info!(entities = registry.descriptors().count(), "Schema registry loaded");

    // --- Database ---
    let pool = plug_db::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    plug_db::health_check(&pool).await?;
    tracing::info!("Database health check passed");

    plug_db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let notifier = match EmailConfig::from_env() {
        Some(email) => {
            tracing::info!(smtp_host = %email.smtp_host, "Approval emails enabled");
            Some(Arc::new(EmailDelivery::new(email)) as Arc<dyn Notifier>)
        }
        None => {
            tracing::info!("SMTP_HOST not set, approval emails disabled");
            None
        }
    };
    let dispatcher_handle =
        tokio::spawn(NotificationDispatcher::new(notifier).run(event_bus.subscribe()));

    // --- App state ---
    let state = AppState {
        pool: pool.clone(),
        store: Arc::new(PgRecordStore::new(pool)),
        registry: Arc::new(registry),
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        uploads: Arc::new(LocalUploadStore::new(config.uploads.dir.clone())),
    };

    let app = build_app_router(state, &config)?;

    // --- Start server ---
    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Dropping the last sender closes the channel and ends the dispatcher.
    drop(event_bus);
    if tokio::time::timeout(SHUTDOWN_DRAIN, dispatcher_handle)
        .await
        .is_err()
    {
        tracing::warn!("Notification dispatcher did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// `RUST_LOG` filter (default `plug_api=debug,tower_http=debug`); JSON
/// output when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "plug_api=debug,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn read_password_line() -> Result<String, Box<dyn Error>> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err("usage: plug-api hash-password <password> (or pipe it on stdin)".into());
    }
    Ok(password)
}

/// Wait for SIGINT or SIGTERM (on Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
