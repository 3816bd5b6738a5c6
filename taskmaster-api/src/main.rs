//! # TaskMaster API Server
//!
//! A task-management REST API: user accounts with JWT session tokens,
//! per-user categories and tasks, and a password-reset flow over email.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskmaster-api
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskmaster_api::{
    app::{build_router, AppState},
    config::Config,
    mailer::{LogMailer, Mailer, SmtpMailer},
};
use taskmaster_shared::{
    auth::revocation::{PgRevocationStore, RevocationStore},
    db,
    models::user::User,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often the maintenance task prunes expired revocations and reset
/// tokens
const PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskmaster_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "TaskMaster API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    db::ensure_database_exists(&config.database.url).await?;

    let pool = db::create_pool(db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::run_migrations(&pool).await?;

    let revocation: Arc<dyn RevocationStore> = Arc::new(PgRevocationStore::new(pool.clone()));

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail_config) => match SmtpMailer::new(mail_config) {
            Ok(smtp) => Arc::new(smtp),
            Err(e) => {
                warn!("SMTP configuration invalid ({}), falling back to log-only mail", e);
                Arc::new(LogMailer::new())
            }
        },
        None => {
            warn!("SMTP not configured, password-reset mail will only be logged");
            Arc::new(LogMailer::new())
        }
    };

    // Periodic garbage collection: expired revocation rows and expired
    // reset tokens
    {
        let pool = pool.clone();
        let revocation = revocation.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PRUNE_INTERVAL);
            loop {
                interval.tick().await;
                let now = chrono::Utc::now();

                match revocation.prune(now).await {
                    Ok(pruned) if pruned > 0 => {
                        info!(pruned, "Pruned expired revocation entries")
                    }
                    Ok(_) => {}
                    Err(e) => error!("Failed to prune revocation entries: {}", e),
                }

                match User::clear_expired_reset_tokens(&pool, now).await {
                    Ok(cleared) if cleared > 0 => {
                        info!(cleared, "Cleared expired reset tokens")
                    }
                    Ok(_) => {}
                    Err(e) => error!("Failed to clear expired reset tokens: {}", e),
                }
            }
        });
    }

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config, revocation, mailer);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
