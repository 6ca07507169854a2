//! `canopy-worker` — campaign job worker daemon.
//!
//! Polls the shared `jobs` table, runs the matching campaign script,
//! and writes the outcome back. Stop with an interrupt signal; the
//! current job finishes its cycle before the loop exits.

use canopy_worker::config::WorkerConfig;
use canopy_worker::poll;

use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canopy_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    let pool = canopy_db::create_pool(&config.database_url).await?;
    canopy_db::health_check(&pool).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received; stopping after the current cycle");
            let _ = shutdown_tx.send(true);
        }
    });

    poll::run(pool, config, shutdown_rx).await;
    Ok(())
}
