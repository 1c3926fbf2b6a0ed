use std::sync::Arc;

use task_scheduler::{AppConfig, SqliteTaskStore, http_api};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("task_scheduler=info,http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let store = SqliteTaskStore::new(&config.db_file)?;
    tracing::info!(db = %config.db_file.display(), "task store opened");

    let state = http_api::AppState::new(Arc::new(store)).with_task_limit(config.task_limit);
    let addr = config.listen_addr();
    tracing::info!(%addr, "task scheduler HTTP API listening");
    http_api::serve(addr, state).await?;
    Ok(())
}
