// Disclosure Watch - Web Server
// REST API with Axum over the disclosure documents and the comment store

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use disclosure_watch::api::{self, AppState};
use disclosure_watch::{comments, logging, Config};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let config = Config::from_env();

    info!(data_dir = ?config.data_dir, "loading disclosure sources");
    let sources = api::load_sources(&config).await;
    if sources.is_empty() {
        warn!("no disclosure data loaded; every list will be empty");
    }

    let engine = config.rule_engine()?;
    info!(rules = engine.rule_count(), "classification rules ready");

    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open comment database: {:?}", config.db_path))?;
    comments::setup_comments(&conn)?;
    info!(db = ?config.db_path, "comment store ready");

    let state = AppState::new(sources, engine, conn);

    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/members", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    api::serve(&config, state).await
}
