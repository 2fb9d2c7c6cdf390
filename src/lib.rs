pub mod commands;
pub mod config;
pub mod db;
pub mod dom;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod navigation;
pub mod render;
pub mod shell;
pub mod store;
pub mod types;
pub mod views;

use anyhow::Context;
use clap::Parser;

use crate::commands::App;
use crate::config::{Args, Config};
use crate::db::{BookmarkStorage, MemoryBookmarkStorage, SqliteBookmarkStorage};
use crate::gateway::HttpGateway;
use crate::store::RecipeStore;

pub fn run() {
    // Only log WARN and above in production; stdout belongs to the shell.
    #[cfg(debug_assertions)]
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    #[cfg(not(debug_assertions))]
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let args = Args::parse();

    // One thread: store operations are serialized by `&mut` access anyway.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("error while building the tokio runtime");

    if let Err(e) = runtime.block_on(start(args)) {
        eprintln!("recipe-lookup: {e:#}");
        std::process::exit(1);
    }
}

/// Wire configuration, gateway, storage and views together, then hand over
/// to the interactive shell.
pub async fn start(args: Args) -> anyhow::Result<()> {
    let config = Config::from_args(args)?;
    let gateway = HttpGateway::new(&config)?;

    let storage: Box<dyn BookmarkStorage> = match &config.db_path {
        Some(path) => Box::new(SqliteBookmarkStorage::open(path)?),
        None => {
            tracing::info!("bookmarks will not be persisted");
            Box::new(MemoryBookmarkStorage::new())
        }
    };

    let store = RecipeStore::new(gateway, storage, config.results_per_page)
        .context("loading bookmarks")?;
    tracing::info!(
        "store ready with {} bookmark(s), api at {}",
        store.bookmarks().len(),
        config.api_url
    );

    let mut app = App::new(store);
    app.control_bookmarks();
    shell::run_shell(&mut app).await
}
