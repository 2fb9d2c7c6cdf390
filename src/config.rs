use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

/// Recipe catalog endpoint. Ids and query strings are appended to it.
pub const API_URL: &str = "https://forkify-api.herokuapp.com/api/v2/recipes/";

/// How long a single network call may take before it loses the race.
pub const TIMEOUT: Duration = Duration::from_secs(10);

pub const RESULTS_PER_PAGE: usize = 10;

/// How long the upload window stays open after a successful submission.
pub const MODAL_CLOSE: Duration = Duration::from_millis(2500);

/// Name of the single durable entry holding the bookmark collection.
pub const BOOKMARKS_KEY: &str = "bookmarks";

/// File name of the SQLite store inside the data directory.
pub const DB_FILE: &str = "recipes.sqlite";

#[derive(Debug, Clone, Parser)]
#[command(name = "recipe-lookup", version, about = "Search, scale and bookmark recipes from the terminal")]
pub struct Args {
    /// Base URL of the recipe API.
    #[arg(long, env = "RECIPES_API_URL", default_value = API_URL)]
    pub api_url: String,

    /// API key, sent with every request. Required to submit recipes.
    #[arg(long, env = "RECIPES_API_KEY")]
    pub api_key: Option<String>,

    /// Directory holding the bookmark database.
    #[arg(long, env = "RECIPES_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, default_value_t = TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    #[arg(long, default_value_t = RESULTS_PER_PAGE)]
    pub results_per_page: usize,

    /// Keep bookmarks in memory only.
    #[arg(long)]
    pub in_memory: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_key: Option<String>,
    /// None means bookmarks are not persisted.
    pub db_path: Option<PathBuf>,
    pub timeout: Duration,
    pub results_per_page: usize,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.timeout_secs == 0 {
            bail!("--timeout-secs must be positive");
        }
        if args.results_per_page == 0 {
            bail!("--results-per-page must be positive");
        }
        let mut api_url = args.api_url;
        if !api_url.ends_with('/') {
            api_url.push('/');
        }
        let db_path = if args.in_memory {
            None
        } else {
            let dir = args.data_dir.or_else(default_data_dir);
            match dir {
                Some(dir) => Some(dir.join(DB_FILE)),
                None => bail!("no data directory found; pass --data-dir or --in-memory"),
            }
        };
        Ok(Self {
            api_url,
            api_key: args.api_key.filter(|k| !k.trim().is_empty()),
            db_path,
            timeout: Duration::from_secs(args.timeout_secs),
            results_per_page: args.results_per_page,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            api_key: None,
            db_path: None,
            timeout: TIMEOUT,
            results_per_page: RESULTS_PER_PAGE,
        }
    }
}

/// Per-user application data directory. Falls back to None when the usual
/// environment variables are missing.
pub fn default_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        if let Ok(app_data) = std::env::var("APPDATA") {
            return Some(PathBuf::from(app_data).join("recipe-lookup"));
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return Some(PathBuf::from(xdg).join("recipe-lookup"));
            }
        }
        if let Ok(home) = std::env::var("HOME") {
            return Some(PathBuf::from(home).join(".local/share/recipe-lookup"));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("recipe-lookup").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_in_memory_config_has_no_db_path() {
        let config = Config::from_args(parse(&["--in-memory", "--api-url", "http://localhost:8080/api"])).unwrap();
        assert!(config.db_path.is_none());
        assert_eq!(config.api_url, "http://localhost:8080/api/");
        assert_eq!(config.results_per_page, RESULTS_PER_PAGE);
    }

    #[test]
    fn test_data_dir_flag_selects_db_file() {
        let config = Config::from_args(parse(&["--data-dir", "/tmp/recipes"])).unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/recipes").join(DB_FILE)));
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(Config::from_args(parse(&["--in-memory", "--results-per-page", "0"])).is_err());
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let config = Config::from_args(parse(&["--in-memory", "--api-key", "  "])).unwrap();
        assert!(config.api_key.is_none());
    }
}
