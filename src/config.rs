use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        search_url: get_env_or_default("SEARCH_URL", DEFAULT_SEARCH_URL),
        search_region: get_env_or_default("SEARCH_REGION", DEFAULT_SEARCH_REGION),
        fetch_timeout: Duration::from_secs(get_env_parsed_or_default(
            "FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )),
        user_agent: get_env_or_default("USER_AGENT", DEFAULT_USER_AGENT),
        morph_dict_path: PathBuf::from(get_env_or_default("MORPH_DICT_PATH", DEFAULT_DICT_PATH)),
        morph_links_path: env::var("MORPH_LINKS_PATH").ok().map(PathBuf::from),
        exclusions_path: env::var("EXCLUSIONS_PATH").ok().map(PathBuf::from),
        assets_dir: PathBuf::from(get_env_or_default("ASSETS_DIR", ".")),
    }
});

pub const DEFAULT_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_SEARCH_REGION: &str = "ru-ru";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_DICT_PATH: &str = "data/dict.opcorpora.txt";
pub const DEFAULT_USER_AGENT: &str = concat!("lemmacloud/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct Config {
    pub search_url: String,
    pub search_region: String,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    pub morph_dict_path: PathBuf,
    /// OpenCorpora link triples (`FROM TO TYPE`) pairing short and full adjectives.
    pub morph_links_path: Option<PathBuf>,
    /// Extra domain-irrelevance lemmas, one per line.
    pub exclusions_path: Option<PathBuf>,
    /// Root for `fonts/` and `masks/`.
    pub assets_dir: PathBuf,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_parsed_or_default<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("invalid value {raw:?} for {key}, falling back to {default}");
            default
        }),
        Err(_) => default,
    }
}
