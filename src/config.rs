//! Optional config file loading. Search order: ./ao3scrape.toml, then
//! $XDG_CONFIG_HOME/ao3scrape/config.toml (or ~/.config/ao3scrape/config.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file contents. All fields optional; command-line flags win over present keys.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", default, deny_unknown_fields)]
pub struct Config {
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Proxy for every request, e.g. "http://127.0.0.1:8080" or "socks5://host:1080".
    pub proxy_url: Option<String>,
    /// Default output format: json, markdown or text.
    pub format: Option<String>,
}

/// Candidate config paths in search order.
pub fn config_paths() -> Result<Vec<PathBuf>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("ao3scrape.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("ao3scrape").join("config.toml"));
    }
    Ok(paths)
}

/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    load_first(&config_paths()?)
}

/// Load the first existing file among `paths`; later paths are not consulted.
pub fn load_first(paths: &[PathBuf]) -> Result<Option<Config>, String> {
    for path in paths {
        if path.exists() {
            return read_config(path).map(Some);
        }
    }
    Ok(None)
}

fn read_config(path: &Path) -> Result<Config, String> {
    let s = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
    toml::from_str(&s).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
}
