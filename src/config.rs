//! Application-level configuration loading: serving directory, API prefix and pipeline limits.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "IMAGE_MESH_CONFIG_PATH";

const DEFAULT_PUBLIC_DIR: &str = "public";
/// Prefix API routes are mounted under unless configured otherwise.
pub const DEFAULT_API_PREFIX: &str = "/image-mesh/api";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_FRESH_WINDOW_MINUTES: u16 = 10;
const DEFAULT_WRITE_GRACE_MS: u64 = 5_000;
const DEFAULT_PALETTE_SIZE: usize = 9;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Directory generated files are written to and served from.
    pub public_dir: PathBuf,
    /// Prefix every API route is mounted under.
    pub api_prefix: String,
    /// Upper bound for fetching and reading a source image.
    pub fetch_timeout: Duration,
    /// Files whose minute-of-day is at least this far from now are swept.
    pub fresh_window_minutes: u16,
    /// In-flight writes younger than this are never swept.
    pub write_grace: Duration,
    /// Number of colors requested from the quantizer.
    pub palette_size: usize,
    /// Period of the background sweep, `None` to sweep only on requests.
    pub sweep_interval: Option<Duration>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        public_dir = %app_config.public_dir.display(),
                        api_prefix = %app_config.api_prefix,
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Welcome message served at `/` and at the bare API prefix.
    pub fn welcome_message(&self) -> String {
        format!(
            "API calls will use this path format:{prefix}. Example: {prefix}/get/params",
            prefix = self.api_prefix
        )
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    public_dir: Option<PathBuf>,
    api_prefix: Option<String>,
    fetch_timeout_ms: Option<u64>,
    fresh_window_minutes: Option<u16>,
    write_grace_ms: Option<u64>,
    palette_size: Option<usize>,
    sweep_interval_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let api_prefix = value
            .api_prefix
            .map(|prefix| normalize_prefix(&prefix))
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_owned());

        Self {
            public_dir: value
                .public_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR)),
            api_prefix,
            fetch_timeout: Duration::from_millis(
                value.fetch_timeout_ms.unwrap_or(DEFAULT_FETCH_TIMEOUT_MS),
            ),
            fresh_window_minutes: value
                .fresh_window_minutes
                .unwrap_or(DEFAULT_FRESH_WINDOW_MINUTES),
            write_grace: Duration::from_millis(
                value.write_grace_ms.unwrap_or(DEFAULT_WRITE_GRACE_MS),
            ),
            palette_size: value.palette_size.unwrap_or(DEFAULT_PALETTE_SIZE).max(1),
            sweep_interval: value
                .sweep_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// Ensure a single leading slash and no trailing slash.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_PREFIX.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
