// Configuration loading and parsing (ctfboard.toml, credentials.toml).

use std::path::{Path, PathBuf};
use std::time::Duration;

use ctfboard_core::source::{Auth, Route};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub ctfd: CtfdConfig,
    pub poll: PollConfig,
    pub proxy: ProxyConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// ctfboard.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire ctfboard.toml file.
#[derive(Debug, Clone, Deserialize)]
struct BoardFile {
    ctfd: CtfdConfig,
    poll: PollConfig,
    proxy: ProxyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CtfdConfig {
    pub base_url: String,
    #[serde(default)]
    pub route: RouteKind,
    #[serde(default)]
    pub proxy_url: Option<String>,
    #[serde(default)]
    pub auth: AuthKind,
    /// 0 means no client-side timeout.
    #[serde(default)]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    #[default]
    Direct,
    Proxy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    #[default]
    None,
    Token,
    Cookie,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    pub interval_secs: u64,
    #[serde(default = "default_true")]
    pub fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub port: u16,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub api_token: Option<String>,
    pub session_cookie: Option<String>,
}

impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "***"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Derived settings
// ---------------------------------------------------------------------------

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.ctfd.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Route the poller uses to reach the platform.
    pub fn route(&self) -> Route {
        match self.ctfd.route {
            RouteKind::Direct => self.direct_route(),
            RouteKind::Proxy => Route::Proxy {
                url: self.ctfd.proxy_url.clone().unwrap_or_default(),
            },
        }
    }

    /// Route straight to the platform. The local proxy always forwards this
    /// way, whatever the poller uses.
    pub fn direct_route(&self) -> Route {
        Route::Direct {
            base_url: self.ctfd.base_url.clone(),
        }
    }

    pub fn auth(&self) -> Auth {
        match self.ctfd.auth {
            AuthKind::None => Auth::None,
            AuthKind::Token => Auth::Token(self.credentials.api_token.clone().unwrap_or_default()),
            AuthKind::Cookie => {
                Auth::Cookie(self.credentials.session_cookie.clone().unwrap_or_default())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/ctfboard.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- ctfboard.toml (required) ---
    let board_path = config_dir.join("ctfboard.toml");
    let board_text = read_file(&board_path)?;
    let board_file: BoardFile =
        toml::from_str(&board_text).map_err(|e| ConfigError::ParseError {
            path: board_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        ctfd: board_file.ctfd,
        poll: board_file.poll,
        proxy: board_file.proxy,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the crate directory or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if !is_http_url(&config.ctfd.base_url) {
        return Err(ConfigError::ValidationError {
            field: "ctfd.base_url".into(),
            message: format!("must be an http(s) URL, got {:?}", config.ctfd.base_url),
        });
    }

    if config.ctfd.route == RouteKind::Proxy {
        match config.ctfd.proxy_url.as_deref() {
            Some(url) if is_http_url(url) => {}
            _ => {
                return Err(ConfigError::ValidationError {
                    field: "ctfd.proxy_url".into(),
                    message: "must be an http(s) URL when route = \"proxy\"".into(),
                });
            }
        }
    }

    match config.ctfd.auth {
        AuthKind::Token if is_blank(&config.credentials.api_token) => {
            return Err(ConfigError::ValidationError {
                field: "credentials.api_token".into(),
                message: "required when ctfd.auth = \"token\"".into(),
            });
        }
        AuthKind::Cookie if is_blank(&config.credentials.session_cookie) => {
            return Err(ConfigError::ValidationError {
                field: "credentials.session_cookie".into(),
                message: "required when ctfd.auth = \"cookie\"".into(),
            });
        }
        _ => {}
    }

    if config.poll.interval_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "poll.interval_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.proxy.enabled && config.proxy.port == 0 {
        return Err(ConfigError::ValidationError {
            field: "proxy.port".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
