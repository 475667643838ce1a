use std::path::{Path, PathBuf};
use std::time::Duration;

use ratatui::style::{Color, ParseColorError};
use serde::Deserialize;

pub const MIN_INTERVAL_MS: u64 = 100;

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Base URL of the status daemon; `/api/status` is appended.
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 5000,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct PollingConfig {
    pub interval_ms: u64,
    /// Drop completions older than the newest one already shown.
    pub discard_stale: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 3000,
            discard_stale: true,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS))
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Labels {
    pub online: String,
    pub offline: String,
    pub connection_failed: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            online: "online".to_string(),
            offline: "offline".to_string(),
            connection_failed: "connection failed".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Theme {
    pub accent: Color,
    pub online: Color,
    pub offline: Color,
    pub dim: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            online: Color::Green,
            offline: Color::Red,
            dim: Color::DarkGray,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(|| {
            dirs::data_local_dir().map(|d| d.join("statusdash").join("statusdash.log"))
        })
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub polling: PollingConfig,
    pub labels: Labels,
    pub theme: Theme,
    pub logging: LoggingConfig,
    /// Problems found while loading; logged once logging is up.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("statusdash").join("config.toml"))
    }

    /// Load `path`, or the default location when `None`. A missing file
    /// means defaults; an unreadable or invalid one means defaults plus a
    /// warning.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(p) => p,
            None => return Self::default(),
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                let mut config = Self::default();
                config
                    .warnings
                    .push(format!("cannot read config at {}: {}", path.display(), e));
                return config;
            }
        };

        match toml::from_str::<RawConfig>(&content) {
            Ok(raw) => Self::from_raw(raw),
            Err(e) => {
                let mut config = Self::default();
                config
                    .warnings
                    .push(format!("invalid config at {}: {}", path.display(), e));
                config
            }
        }
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self::default();

        if let Some(s) = raw.server {
            if let Some(v) = s.url {
                config.server.url = v;
            }
            if let Some(v) = s.timeout_ms {
                config.server.timeout_ms = v;
            }
        }

        if let Some(p) = raw.polling {
            if let Some(v) = p.interval_ms {
                if v < MIN_INTERVAL_MS {
                    config.warnings.push(format!(
                        "polling.interval_ms = {} is below {}ms, clamping",
                        v, MIN_INTERVAL_MS
                    ));
                }
                config.polling.interval_ms = v.max(MIN_INTERVAL_MS);
            }
            if let Some(v) = p.discard_stale {
                config.polling.discard_stale = v;
            }
        }

        if let Some(l) = raw.labels {
            if let Some(v) = l.online {
                config.labels.online = v;
            }
            if let Some(v) = l.offline {
                config.labels.offline = v;
            }
            if let Some(v) = l.connection_failed {
                config.labels.connection_failed = v;
            }
        }

        if let Some(t) = raw.theme {
            let slots = [
                ("accent", t.accent, &mut config.theme.accent),
                ("online", t.online, &mut config.theme.online),
                ("offline", t.offline, &mut config.theme.offline),
                ("dim", t.dim, &mut config.theme.dim),
            ];
            for (name, value, slot) in slots {
                let Some(s) = value else { continue };
                match parse_color(&s) {
                    Ok(c) => *slot = c,
                    Err(_) => config
                        .warnings
                        .push(format!("theme.{}: unknown color '{}'", name, s)),
                }
            }
        }

        if let Some(l) = raw.logging {
            if let Some(v) = l.file {
                config.logging.file = Some(v);
            }
            if let Some(v) = l.level {
                config.logging.level = v;
            }
        }

        config
    }
}

// ---------------------------------------------------------------------------
// Raw TOML structs (all-optional for merge)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RawConfig {
    server: Option<RawServer>,
    polling: Option<RawPolling>,
    labels: Option<RawLabels>,
    theme: Option<RawTheme>,
    logging: Option<RawLogging>,
}

#[derive(Deserialize, Default)]
struct RawServer {
    url: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Deserialize, Default)]
struct RawPolling {
    interval_ms: Option<u64>,
    discard_stale: Option<bool>,
}

#[derive(Deserialize, Default)]
struct RawLabels {
    online: Option<String>,
    offline: Option<String>,
    connection_failed: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawTheme {
    accent: Option<String>,
    online: Option<String>,
    offline: Option<String>,
    dim: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawLogging {
    file: Option<PathBuf>,
    level: Option<String>,
}

// ---------------------------------------------------------------------------
// Theme colors
// ---------------------------------------------------------------------------

/// A theme color: an ANSI name (`"cyan"`, `"darkgray"`), a 256-color index
/// (`"244"`) or `"#rrggbb"`. Case, spaces, dashes and underscores in names
/// don't matter.
pub fn parse_color(s: &str) -> Result<Color, ParseColorError> {
    s.trim().parse()
}
