use crate::cli::CliArgs;
use crate::poll::PollIntervals;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:9090/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub source: Option<String>,
    pub api_url: String,
    pub mock: bool,
    pub fallback_to_mock: bool,
    pub request_timeout: Duration,
    pub credentials: Option<Credentials>,
    pub poll: PollIntervals,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            source: None,
            api_url: DEFAULT_API_URL.to_string(),
            mock: false,
            fallback_to_mock: false,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            credentials: None,
            poll: PollIntervals::default(),
        }
    }
}

impl RuntimeConfig {
    /// Command line flags win over the config file.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(api_url) = args.api_url.as_deref()
            && !api_url.trim().is_empty()
        {
            self.api_url = api_url.trim().to_string();
        }
        if args.mock {
            self.mock = true;
        }
        if args.fallback_to_mock {
            self.fallback_to_mock = true;
        }
    }

    /// Whether a reload changed anything beyond the poll intervals.
    pub fn requires_restart(&self, other: &RuntimeConfig) -> bool {
        self.api_url != other.api_url
            || self.mock != other.mock
            || self.fallback_to_mock != other.fallback_to_mock
            || self.request_timeout != other.request_timeout
            || self.credentials != other.credentials
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfigWatcher {
    path: Option<PathBuf>,
    pinned: bool,
    modified: Option<SystemTime>,
    missing: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct DokuConfigFile {
    #[serde(alias = "api", alias = "url")]
    api_url: Option<String>,
    mock: Option<bool>,
    fallback_to_mock: Option<bool>,
    #[serde(alias = "timeout", alias = "timeout_secs")]
    request_timeout_secs: Option<u64>,
    username: Option<String>,
    password: Option<String>,
    poll: PollSpec,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct PollSpec {
    #[serde(alias = "dashboard")]
    dashboard_secs: Option<u64>,
    #[serde(alias = "resources")]
    resources_secs: Option<u64>,
    #[serde(alias = "ping")]
    ping_secs: Option<u64>,
}

impl RuntimeConfigWatcher {
    pub fn discover() -> Self {
        Self {
            path: discover_config_path(),
            pinned: false,
            modified: None,
            missing: false,
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            pinned: true,
            modified: None,
            missing: false,
        }
    }

    pub fn load_current(&mut self) -> Result<RuntimeConfig> {
        let Some(path) = self.path.clone() else {
            return Ok(RuntimeConfig::default());
        };

        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read runtime config {}", path.display()))?;
        let mut config = parse_config(&raw)
            .with_context(|| format!("failed to parse runtime config {}", path.display()))?;
        self.modified = fs::metadata(&path)
            .ok()
            .and_then(|meta| meta.modified().ok());
        self.missing = false;
        config.source = Some(path.display().to_string());
        Ok(config)
    }

    pub fn reload_if_changed(&mut self) -> Result<Option<RuntimeConfig>> {
        let Some(current_path) = self.path.clone() else {
            if self.pinned {
                return Ok(None);
            }
            self.path = discover_config_path();
            if self.path.is_some() {
                return self.load_current().map(Some);
            }
            return Ok(None);
        };

        if !current_path.exists() {
            self.modified = None;
            if !self.pinned {
                self.path = discover_config_path();
                if self.path.is_some() {
                    return self.load_current().map(Some);
                }
            }
            // Report the removal once; later ticks stay quiet until it returns.
            if self.missing {
                return Ok(None);
            }
            self.missing = true;
            return Ok(Some(RuntimeConfig::default()));
        }

        let modified = fs::metadata(&current_path)
            .ok()
            .and_then(|meta| meta.modified().ok());
        if modified != self.modified {
            return self.load_current().map(Some);
        }

        Ok(None)
    }
}

fn parse_config(raw: &str) -> Result<RuntimeConfig> {
    let parsed: DokuConfigFile = if raw.trim().is_empty() {
        DokuConfigFile::default()
    } else {
        serde_yaml::from_str(raw)?
    };

    let defaults = PollIntervals::default();
    let seconds = |value: Option<u64>, fallback: Duration| {
        value
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or(fallback)
    };

    Ok(RuntimeConfig {
        source: None,
        api_url: parsed
            .api_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        mock: parsed.mock.unwrap_or(false),
        fallback_to_mock: parsed.fallback_to_mock.unwrap_or(false),
        request_timeout: Duration::from_secs(
            parsed
                .request_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .max(1),
        ),
        credentials: parsed
            .username
            .filter(|username| !username.trim().is_empty())
            .map(|username| Credentials {
                username,
                password: parsed.password,
            }),
        poll: PollIntervals {
            dashboard: seconds(parsed.poll.dashboard_secs, defaults.dashboard),
            resources: seconds(parsed.poll.resources_secs, defaults.resources),
            ping: seconds(parsed.poll.ping_secs, defaults.ping),
        },
    })
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("DOKU_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("doku.yaml"),
        PathBuf::from("doku.yml"),
        PathBuf::from(".doku.yaml"),
    ];
    if let Some(found) = cwd_candidates.into_iter().find(|candidate| candidate.exists()) {
        return Some(found);
    }

    let home = std::env::var("HOME").ok()?;
    [
        PathBuf::from(&home).join(".config/doku/config.yaml"),
        PathBuf::from(&home).join(".config/doku/config.yml"),
        PathBuf::from(&home).join(".doku.yaml"),
    ]
    .into_iter()
    .find(|candidate| candidate.exists())
}
