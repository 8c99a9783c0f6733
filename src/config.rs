use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub mcp: McpConfig,
    #[serde(default = "default_devices")]
    pub devices: Vec<DeviceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "127.0.0.1".into()
}

fn default_api_port() -> u16 {
    1234
}

/// Identity reported to clients in the `initialize` handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default = "default_server_name")]
    pub server_name: String,
    #[serde(default = "default_server_version")]
    pub server_version: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            server_version: default_server_version(),
        }
    }
}

fn default_server_name() -> String {
    "vanilla-mcp".into()
}

fn default_server_version() -> String {
    "1.0.0".into()
}

/// Seed entry for the in-memory device backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
    pub room: String,
    pub model: String,
    pub volume: i32,
}

fn default_devices() -> Vec<DeviceConfig> {
    vec![
        DeviceConfig {
            id: "1".into(),
            name: "Living Room".into(),
            room: "Living Room".into(),
            model: "Soundbar".into(),
            volume: 25,
        },
        DeviceConfig {
            id: "2".into(),
            name: "Kitchen".into(),
            room: "Kitchen".into(),
            model: "Speaker".into(),
            volume: 40,
        },
        DeviceConfig {
            id: "3".into(),
            name: "Bedroom".into(),
            room: "Bedroom".into(),
            model: "Speaker".into(),
            volume: 15,
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            mcp: McpConfig::default(),
            devices: default_devices(),
        }
    }
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml(&raw)?;
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    /// Resolve the config location from `APP_CONFIG`. Without an explicit path
    /// a missing default file falls back to built-in defaults.
    pub fn load_from_env() -> Result<Self, anyhow::Error> {
        match std::env::var("APP_CONFIG") {
            Ok(path) => Self::load(path),
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load(DEFAULT_CONFIG_PATH),
            Err(_) => {
                let mut cfg = Self::default();
                cfg.apply_env_overrides()?;
                Ok(cfg)
            }
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, anyhow::Error> {
        let expanded = expand_env_placeholders(raw)?;
        let cfg: Self = serde_yaml::from_str(&expanded)?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<(), anyhow::Error> {
        use anyhow::Context;

        if let Ok(host) = std::env::var("API_HOST") {
            self.api.host = host;
        }

        if let Ok(port) = std::env::var("API_PORT") {
            self.api.port = port
                .parse()
                .with_context(|| format!("invalid API_PORT: {}", port))?;
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
fn expand_env_placeholders(input: &str) -> Result<String, anyhow::Error> {
    use anyhow::Context;

    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let close = match it.peek().copied() {
            Some('$') => {
                // "$$" -> "$"
                it.next();
                out.push('$');
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                continue;
            }
        };

        it.next();
        let var = read_until(&mut it, close)
            .with_context(|| format!("unterminated env placeholder: missing '{}'", close))?;
        let val = std::env::var(&var)
            .with_context(|| format!("missing environment variable: {}", var))?;
        out.push_str(&val);
    }

    Ok(out)
}

fn read_until<I>(it: &mut std::iter::Peekable<I>, end: char) -> Option<String>
where
    I: Iterator<Item = char>,
{
    let mut buf = String::new();
    for ch in it.by_ref() {
        if ch == end {
            return Some(buf);
        }
        buf.push(ch);
    }
    None
}
