use anyhow::Result;
use serde::Deserialize;
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};

pub const DEFAULT_ALERTS_URL: &str = "https://alerts.via.world/alerts";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub alerts: Alerts,
    #[serde(default)]
    pub exchanges: Exchanges,
    pub markets: Markets,
}

#[derive(Debug, Clone)]
pub struct Alerts {
    pub url: String,
    pub token: Option<Token>,
    pub default_expiration: Option<u64>,
    pub default_cooldown: Option<u64>,
    pub default_cancel_after_trigger: bool,
    pub default_send_sms: bool,
    pub default_send_email: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Exchanges {
    #[serde(default)]
    pub codes: HashMap<String, String>,
    #[serde(default = "default_backwards")]
    pub backwards: HashSet<String>,
}

impl Default for Exchanges {
    fn default() -> Self {
        Self {
            codes: HashMap::new(),
            backwards: default_backwards(),
        }
    }
}

fn default_backwards() -> HashSet<String> {
    HashSet::from(["POLONIEX".to_string()])
}

/// Bearer token, given inline or named by an environment variable read on use
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Value(String),
    Env(String),
}

impl Token {
    pub fn resolve(&self) -> Result<String> {
        match self {
            Token::Value(token) => Ok(token.clone()),
            Token::Env(var) => std::env::var(var).map_err(|e| {
                anyhow::anyhow!("Failed to read token from environment variable {}: {}", var, e)
            }),
        }
    }
}

/// Where the market catalog is loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum Markets {
    File(PathBuf),
    Url(String),
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from file");

        let config = std::fs::read_to_string(path)?;
        let config = Self::parse(&config)?;

        Ok(match path.parent() {
            Some(dir) => config.relative_to(dir),
            None => config,
        })
    }

    /// Resolve a relative market catalog path against the config file's directory
    pub fn relative_to(mut self, dir: &Path) -> Self {
        if let Markets::File(file) = &self.markets {
            if file.is_relative() {
                self.markets = Markets::File(dir.join(file));
            }
        }

        self
    }

    /// Parse configuration from YAML text
    pub fn parse(config: &str) -> Result<Self> {
        Ok(serde_norway::from_str(config)?)
    }
}

impl Alerts {
    /// Create the alerts section; an inline token wins over `tokenFrom`
    pub fn new(url: Option<String>, token: Option<String>, token_from: Option<String>) -> Self {
        let token = token.map(Token::Value).or(token_from.map(Token::Env));

        Self {
            url: url.unwrap_or_else(|| DEFAULT_ALERTS_URL.to_string()),
            token,
            default_expiration: None,
            default_cooldown: None,
            default_cancel_after_trigger: false,
            default_send_sms: false,
            default_send_email: false,
        }
    }
}

impl<'de> Deserialize<'de> for Alerts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AlertsRaw {
            url: Option<String>,
            token: Option<String>,
            token_from: Option<String>,
            default_expiration: Option<u64>,
            default_cooldown: Option<u64>,
            #[serde(default)]
            default_cancel_after_trigger: bool,
            #[serde(default, rename = "defaultSendSMS")]
            default_send_sms: bool,
            #[serde(default)]
            default_send_email: bool,
        }

        let raw = AlertsRaw::deserialize(deserializer)?;
        let alerts = Alerts::new(raw.url, raw.token, raw.token_from);

        Ok(Self {
            default_expiration: raw.default_expiration,
            default_cooldown: raw.default_cooldown,
            default_cancel_after_trigger: raw.default_cancel_after_trigger,
            default_send_sms: raw.default_send_sms,
            default_send_email: raw.default_send_email,
            ..alerts
        })
    }
}

impl<'de> Deserialize<'de> for Markets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct MarketsRaw {
            file: Option<PathBuf>,
            url: Option<String>,
        }

        match MarketsRaw::deserialize(deserializer)? {
            MarketsRaw {
                file: Some(file),
                url: None,
            } => Ok(Markets::File(file)),
            MarketsRaw {
                file: None,
                url: Some(url),
            } => Ok(Markets::Url(url)),
            _ => Err(serde::de::Error::custom(
                "markets requires exactly one of `file` or `url`",
            )),
        }
    }
}
