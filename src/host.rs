use crate::{alerts::model::AlertDefaults, config::Config, markets::MarketCatalog};
use serde_json::Value;

pub const DEFAULT_EXPIRATION: &str = "alerts.defaultExpiration";
pub const DEFAULT_COOLDOWN: &str = "alerts.defaultCooldown";
pub const DEFAULT_CANCEL_AFTER_TRIGGER: &str = "alerts.defaultCancelAfterTrigger";
pub const DEFAULT_SEND_SMS: &str = "alerts.defaultSendSMS";
pub const DEFAULT_SEND_EMAIL: &str = "alerts.defaultSendEmail";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
    Success,
}

/// Services the importer borrows from its environment
pub trait Host {
    /// Surface a message to the user
    fn log(&self, severity: Severity, message: &str, detail: Option<&str>);

    /// Read a configuration value by its dotted key
    fn get_config(&self, key: &str) -> Option<Value>;

    /// Bearer token of the current session
    fn current_token(&self) -> Option<String>;

    /// Whether the market id exists on the platform
    fn lookup_market(&self, id: &str) -> bool;
}

impl AlertDefaults {
    /// Read the configured defaults; unset flags are off and unset durations are null
    pub fn from_host<H: Host + ?Sized>(host: &H) -> Self {
        let number = |key| host.get_config(key).and_then(|v| v.as_u64());
        let flag = |key| {
            host.get_config(key)
                .and_then(|v| v.as_bool())
                .unwrap_or(false)
        };

        Self {
            expires: number(DEFAULT_EXPIRATION),
            cooldown: number(DEFAULT_COOLDOWN),
            kill: flag(DEFAULT_CANCEL_AFTER_TRIGGER),
            sms: flag(DEFAULT_SEND_SMS),
            email: flag(DEFAULT_SEND_EMAIL),
        }
    }
}

/// Host backed by the configuration file, a loaded catalog and `tracing`
pub struct ConfigHost {
    config: Config,
    markets: MarketCatalog,
}

impl ConfigHost {
    pub fn new(config: Config, markets: MarketCatalog) -> Self {
        Self { config, markets }
    }
}

impl Host for ConfigHost {
    fn log(&self, severity: Severity, message: &str, detail: Option<&str>) {
        let detail = detail.unwrap_or_default();

        match severity {
            Severity::Info | Severity::Success => tracing::info!(detail, "{}", message),
            Severity::Warn => tracing::warn!(detail, "{}", message),
            Severity::Error => tracing::error!(detail, "{}", message),
        }
    }

    fn get_config(&self, key: &str) -> Option<Value> {
        let alerts = &self.config.alerts;

        match key {
            DEFAULT_EXPIRATION => alerts.default_expiration.map(Value::from),
            DEFAULT_COOLDOWN => alerts.default_cooldown.map(Value::from),
            DEFAULT_CANCEL_AFTER_TRIGGER => Some(alerts.default_cancel_after_trigger.into()),
            DEFAULT_SEND_SMS => Some(alerts.default_send_sms.into()),
            DEFAULT_SEND_EMAIL => Some(alerts.default_send_email.into()),
            _ => None,
        }
    }

    fn current_token(&self) -> Option<String> {
        let token = match self.config.alerts.token.as_ref()?.resolve() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("{}", e);
                return None;
            }
        };

        (!token.trim().is_empty()).then_some(token)
    }

    fn lookup_market(&self, id: &str) -> bool {
        self.markets.contains(id)
    }
}
