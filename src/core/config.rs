use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const BILLING_TOKEN_VAR: &str = "COSTWATCH_BILLING_TOKEN";
pub const MAIL_KEY_VAR: &str = "COSTWATCH_SENDGRID_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Missing or empty environment variable: {0}")]
    MissingSecret(String),
}

/// Secrets resolved from the environment once at startup and passed to the
/// clients that need them. Nothing reads the environment mid-computation.
pub struct Credentials {
    pub billing_token: String,
    pub mail_api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            billing_token: require_env(BILLING_TOKEN_VAR)?,
            mail_api_key: require_env(MAIL_KEY_VAR)?,
        })
    }

    /// Resolve only the billing token, for paths that never send mail.
    pub fn billing_token_from_env() -> Result<String, ConfigError> {
        require_env(BILLING_TOKEN_VAR)
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingSecret(name.to_string())),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    "https://ce.us-east-1.amazonaws.com".to_string()
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub sender_email: String,
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Recipients for every day except Monday.
    #[serde(default)]
    pub daily_recipients: Vec<String>,
    /// Recipients for the Monday report.
    #[serde(default)]
    pub weekly_recipients: Vec<String>,
}

fn default_sender_name() -> String {
    "Cost Reports".to_string()
}

fn default_subject() -> String {
    "Daily cloud cost report".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            sender_email: String::new(),
            sender_name: default_sender_name(),
            subject: default_subject(),
            daily_recipients: Vec::new(),
            weekly_recipients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub email: EmailConfig,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("costwatch").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config. Called once at startup; the pipeline assumes a
    /// valid config thereafter.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.billing.endpoint.starts_with("https://") {
            issues.push(format!(
                "billing.endpoint must use HTTPS, got: '{}'",
                self.billing.endpoint
            ));
        }

        if !self.email.sender_email.contains('@') {
            issues.push(format!(
                "email.sender_email is not an email address: '{}'",
                self.email.sender_email
            ));
        }
        if self.email.subject.trim().is_empty() {
            issues.push("email.subject must not be empty".to_string());
        }
        if self.email.daily_recipients.is_empty() {
            issues.push("email.daily_recipients must list at least one address".to_string());
        }
        if self.email.weekly_recipients.is_empty() {
            issues.push("email.weekly_recipients must list at least one address".to_string());
        }
        for recipient in self
            .email
            .daily_recipients
            .iter()
            .chain(&self.email.weekly_recipients)
        {
            if !recipient.contains('@') {
                issues.push(format!("invalid recipient address: '{}'", recipient));
            }
        }

        issues
    }
}
