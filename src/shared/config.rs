//! Application configuration. API credentials, backend selection, persistence, schedule.

use crate::adapters::ai::gemini_adapter::{DEFAULT_GEMINI_MODEL, GEMINI_API_URL};
use crate::adapters::ai::openai_adapter::{DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL};
use crate::domain::DomainError;
use crate::domain::ScheduleConfig;
use crate::domain::schedule::{
    DEFAULT_CLEANUP_OFFSET_MINUTES, DEFAULT_REPORT_TIME, DEFAULT_RETENTION_DAYS,
};
use serde::Deserialize;
use std::str::FromStr;

pub const DEFAULT_SESSION_PATH: &str = "./session.db";
pub const DEFAULT_DATABASE_URL: &str = "./data/messages.db";
pub const DEFAULT_PORT: u16 = 10000;

/// Which generative backend to build at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiProvider {
    #[default]
    Gemini,
    OpenAi,
    Mock,
}

impl FromStr for AiProvider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" | "ollama" => Ok(Self::OpenAi),
            "mock" => Ok(Self::Mock),
            other => Err(DomainError::Config(format!(
                "unknown AI provider '{}' (expected gemini, openai or mock)",
                other
            ))),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub api_id: Option<i32>,
    pub api_hash: Option<String>,
    pub session_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Generative backend
    // ─────────────────────────────────────────────────────────────────────────
    /// Backend API key. Read from TG_DIGEST_AI_API_KEY, or GEMINI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// "gemini" (default), "openai" or "mock". Read from TG_DIGEST_AI_PROVIDER.
    #[serde(default)]
    pub ai_provider: Option<String>,

    #[serde(default)]
    pub ai_api_url: Option<String>,

    #[serde(default)]
    pub ai_model: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence, HTTP, schedule (unprefixed variables)
    // ─────────────────────────────────────────────────────────────────────────
    /// File path or libsql URL. Read from DATABASE_URL.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Read from DATABASE_AUTH_TOKEN; only used for remote databases.
    #[serde(default)]
    pub database_auth_token: Option<String>,

    /// Health server port. Read from PORT.
    #[serde(default)]
    pub port: Option<u16>,

    /// `HH:MM` UTC. Read from REPORT_TIME.
    #[serde(default)]
    pub report_time: Option<String>,

    /// Read from CLEANUP_OFFSET_MINUTES.
    #[serde(default)]
    pub cleanup_offset_minutes: Option<u32>,

    /// Read from MESSAGE_RETENTION_DAYS.
    #[serde(default)]
    pub message_retention_days: Option<u32>,

    /// Scheduled fan-out on/off. Read from TG_DIGEST_SCHEDULED_REPORTS.
    #[serde(default)]
    pub scheduled_reports: Option<bool>,
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("TG_DIGEST"));
        if let Ok(path) = std::env::var("TG_DIGEST_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        cfg.apply_unprefixed_env();
        Ok(cfg)
    }

    /// Variables kept unprefixed for compatibility with common hosting setups.
    fn apply_unprefixed_env(&mut self) {
        if self.ai_api_key.is_none() {
            self.ai_api_key = env_string("GEMINI_API_KEY");
        }
        if let Some(url) = env_string("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(token) = env_string("DATABASE_AUTH_TOKEN") {
            self.database_auth_token = Some(token);
        }
        if let Some(port) = env_parsed("PORT") {
            self.port = Some(port);
        }
        if let Some(time) = env_string("REPORT_TIME") {
            self.report_time = Some(time);
        }
        if let Some(offset) = env_parsed("CLEANUP_OFFSET_MINUTES") {
            self.cleanup_offset_minutes = Some(offset);
        }
        if let Some(days) = env_parsed("MESSAGE_RETENTION_DAYS") {
            self.message_retention_days = Some(days);
        }
    }

    pub fn session_path_or_default(&self) -> String {
        self.session_path
            .clone()
            .unwrap_or_else(|| DEFAULT_SESSION_PATH.to_string())
    }

    pub fn database_url_or_default(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn scheduled_reports_enabled(&self) -> bool {
        self.scheduled_reports.unwrap_or(true)
    }

    /// Validated daily schedule. Fails on a malformed `REPORT_TIME`.
    pub fn schedule_config(&self) -> Result<ScheduleConfig, DomainError> {
        ScheduleConfig::new(
            self.report_time.as_deref().unwrap_or(DEFAULT_REPORT_TIME),
            self.cleanup_offset_minutes
                .unwrap_or(DEFAULT_CLEANUP_OFFSET_MINUTES),
            self.message_retention_days.unwrap_or(DEFAULT_RETENTION_DAYS),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Backend helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub fn ai_provider(&self) -> Result<AiProvider, DomainError> {
        self.ai_provider
            .as_deref()
            .map(str::parse)
            .unwrap_or(Ok(AiProvider::default()))
    }

    /// Returns the backend API key if configured and non-blank.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key.clone().filter(|k| !k.trim().is_empty())
    }

    /// Returns the API URL for `provider`, falling back to its public endpoint.
    pub fn ai_api_url_or_default(&self, provider: AiProvider) -> String {
        self.ai_api_url.clone().unwrap_or_else(|| match provider {
            AiProvider::OpenAi => DEFAULT_OPENAI_URL.to_string(),
            AiProvider::Gemini | AiProvider::Mock => GEMINI_API_URL.to_string(),
        })
    }

    pub fn ai_model_or_default(&self, provider: AiProvider) -> String {
        self.ai_model.clone().unwrap_or_else(|| match provider {
            AiProvider::OpenAi => DEFAULT_OPENAI_MODEL.to_string(),
            AiProvider::Gemini | AiProvider::Mock => DEFAULT_GEMINI_MODEL.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port_or_default(), 10000);
        assert_eq!(cfg.database_url_or_default(), "./data/messages.db");
        assert_eq!(cfg.session_path_or_default(), "./session.db");
        assert!(cfg.scheduled_reports_enabled());
        assert!(cfg.ai_api_key().is_none());
        assert_eq!(cfg.ai_provider().unwrap(), AiProvider::Gemini);

        let schedule = cfg.schedule_config().unwrap();
        assert_eq!(schedule.report_time_label(), "23:59");
        assert_eq!(schedule.cleanup_time_label(), "00:05");
        assert_eq!(schedule.retention_days, 14);
    }

    #[test]
    fn malformed_report_time_is_rejected() {
        let cfg = AppConfig {
            report_time: Some("25:00".into()),
            ..Default::default()
        };
        assert!(matches!(cfg.schedule_config(), Err(DomainError::Config(_))));
    }

    #[test]
    fn provider_names_parse() {
        assert_eq!("OpenAI".parse::<AiProvider>().unwrap(), AiProvider::OpenAi);
        assert_eq!(" mock ".parse::<AiProvider>().unwrap(), AiProvider::Mock);
        assert!("palm".parse::<AiProvider>().is_err());
    }

    #[test]
    fn provider_defaults_for_url_and_model() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.ai_model_or_default(AiProvider::OpenAi), "gpt-4o-mini");
        assert_eq!(cfg.ai_model_or_default(AiProvider::Gemini), "gemini-2.5-flash");
        assert!(
            cfg.ai_api_url_or_default(AiProvider::OpenAi)
                .ends_with("/chat/completions")
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cfg = AppConfig {
            ai_api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(cfg.ai_api_key().is_none());
    }
}
