use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;
use std::path::PathBuf;
use url::Url;

/// Application configuration module
/// This module handles the bot configuration: reading it from the
/// environment (optionally seeded from a `.env` file) and validating it.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Student account of the DSB service
    pub dsb: Credentials,

    /// Optional teacher account; its plans are converted for students
    #[serde(default)]
    pub dsb_teacher: Option<Credentials>,

    /// Plan repository settings
    pub git: GitConfig,

    /// Discord webhook settings
    #[serde(default)]
    pub discord: DiscordConfig,

    /// CPU temperature (°C) above which a warning is sent
    #[serde(default = "default_temp_threshold")]
    pub temp_threshold: f32,

    /// Local checkout of the plan repository
    #[serde(default = "default_repo_dir")]
    pub repo_dir: PathBuf,

    /// Directory for per-start log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Header template used for teacher plan conversion
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Username and password of a DSB account
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// GitHub repository the plans are pushed to
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GitConfig {
    pub user: String,
    pub token: String,
    pub repo: String,
}

/// Discord webhook configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct DiscordConfig {
    /// Webhook for warnings
    #[serde(default)]
    pub webhook_warn: Option<String>,

    /// Webhook for plan updates
    #[serde(default)]
    pub webhook_plans: Option<String>,

    /// Role mentioned in warnings, empty for none
    #[serde(default)]
    pub ping_role_id: String,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Variables that must be present and non-empty
pub const REQUIRED_VARIABLES: [&str; 5] = ["DSB_USER", "DSB_PASS", "GIT_USER", "GIT_TOKEN", "GIT_REPO"];

fn default_temp_threshold() -> f32 {
    75.0
}

fn default_repo_dir() -> PathBuf {
    PathBuf::from("dsb-database")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_template_path() -> PathBuf {
    PathBuf::from(crate::converter::DEFAULT_TEMPLATE_PATH)
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build and validate a configuration from `NAME=value` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        let get = |key: &str| vars.get(key).cloned();

        let missing: Vec<&str> = REQUIRED_VARIABLES
            .iter()
            .copied()
            .filter(|key| !vars.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("Missing variables in .env: {}", missing.join(", ")));
        }

        let dsb_teacher = match (get("DSB_TEACHER_USER"), get("DSB_TEACHER_PASS")) {
            (Some(user), Some(password)) => Some(Credentials { user, password }),
            (None, None) => None,
            _ => {
                return Err(anyhow!(
                    "DSB_TEACHER_USER and DSB_TEACHER_PASS must be set together"
                ))
            }
        };

        let temp_threshold = match get("TEMP_THRESHOLD") {
            Some(raw) => raw
                .parse::<f32>()
                .map_err(|_| anyhow!("TEMP_THRESHOLD is not a number: {}", raw))?,
            None => default_temp_threshold(),
        };

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => raw.parse()?,
            None => LogLevel::default(),
        };

        let config = Config {
            dsb: Credentials {
                user: get("DSB_USER").unwrap_or_default(),
                password: get("DSB_PASS").unwrap_or_default(),
            },
            dsb_teacher,
            git: GitConfig {
                user: get("GIT_USER").unwrap_or_default(),
                token: get("GIT_TOKEN").unwrap_or_default(),
                repo: get("GIT_REPO").unwrap_or_default(),
            },
            discord: DiscordConfig {
                webhook_warn: get("DISCORD_WEBHOOK_WARN"),
                webhook_plans: get("DISCORD_WEBHOOK_PLANS"),
                ping_role_id: get("DISCORD_PING_ROLE_ID").unwrap_or_default(),
            },
            temp_threshold,
            repo_dir: get("REPO_DIR").map(PathBuf::from).unwrap_or_else(default_repo_dir),
            log_dir: get("LOG_DIR").map(PathBuf::from).unwrap_or_else(default_log_dir),
            template_path: get("PLAN_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or_else(default_template_path),
            log_level,
        };

        config.validate()?;
        Ok(config)
    }

    /// Directory the plan documents are written to
    pub fn plans_dir(&self) -> PathBuf {
        self.repo_dir.join("plans")
    }

    /// Directory for converted teacher plans
    pub fn student_plans_dir(&self) -> PathBuf {
        self.plans_dir().join("students")
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("DSB_USER", &self.dsb.user),
            ("DSB_PASS", &self.dsb.password),
            ("GIT_USER", &self.git.user),
            ("GIT_TOKEN", &self.git.token),
            ("GIT_REPO", &self.git.repo),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("Missing variables in .env: {}", missing.join(", ")));
        }

        if let Some(teacher) = &self.dsb_teacher {
            if teacher.user.is_empty() != teacher.password.is_empty() {
                return Err(anyhow!(
                    "DSB_TEACHER_USER and DSB_TEACHER_PASS must be set together"
                ));
            }
        }

        for (name, webhook) in [
            ("DISCORD_WEBHOOK_WARN", &self.discord.webhook_warn),
            ("DISCORD_WEBHOOK_PLANS", &self.discord.webhook_plans),
        ] {
            if let Some(webhook) = webhook {
                Url::parse(webhook).map_err(|e| anyhow!("{} is not a valid URL: {}", name, e))?;
            }
        }

        if !self.temp_threshold.is_finite() {
            return Err(anyhow!("TEMP_THRESHOLD must be a finite number"));
        }

        Ok(())
    }
}
