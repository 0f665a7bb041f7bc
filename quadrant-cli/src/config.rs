use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_quadrant_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiSection,
    pub telegram: TelegramSection,
    pub scheduler: SchedulerSection,
    /// Users the reminder loop evaluates, with their UTC offsets.
    #[serde(default)]
    pub sessions: Vec<SessionSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    /// Bearer token for the backend API.
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSection {
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSeed {
    pub user_id: i64,
    /// Whole hours from UTC; the registry default (+3) applies when unset.
    #[serde(default)]
    pub utc_offset: Option<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiSection {
                base_url: "http://localhost:8000/api/v3".to_string(),
                token: String::new(),
            },
            telegram: TelegramSection {
                bot_token: String::new(),
            },
            scheduler: SchedulerSection {
                poll_interval_secs: 300,
            },
            sessions: vec![],
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_quadrant_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.api.base_url, cfg.api.base_url);
        assert_eq!(back.scheduler.poll_interval_secs, 300);
        assert!(back.sessions.is_empty());
    }

    #[test]
    fn sessions_table_parses_with_and_without_offset() {
        let s = r#"
[api]
base_url = "http://localhost:8000/api/v3"
token = "secret"

[telegram]
bot_token = "123:abc"

[scheduler]
poll_interval_secs = 60

[[sessions]]
user_id = 42
utc_offset = -5

[[sessions]]
user_id = 43
"#;
        let cfg: Config = toml::from_str(s).unwrap();
        assert_eq!(cfg.sessions.len(), 2);
        assert_eq!(cfg.sessions[0].utc_offset, Some(-5));
        assert_eq!(cfg.sessions[1].utc_offset, None);
    }
}
