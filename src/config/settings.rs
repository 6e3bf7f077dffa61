//! User settings and game target profile
//!
//! Settings are read from a JSON file, validated once, and handed to the
//! rest of the crate as typed durations.

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Settings as they appear in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RawSettings {
    /// Delay between the start prompt and the first cycle
    pub start_delay_seconds: u64,
    /// Number of cycles to run
    pub cycle_count: u32,
    /// Wait after returning to story mode before restoring the network
    pub join_story_cooldown_seconds: f64,
    /// How long the transaction spinner must stay gone before leaving
    pub transaction_waiting_seconds: u64,
    /// Key hold time for macros
    pub macro_hold_seconds: f64,
    /// Pause after each macro key
    pub macro_wait_seconds: f64,
    /// Game-specific identifiers
    #[serde(default)]
    pub target: TargetProfile,
}

/// Identifiers of the game being automated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetProfile {
    /// Title of the game window
    pub window_title: String,
    /// Executable names used when falling back to a program-wide block
    pub process_names: Vec<String>,
    /// Host whose traffic is blocked
    pub cloud_save_host: String,
    /// Address blocked alongside the resolved host
    pub cloud_save_fallback_ip: IpAddr,
    /// Name of the firewall rule
    pub rule_name: String,
    /// Template image directory, relative to the executable
    pub template_dir: PathBuf,
    /// Minimum template match score
    pub match_threshold: f32,
}

impl Default for TargetProfile {
    fn default() -> Self {
        Self {
            window_title: "Grand Theft Auto V".to_string(),
            process_names: vec!["GTA5.exe".to_string(), "GTA5_Enhanced.exe".to_string()],
            cloud_save_host: "cs-gta5-prod.ros.rockstargames.com".to_string(),
            cloud_save_fallback_ip: IpAddr::V4(Ipv4Addr::new(192, 81, 241, 171)),
            rule_name: "GTA5_BLOCK_RULE".to_string(),
            template_dir: PathBuf::from("templates"),
            match_threshold: 0.8,
        }
    }
}

/// Validated settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub start_delay: Duration,
    pub cycle_count: u32,
    pub join_story_cooldown: Duration,
    pub transaction_waiting: Duration,
    pub macro_hold: Duration,
    pub macro_wait: Duration,
    pub target: TargetProfile,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_secs(5),
            cycle_count: 1,
            join_story_cooldown: Duration::from_secs(3),
            transaction_waiting: Duration::from_secs(5),
            macro_hold: Duration::from_millis(100),
            macro_wait: Duration::from_millis(550),
            target: TargetProfile::default(),
        }
    }
}

impl Settings {
    /// Read and validate a settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_str(text)?;
        Self::try_from(raw)
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        if raw.cycle_count == 0 {
            return Err(ConfigError::invalid("cycleCount", "must be at least 1"));
        }

        let target = raw.target;
        if target.window_title.trim().is_empty() {
            return Err(ConfigError::invalid("target.windowTitle", "must not be empty"));
        }
        if target.rule_name.trim().is_empty() {
            return Err(ConfigError::invalid("target.ruleName", "must not be empty"));
        }
        if !(target.match_threshold > 0.0 && target.match_threshold <= 1.0) {
            return Err(ConfigError::invalid(
                "target.matchThreshold",
                "must be in (0, 1]",
            ));
        }

        Ok(Self {
            start_delay: Duration::from_secs(raw.start_delay_seconds),
            cycle_count: raw.cycle_count,
            join_story_cooldown: seconds(
                "joinStoryCooldownSeconds",
                raw.join_story_cooldown_seconds,
            )?,
            transaction_waiting: Duration::from_secs(raw.transaction_waiting_seconds),
            macro_hold: seconds("macroHoldSeconds", raw.macro_hold_seconds)?,
            macro_wait: seconds("macroWaitSeconds", raw.macro_wait_seconds)?,
            target,
        })
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigError::invalid(field, format!("{value} is not a valid duration")))
}
