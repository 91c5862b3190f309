use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::card::Response;
use crate::engine::interval::{FirstReviewRule, IntervalPolicy, Multipliers};
use crate::engine::selector::{DueCardSelector, SelectionPolicy};
use crate::store::json_store::JsonStore;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_cards_path")]
    pub cards_path: String,
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    #[serde(default = "default_max_interval_secs")]
    pub max_interval_secs: u64,
    #[serde(default = "default_min_show_interval_secs")]
    pub min_show_interval_secs: u64,
    #[serde(default = "default_max_show_interval_secs")]
    pub max_show_interval_secs: u64,
    #[serde(default = "default_pacing_enabled")]
    pub pacing_enabled: bool,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 0 waits for the reveal press forever.
    #[serde(default = "default_reveal_timeout_secs")]
    pub reveal_timeout_secs: u64,
    /// 0 waits for a rating forever.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
    #[serde(default = "default_default_response")]
    pub default_response: Response,
    #[serde(default = "default_selection_policy")]
    pub selection_policy: SelectionPolicy,
    #[serde(default = "default_first_review")]
    pub first_review: FirstReviewRule,
    #[serde(default = "default_overdue_cap")]
    pub overdue_cap: f64,
    #[serde(default)]
    pub multipliers: Multipliers,
}

fn default_cards_path() -> String {
    JsonStore::default_path().to_string_lossy().to_string()
}
fn default_min_interval_secs() -> u64 {
    5 * 60
}
fn default_max_interval_secs() -> u64 {
    30 * 24 * 60 * 60
}
fn default_min_show_interval_secs() -> u64 {
    5 * 60
}
fn default_max_show_interval_secs() -> u64 {
    60 * 60
}
fn default_pacing_enabled() -> bool {
    true
}
fn default_refresh_interval_secs() -> u64 {
    180
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_reveal_timeout_secs() -> u64 {
    0
}
fn default_response_timeout_secs() -> u64 {
    60
}
fn default_default_response() -> Response {
    Response::Hard
}
fn default_selection_policy() -> SelectionPolicy {
    SelectionPolicy::MostOverdue
}
fn default_first_review() -> FirstReviewRule {
    FirstReviewRule::ResetToMin
}
fn default_overdue_cap() -> f64 {
    10.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cards_path: default_cards_path(),
            min_interval_secs: default_min_interval_secs(),
            max_interval_secs: default_max_interval_secs(),
            min_show_interval_secs: default_min_show_interval_secs(),
            max_show_interval_secs: default_max_show_interval_secs(),
            pacing_enabled: default_pacing_enabled(),
            refresh_interval_secs: default_refresh_interval_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            reveal_timeout_secs: default_reveal_timeout_secs(),
            response_timeout_secs: default_response_timeout_secs(),
            default_response: default_default_response(),
            selection_policy: default_selection_policy(),
            first_review: default_first_review(),
            overdue_cap: default_overdue_cap(),
            multipliers: Multipliers::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("inkcards")
            .join("config.toml")
    }

    /// Repair values the scheduler cannot work with. Returns a note per change.
    pub fn validate(&mut self) -> Vec<String> {
        let mut fixes = Vec::new();

        if self.min_interval_secs == 0 {
            self.min_interval_secs = 1;
            fixes.push("min_interval_secs raised to 1".to_string());
        }
        if self.max_interval_secs < self.min_interval_secs {
            self.max_interval_secs = self.min_interval_secs;
            fixes.push("max_interval_secs raised to min_interval_secs".to_string());
        }
        if self.max_show_interval_secs < self.min_show_interval_secs {
            self.max_show_interval_secs = self.min_show_interval_secs;
            fixes.push("max_show_interval_secs raised to min_show_interval_secs".to_string());
        }
        if self.poll_interval_ms < 10 {
            self.poll_interval_ms = 10;
            fixes.push("poll_interval_ms raised to 10".to_string());
        }
        if !self.overdue_cap.is_finite() || self.overdue_cap < 1.0 {
            self.overdue_cap = default_overdue_cap();
            fixes.push("overdue_cap reset to default".to_string());
        }

        let defaults = Multipliers::default();
        for (name, value, default) in [
            ("easy", &mut self.multipliers.easy, defaults.easy),
            ("medium", &mut self.multipliers.medium, defaults.medium),
            ("hard", &mut self.multipliers.hard, defaults.hard),
        ] {
            if !value.is_finite() || *value <= 0.0 {
                *value = default;
                fixes.push(format!("multipliers.{name} reset to {default}"));
            }
        }

        fixes
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn min_show_interval(&self) -> Duration {
        Duration::from_secs(self.min_show_interval_secs)
    }

    pub fn max_show_interval(&self) -> Duration {
        Duration::from_secs(self.max_show_interval_secs)
    }

    pub fn reveal_timeout(&self) -> Option<Duration> {
        (self.reveal_timeout_secs > 0).then(|| Duration::from_secs(self.reveal_timeout_secs))
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        (self.response_timeout_secs > 0).then(|| Duration::from_secs(self.response_timeout_secs))
    }

    pub fn interval_policy(&self) -> IntervalPolicy {
        IntervalPolicy::for_rule(
            self.first_review,
            self.multipliers,
            self.min_interval_secs,
            self.max_interval_secs,
        )
    }

    pub fn selector(&self) -> DueCardSelector {
        DueCardSelector::for_policy(
            self.selection_policy,
            self.min_show_interval(),
            self.overdue_cap,
        )
    }
}
