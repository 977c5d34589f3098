// User settings
// Loaded from ~/.config/grantbudget/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use grantbudget_engine::allocate::MatchMode;
use grantbudget_engine::config::{BudgetRequest, MatchConfig, OrganizationInfo};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Match rule used when neither a request file nor a flag names one
    #[serde(rename = "match.mode")]
    pub match_mode: String,

    #[serde(rename = "match.percent")]
    pub match_percent: f64,

    // Output
    #[serde(rename = "output.directory")]
    pub output_dir: Option<PathBuf>,

    // Organization defaults, used when a request leaves them blank
    #[serde(rename = "organization.name")]
    pub organization_name: String,

    #[serde(rename = "organization.programTitle")]
    pub program_title: String,

    #[serde(rename = "organization.grantPeriod")]
    pub grant_period: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::PercentOfTotal.as_str().to_string(),
            match_percent: 0.0,
            output_dir: None,
            organization_name: String::new(),
            program_title: String::new(),
            grant_period: String::new(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grantbudget");
        config_dir.join("settings.json")
    }

    /// Load settings from the user config directory, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. Missing, unreadable or corrupt files yield defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("no settings at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("error parsing {}: {}; using defaults", path.display(), e);
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Starting request when no request file is given.
    pub fn base_request(&self) -> BudgetRequest {
        let mut request = BudgetRequest {
            match_rule: MatchConfig {
                mode: self.match_mode.clone(),
                percent: self.match_percent,
            },
            ..BudgetRequest::default()
        };
        self.fill_organization(&mut request.organization);
        request
    }

    /// Fill blank organization fields from settings.
    pub fn fill_organization(&self, org: &mut OrganizationInfo) {
        fill_blank(&mut org.name, &self.organization_name);
        fill_blank(&mut org.program_title, &self.program_title);
        fill_blank(&mut org.grant_period, &self.grant_period);
    }
}

fn fill_blank(field: &mut String, fallback: &str) {
    if field.trim().is_empty() && !fallback.is_empty() {
        *field = fallback.to_string();
    }
}
