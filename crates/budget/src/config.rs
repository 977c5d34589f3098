use serde::Deserialize;

use crate::allocate::{MatchMode, MatchRule, TargetAmount, TargetInterpretation};
use crate::engine::BudgetParams;
use crate::error::BudgetError;
use crate::locality::{resolve_locality_factor, LocalityFactor};
use crate::money::to_cents;

// ---------------------------------------------------------------------------
// Top-level request
// ---------------------------------------------------------------------------

/// A budget request file (`*.budget.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetRequest {
    #[serde(default)]
    pub organization: OrganizationInfo,
    #[serde(default)]
    pub locality: LocalityConfig,
    #[serde(default, rename = "match")]
    pub match_rule: MatchConfig,
    #[serde(default)]
    pub target: Option<TargetConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganizationInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub program_title: String,
    #[serde(default)]
    pub grant_period: String,
}

/// Locality inputs. An explicit `factor` wins over `city`/`state`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalityConfig {
    #[serde(default)]
    pub factor: Option<f64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Match rule as written. `mode` stays text so an unknown mode surfaces as
/// [`BudgetError::InvalidMatchMode`] rather than a parse error.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub percent: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            percent: 0.0,
        }
    }
}

fn default_mode() -> String {
    MatchMode::PercentOfTotal.as_str().to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Dollars.
    pub amount: f64,
    #[serde(default = "default_interpretation")]
    pub interpretation: String,
}

fn default_interpretation() -> String {
    "federal_share".to_string()
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl BudgetRequest {
    pub fn from_toml(input: &str) -> Result<Self, BudgetError> {
        let request: BudgetRequest =
            toml::from_str(input).map_err(|e| BudgetError::ConfigParse(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), BudgetError> {
        self.match_mode()?;
        self.match_rule()?;

        if let Some(factor) = self.locality.factor {
            if !(LocalityFactor::MIN..=LocalityFactor::MAX).contains(&factor) {
                return Err(BudgetError::ConfigValidation(format!(
                    "locality.factor must be between {} and {}, got {factor}",
                    LocalityFactor::MIN,
                    LocalityFactor::MAX
                )));
            }
        }

        if let Some(state) = &self.locality.state {
            if state.trim().len() != 2 {
                return Err(BudgetError::ConfigValidation(format!(
                    "locality.state must be a 2-letter code, got '{state}'"
                )));
            }
        }

        if let Some(target) = &self.target {
            if !target.amount.is_finite() || target.amount < 0.0 {
                return Err(BudgetError::ConfigValidation(format!(
                    "target.amount must be non-negative, got {}",
                    target.amount
                )));
            }
            target.interpretation.parse::<TargetInterpretation>()?;
        }

        Ok(())
    }

    pub fn match_mode(&self) -> Result<MatchMode, BudgetError> {
        self.match_rule.mode.parse()
    }

    pub fn match_rule(&self) -> Result<MatchRule, BudgetError> {
        MatchRule::from_percent(self.match_mode()?, self.match_rule.percent)
    }

    /// Locality factor from an explicit override, else from city/state.
    pub fn locality_factor(&self) -> Result<LocalityFactor, BudgetError> {
        match self.locality.factor {
            Some(f) => LocalityFactor::new(f),
            None => Ok(resolve_locality_factor(
                self.locality.city.as_deref(),
                self.locality.state.as_deref(),
            )),
        }
    }

    pub fn target_amount(&self) -> Result<Option<TargetAmount>, BudgetError> {
        self.target
            .as_ref()
            .map(|t| {
                Ok(TargetAmount {
                    amount_cents: to_cents(t.amount),
                    interpretation: t.interpretation.parse()?,
                })
            })
            .transpose()
    }

    pub fn to_params(&self) -> Result<BudgetParams, BudgetError> {
        Ok(BudgetParams {
            factor: self.locality_factor()?,
            rule: self.match_rule()?,
            target: self.target_amount()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
