//! Federal / non-federal (match) split and proportional allocation.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BudgetError;
use crate::model::MatchSplit;
use crate::money::{to_cents, to_dollars};

/// Floor for `1 - value` when back-deriving a total from a federal share.
pub const MIN_FEDERAL_FRACTION: f64 = 0.0001;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Match is a share of the total project cost.
    #[default]
    PercentOfTotal,
    /// Match is a share of the federal request.
    PercentOfFederal,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PercentOfTotal => "percent_of_total",
            Self::PercentOfFederal => "percent_of_federal",
        }
    }
}

impl FromStr for MatchMode {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "percent_of_total" => Ok(Self::PercentOfTotal),
            "percent_of_federal" => Ok(Self::PercentOfFederal),
            other => Err(BudgetError::InvalidMatchMode(other.to_string())),
        }
    }
}

impl std::fmt::Display for MatchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a caller-supplied target amount should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetInterpretation {
    /// The amount is the federal request; the total is back-derived.
    #[default]
    FederalShare,
    /// The amount replaces the program grand total.
    TotalProjectCost,
}

impl FromStr for TargetInterpretation {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "federal_share" | "federal" => Ok(Self::FederalShare),
            "total_project_cost" | "total" => Ok(Self::TotalProjectCost),
            _ => Err(BudgetError::InvalidInterpretation(s.to_string())),
        }
    }
}

/// A match mode with its fraction (0.25 for a 25% match).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchRule {
    pub mode: MatchMode,
    pub value: f64,
}

impl MatchRule {
    /// Build from a percent in [0, 100].
    pub fn from_percent(mode: MatchMode, percent: f64) -> Result<Self, BudgetError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(BudgetError::InvalidParameter {
                name: "match_percent".into(),
                value: percent.to_string(),
            });
        }
        Ok(Self {
            mode,
            value: percent / 100.0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetAmount {
    pub amount_cents: i64,
    pub interpretation: TargetInterpretation,
}

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

/// Split `total_cost` dollars into federal and match shares.
///
/// A non-positive total yields all zeros.
pub fn split_match(total_cost: f64, value: f64, mode: MatchMode) -> MatchSplit {
    if total_cost <= 0.0 || !total_cost.is_finite() {
        return MatchSplit::ZERO;
    }
    let (federal, matching) = match mode {
        MatchMode::PercentOfTotal => {
            let matching = total_cost * value;
            (total_cost - matching, matching)
        }
        MatchMode::PercentOfFederal => {
            let federal = total_cost / (1.0 + value);
            (federal, federal * value)
        }
    };
    MatchSplit {
        federal_cents: to_cents(federal),
        match_cents: to_cents(matching),
        total_cents: to_cents(total_cost),
    }
}

/// Same as [`split_match`] but with the mode given as text, the way it arrives
/// from request files and the command line.
pub fn split_match_str(total_cost: f64, value: f64, mode: &str) -> Result<MatchSplit, BudgetError> {
    Ok(split_match(total_cost, value, mode.parse()?))
}

/// Derive the total project cost (in dollars) from a federal share.
pub fn total_from_federal(federal: f64, rule: &MatchRule) -> f64 {
    match rule.mode {
        MatchMode::PercentOfTotal => federal / (1.0 - rule.value).max(MIN_FEDERAL_FRACTION),
        MatchMode::PercentOfFederal => federal * (1.0 + rule.value),
    }
}

/// Pick the total project cost (in dollars) to split.
///
/// Without a positive target, the program grand total is used.
pub fn resolve_total_cost(program_total_cents: i64, rule: &MatchRule, target: Option<&TargetAmount>) -> f64 {
    match target {
        Some(t) if t.amount_cents > 0 => match t.interpretation {
            TargetInterpretation::FederalShare => {
                let total = total_from_federal(to_dollars(t.amount_cents), rule);
                log::debug!(
                    "back-derived total {total:.2} from federal share {} ({})",
                    to_dollars(t.amount_cents),
                    rule.mode
                );
                total
            }
            TargetInterpretation::TotalProjectCost => to_dollars(t.amount_cents),
        },
        _ => to_dollars(program_total_cents),
    }
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub federal_cents: Vec<i64>,
    pub match_cents: Vec<i64>,
}

/// Distribute federal and match totals across rows in proportion to `weights`.
///
/// Negative weights count as zero. With a zero weight sum every share is zero.
/// Otherwise the rounding residual lands on the last row, so each vector sums
/// to its target exactly.
pub fn allocate_shares(weights: &[i64], federal_cents: i64, match_cents: i64) -> Allocation {
    let clamped: Vec<i64> = weights.iter().map(|w| (*w).max(0)).collect();
    let weight_sum: i64 = clamped.iter().sum();

    if weight_sum == 0 {
        return Allocation {
            federal_cents: vec![0; weights.len()],
            match_cents: vec![0; weights.len()],
        };
    }

    Allocation {
        federal_cents: distribute(&clamped, weight_sum, federal_cents),
        match_cents: distribute(&clamped, weight_sum, match_cents),
    }
}

fn distribute(weights: &[i64], weight_sum: i64, target: i64) -> Vec<i64> {
    let mut shares: Vec<i64> = weights
        .iter()
        .map(|w| (target as f64 * *w as f64 / weight_sum as f64).round() as i64)
        .collect();
    let residual = target - shares.iter().sum::<i64>();
    if residual != 0 {
        if let Some(last) = shares.last_mut() {
            *last += residual;
        }
    }
    shares
}
