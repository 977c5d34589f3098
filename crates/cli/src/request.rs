// Assembling a budget request from flags, request file and user settings.
//
// Precedence: flags > request file > user settings > built-in defaults.
// Locality additionally falls back to the most frequent `City, ST` pair in
// the input documents.

use std::fmt;
use std::path::PathBuf;

use clap::Args;
use grantbudget_config::Settings;
use grantbudget_engine::config::TargetConfig;
use grantbudget_engine::{find_city_state_from_text, BudgetRequest};

use crate::CliError;

#[derive(Args, Debug, Default, Clone)]
pub struct RequestArgs {
    /// Budget request file (*.budget.toml)
    #[arg(long, short = 'r', value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Match rule: percent_of_total or percent_of_federal
    #[arg(long, value_name = "MODE")]
    pub match_mode: Option<String>,

    /// Match percent (0-100)
    #[arg(long, value_name = "PERCENT")]
    pub match_percent: Option<f64>,

    /// Total request amount in dollars
    #[arg(long, value_name = "DOLLARS")]
    pub target: Option<f64>,

    /// How to read --target: federal_share or total_project_cost
    #[arg(long, value_name = "KIND")]
    pub interpretation: Option<String>,

    /// Organization name for the PDF header
    #[arg(long)]
    pub organization: Option<String>,

    /// Program title for the PDF header
    #[arg(long)]
    pub program_title: Option<String>,
}

#[derive(Args, Debug, Default, Clone)]
pub struct LocalityArgs {
    /// Locality factor override (0.5-2.0)
    #[arg(long, value_name = "FACTOR")]
    pub factor: Option<f64>,

    /// City used for the cost lookup
    #[arg(long)]
    pub city: Option<String>,

    /// Two-letter state code used for the cost lookup
    #[arg(long)]
    pub state: Option<String>,
}

/// Where the locality factor came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalitySource {
    Override,
    Place,
    Documents,
    Baseline,
}

impl fmt::Display for LocalitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocalitySource::Override => "override",
            LocalitySource::Place => "city/state",
            LocalitySource::Documents => "documents",
            LocalitySource::Baseline => "baseline",
        })
    }
}

/// Request file (or settings) plus flag overrides. Validated.
pub fn load_request(args: &RequestArgs, settings: &Settings) -> Result<BudgetRequest, CliError> {
    let mut request = match &args.request {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {}", path.display(), e)))?;
            let mut request = BudgetRequest::from_toml(&text).map_err(|e| {
                CliError::budget(e).with_hint(format!("check {}", path.display()))
            })?;
            settings.fill_organization(&mut request.organization);
            log::debug!("loaded request {}", path.display());
            request
        }
        None => settings.base_request(),
    };

    if let Some(mode) = &args.match_mode {
        request.match_rule.mode = mode.clone();
    }
    if let Some(percent) = args.match_percent {
        request.match_rule.percent = percent;
    }

    match (args.target, &args.interpretation) {
        (Some(amount), interpretation) => {
            let interpretation = interpretation
                .clone()
                .or_else(|| request.target.as_ref().map(|t| t.interpretation.clone()))
                .unwrap_or_else(|| "federal_share".to_string());
            request.target = Some(TargetConfig { amount, interpretation });
        }
        (None, Some(interpretation)) => match request.target.as_mut() {
            Some(target) => target.interpretation = interpretation.clone(),
            None => log::warn!("--interpretation given without a target amount; ignored"),
        },
        (None, None) => {}
    }

    if let Some(name) = &args.organization {
        request.organization.name = name.clone();
    }
    if let Some(title) = &args.program_title {
        request.organization.program_title = title.clone();
    }

    request.validate().map_err(CliError::budget)?;
    Ok(request)
}

/// Apply locality flags, then fall back to document text when nothing names a place.
pub fn apply_locality(
    request: &mut BudgetRequest,
    args: &LocalityArgs,
    document_text: &str,
) -> Result<LocalitySource, CliError> {
    if args.city.is_some() || args.state.is_some() {
        request.locality.factor = None;
        request.locality.city = args.city.clone();
        request.locality.state = args.state.clone();
    }
    if args.factor.is_some() {
        request.locality.factor = args.factor;
    }

    let locality = &mut request.locality;
    let source = if locality.factor.is_some() {
        LocalitySource::Override
    } else if locality.city.is_some() || locality.state.is_some() {
        LocalitySource::Place
    } else {
        let signal = find_city_state_from_text(document_text);
        if signal.is_empty() {
            LocalitySource::Baseline
        } else {
            log::info!(
                "locality from documents: {}, {}",
                signal.city.as_deref().unwrap_or("?"),
                signal.state.as_deref().unwrap_or("?")
            );
            locality.city = signal.city;
            locality.state = signal.state;
            LocalitySource::Documents
        }
    };

    request.validate().map_err(CliError::budget)?;
    Ok(source)
}
