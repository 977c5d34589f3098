use std::fmt;

#[derive(Debug)]
pub enum BudgetError {
    /// Match rule mode is not one of the supported modes.
    InvalidMatchMode(String),
    /// Target interpretation is not one of the supported values.
    InvalidInterpretation(String),
    /// A numeric parameter is out of range or not finite.
    InvalidParameter { name: String, value: String },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Request validation error.
    ConfigValidation(String),
}

impl fmt::Display for BudgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMatchMode(mode) => write!(
                f,
                "invalid match mode '{mode}' (expected percent_of_total or percent_of_federal)"
            ),
            Self::InvalidInterpretation(value) => write!(
                f,
                "invalid target interpretation '{value}' (expected federal_share or total_project_cost)"
            ),
            Self::InvalidParameter { name, value } => {
                write!(f, "invalid value for {name}: {value}")
            }
            Self::ConfigParse(msg) => write!(f, "request parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "request validation error: {msg}"),
        }
    }
}

impl std::error::Error for BudgetError {}
