//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Scripts that drive budget generation rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain    | Description                                        |
//! |------|-----------|----------------------------------------------------|
//! | 0    | Universal | Success                                            |
//! | 1    | Universal | General error (unspecified)                        |
//! | 2    | Universal | CLI usage error (bad args)                         |
//! | 3    | io        | Cannot read an input or write an export            |
//! | 4    | parse     | Malformed request file or program CSV              |
//! | 5    | budget    | Invalid budget parameter (match mode, percent, ...) |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above

use grantbudget_engine::BudgetError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input file unreadable or export destination unwritable.
pub const EXIT_IO: u8 = 3;

/// Request TOML or program CSV could not be parsed.
pub const EXIT_PARSE: u8 = 4;

/// Parameters parsed but are not a valid budget request.
pub const EXIT_BUDGET: u8 = 5;

/// Map an engine error to its exit code.
pub fn budget_exit_code(err: &BudgetError) -> u8 {
    match err {
        BudgetError::ConfigParse(_) => EXIT_PARSE,
        BudgetError::InvalidMatchMode(_)
        | BudgetError::InvalidInterpretation(_)
        | BudgetError::InvalidParameter { .. }
        | BudgetError::ConfigValidation(_) => EXIT_BUDGET,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_IO, EXIT_PARSE, EXIT_BUDGET];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn engine_errors_map() {
        assert_eq!(budget_exit_code(&BudgetError::ConfigParse("x".into())), EXIT_PARSE);
        assert_eq!(budget_exit_code(&BudgetError::InvalidMatchMode("x".into())), EXIT_BUDGET);
    }
}
