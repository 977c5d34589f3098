//! `grantbudget-engine`: grant budget computation engine.
//!
//! Pure engine crate: receives a locality factor and a match rule, returns the
//! operating, program and federal tables. No CLI or IO dependencies.

pub mod allocate;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod federal;
pub mod formula;
pub mod locality;
pub mod model;
pub mod money;

pub use config::BudgetRequest;
pub use engine::{run, BudgetParams};
pub use error::BudgetError;
pub use locality::{find_city_state_from_text, resolve_locality_factor, LocalitySignal};
pub use model::{BudgetPackage, FederalRow, OperatingRow, ProgramRow};
