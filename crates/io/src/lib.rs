// File I/O for generated budget tables

pub mod csv;
pub mod json;
pub mod pdf;

/// Default export file names.
pub const OPERATING_CSV: &str = "operating_budget.csv";
pub const PROGRAM_CSV: &str = "program_budget.csv";
pub const FEDERAL_CSV: &str = "federal_budget.csv";
pub const FEDERAL_PDF: &str = "federal_budget_sf424a.pdf";
pub const PACKAGE_JSON: &str = "budget_package.json";
