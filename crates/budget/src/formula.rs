//! Baseline budget templates scaled by a locality factor.

use crate::locality::LocalityFactor;
use crate::model::{OperatingRow, ProgramRow};
use crate::money::to_cents;

/// Support costs (rent, supplies) track locality less than wages do.
pub const SUPPORT_EXPONENT: f64 = 0.85;
pub const FRINGE_RATE: f64 = 0.30;
pub const INDIRECT_RATE: f64 = 0.10;

pub const FRINGE_LABEL: &str = "Fringe Benefits (30%)";
pub const INDIRECT_LABEL: &str = "Indirect Costs (10%)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scaling {
    Staffing,
    Support,
}

struct LineTemplate {
    line_item: &'static str,
    units: f64,
    unit_cost: f64,
    scaling: Scaling,
}

const PROGRAM_TEMPLATE: &[LineTemplate] = &[
    LineTemplate { line_item: "Program Director (1.0 FTE)", units: 12.0, unit_cost: 6500.0, scaling: Scaling::Staffing },
    LineTemplate { line_item: "Case Managers (2.0 FTE)", units: 24.0, unit_cost: 4200.0, scaling: Scaling::Staffing },
    LineTemplate { line_item: "Administrative Assistant (0.5 FTE)", units: 6.0, unit_cost: 3000.0, scaling: Scaling::Staffing },
    LineTemplate { line_item: "Program Materials", units: 200.0, unit_cost: 75.0, scaling: Scaling::Support },
    LineTemplate { line_item: "Client Transportation", units: 500.0, unit_cost: 25.0, scaling: Scaling::Support },
    LineTemplate { line_item: "Training & Professional Development", units: 4.0, unit_cost: 1250.0, scaling: Scaling::Support },
    LineTemplate { line_item: "Office Supplies", units: 12.0, unit_cost: 400.0, scaling: Scaling::Support },
    LineTemplate { line_item: "Communications", units: 12.0, unit_cost: 200.0, scaling: Scaling::Support },
];

/// (category, baseline amount, locality exponent)
pub const OPERATING_TEMPLATE: &[(&str, f64, f64)] = &[
    ("Personnel (Salaries)", 450_000.0, 1.0),
    ("Fringe Benefits", 135_000.0, 1.0),
    ("Program Supplies", 45_000.0, SUPPORT_EXPONENT),
    ("Equipment", 30_000.0, SUPPORT_EXPONENT),
    ("Travel", 15_000.0, SUPPORT_EXPONENT),
    ("Communications", 12_000.0, SUPPORT_EXPONENT),
    ("Utilities", 18_000.0, 0.9),
    ("Rent/Facilities", 60_000.0, 1.1),
    ("Administrative Costs", 75_000.0, SUPPORT_EXPONENT),
];

/// Build the program line-item budget.
///
/// Row order is fixed: staffing, support, fringe, indirect.
pub fn generate_program(factor: LocalityFactor) -> Vec<ProgramRow> {
    let f = factor.value();
    let support_multiplier = f.powf(SUPPORT_EXPONENT);

    let mut rows: Vec<ProgramRow> = Vec::with_capacity(PROGRAM_TEMPLATE.len() + 2);
    let mut staffing_cents = 0i64;

    for line in PROGRAM_TEMPLATE {
        let multiplier = match line.scaling {
            Scaling::Staffing => f,
            Scaling::Support => support_multiplier,
        };
        let row = ProgramRow::new(line.line_item, line.units, to_cents(line.unit_cost * multiplier));
        if line.scaling == Scaling::Staffing {
            staffing_cents += row.total_cents;
        }
        rows.push(row);
    }

    let fringe = (staffing_cents as f64 * FRINGE_RATE).round() as i64;
    rows.push(ProgramRow::aggregate(FRINGE_LABEL, fringe));

    let subtotal: i64 = rows.iter().map(|r| r.total_cents).sum();
    let indirect = (subtotal as f64 * INDIRECT_RATE).round() as i64;
    rows.push(ProgramRow::aggregate(INDIRECT_LABEL, indirect));

    log::debug!(
        "program budget at factor {factor}: {} rows, total {}",
        rows.len(),
        subtotal + indirect
    );
    rows
}

/// Build the annual operating budget.
///
/// Percentages are rounded per row and are not forced to sum to 100.0.
pub fn generate_operating(factor: LocalityFactor) -> Vec<OperatingRow> {
    let f = factor.value();
    let amounts: Vec<(&str, i64)> = OPERATING_TEMPLATE
        .iter()
        .map(|(category, baseline, exponent)| (*category, to_cents(baseline * f.powf(*exponent))))
        .collect();

    let total: i64 = amounts.iter().map(|(_, a)| a).sum();

    amounts
        .into_iter()
        .map(|(category, amount_cents)| OperatingRow {
            category: category.to_string(),
            amount_cents,
            percentage: percentage_of(amount_cents, total),
        })
        .collect()
}

fn percentage_of(amount_cents: i64, total_cents: i64) -> f64 {
    if total_cents == 0 {
        return 0.0;
    }
    (1000.0 * amount_cents as f64 / total_cents as f64).round() / 10.0
}
