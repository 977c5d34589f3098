use serde::Serialize;

// ---------------------------------------------------------------------------
// Operating budget
// ---------------------------------------------------------------------------

/// One category of the annual operating budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatingRow {
    pub category: String,
    pub amount_cents: i64,
    /// Share of the operating total, rounded to one decimal. Rows are rounded
    /// independently and need not sum to exactly 100.0.
    pub percentage: f64,
}

// ---------------------------------------------------------------------------
// Program budget
// ---------------------------------------------------------------------------

/// One line item of the program budget.
///
/// Fringe and indirect rows are derived aggregates with `units == 1.0` and
/// `unit_cost_cents == total_cents`. Editing the total of such a row reprices
/// its single unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramRow {
    pub line_item: String,
    pub units: f64,
    pub unit_cost_cents: i64,
    pub total_cents: i64,
}

impl ProgramRow {
    /// Build a row whose total is `round(units * unit_cost, 2)`.
    pub fn new(line_item: impl Into<String>, units: f64, unit_cost_cents: i64) -> Self {
        let mut row = Self {
            line_item: line_item.into(),
            units,
            unit_cost_cents,
            total_cents: 0,
        };
        row.reassert_total();
        row
    }

    /// A derived aggregate row: one unit priced at the full amount.
    pub fn aggregate(line_item: impl Into<String>, total_cents: i64) -> Self {
        Self {
            line_item: line_item.into(),
            units: 1.0,
            unit_cost_cents: total_cents,
            total_cents,
        }
    }

    /// Re-assert `total = units * unit_cost`. Returns true if the row changed.
    ///
    /// Negative units are treated as zero. On a one-unit row a nonzero total
    /// that disagrees with the unit cost is taken as the new unit cost, so an
    /// edited Fringe or Indirect amount survives. Elsewhere units and unit
    /// cost win over the written total.
    pub fn reassert_total(&mut self) -> bool {
        let units = if self.units.is_finite() { self.units.max(0.0) } else { 0.0 };
        let units_changed = units != self.units;
        self.units = units;

        if units == 1.0 && self.total_cents != 0 && self.total_cents != self.unit_cost_cents {
            self.unit_cost_cents = self.total_cents;
            return true;
        }

        let total = (units * self.unit_cost_cents as f64).round() as i64;
        let changed = total != self.total_cents || units_changed;
        self.total_cents = total;
        changed
    }
}

/// Re-assert `total = units * unit_cost` on every row after an external edit.
/// Returns the number of rows that were corrected.
pub fn normalize_program_rows(rows: &mut [ProgramRow]) -> usize {
    let mut corrected = 0;
    for row in rows.iter_mut() {
        let before = (row.unit_cost_cents, row.total_cents);
        if row.reassert_total() {
            if before.1 != 0 && before.1 != row.total_cents {
                log::warn!(
                    "program row '{}': written total {} replaced by units x unit cost = {}",
                    row.line_item,
                    before.1,
                    row.total_cents
                );
            } else if before.0 != row.unit_cost_cents {
                log::debug!(
                    "program row '{}': unit cost {} -> {} from edited total",
                    row.line_item,
                    before.0,
                    row.unit_cost_cents
                );
            }
            corrected += 1;
        }
    }
    corrected
}

// ---------------------------------------------------------------------------
// Federal budget
// ---------------------------------------------------------------------------

/// Reporting rows of the federal (SF-424A style) budget, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FederalCategory {
    Personnel,
    FringeBenefits,
    Travel,
    Equipment,
    Supplies,
    Contractual,
    Other,
    TotalDirectCosts,
    IndirectCosts,
    TotalProjectCosts,
}

impl FederalCategory {
    /// The seven line-item categories that receive allocated shares.
    pub const DIRECT: [FederalCategory; 7] = [
        Self::Personnel,
        Self::FringeBenefits,
        Self::Travel,
        Self::Equipment,
        Self::Supplies,
        Self::Contractual,
        Self::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Personnel => "Personnel",
            Self::FringeBenefits => "Fringe Benefits",
            Self::Travel => "Travel",
            Self::Equipment => "Equipment",
            Self::Supplies => "Supplies",
            Self::Contractual => "Contractual",
            Self::Other => "Other",
            Self::TotalDirectCosts => "Total Direct Costs",
            Self::IndirectCosts => "Indirect Costs",
            Self::TotalProjectCosts => "TOTAL PROJECT COSTS",
        }
    }
}

impl std::fmt::Display for FederalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FederalRow {
    pub category: FederalCategory,
    pub federal_cents: i64,
    pub non_federal_cents: i64,
    pub total_cents: i64,
}

impl FederalRow {
    pub fn new(category: FederalCategory, federal_cents: i64, non_federal_cents: i64) -> Self {
        Self {
            category,
            federal_cents,
            non_federal_cents,
            total_cents: federal_cents + non_federal_cents,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Federal/match split of a total project cost, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSplit {
    pub federal_cents: i64,
    pub match_cents: i64,
    pub total_cents: i64,
}

impl MatchSplit {
    pub const ZERO: MatchSplit = MatchSplit {
        federal_cents: 0,
        match_cents: 0,
        total_cents: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_operating_cents: i64,
    pub total_program_cents: i64,
    /// TOTAL PROJECT COSTS row total, or the federal-share sum when that row is absent.
    pub federal_request_cents: i64,
    pub federal_share_sum_cents: i64,
    pub non_federal_share_sum_cents: i64,
    pub federal_total_sum_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetMeta {
    pub locality_factor: f64,
    pub match_mode: String,
    pub match_fraction: f64,
    pub split: MatchSplit,
    pub engine_version: String,
}

/// The three generated tables plus summary figures. Produced fresh by every run.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetPackage {
    pub meta: BudgetMeta,
    pub operating: Vec<OperatingRow>,
    pub program: Vec<ProgramRow>,
    pub federal: Vec<FederalRow>,
    pub summary: BudgetSummary,
}
