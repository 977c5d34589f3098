//! Federal (SF-424A style) table assembly.

use crate::allocate::allocate_shares;
use crate::category::{indirect_amount, map_categories};
use crate::model::{FederalCategory, FederalRow, MatchSplit, ProgramRow};

/// Assemble the federal table from program rows and a federal/match split.
///
/// Rows, in order: the seven direct categories with allocated shares, Total
/// Direct Costs, Indirect Costs (only when a program row mentions "Indirect"),
/// and TOTAL PROJECT COSTS.
///
/// The indirect amount is re-split with the direct-cost federal ratio. It is
/// also already inside Other, so TOTAL PROJECT COSTS (direct categories plus
/// the indirect line) counts it twice. Reports built from earlier versions
/// carry the same figure, so it is kept as is.
pub fn build_federal_table(program: &[ProgramRow], split: &MatchSplit) -> Vec<FederalRow> {
    let category_totals = map_categories(program);
    let weights: Vec<i64> = category_totals.iter().map(|c| c.total_cents).collect();
    let allocation = allocate_shares(&weights, split.federal_cents, split.match_cents);

    let mut rows: Vec<FederalRow> = category_totals
        .iter()
        .zip(allocation.federal_cents.iter().zip(&allocation.match_cents))
        .map(|(cat, (fed, non))| FederalRow::new(cat.category, *fed, *non))
        .collect();

    let direct_federal: i64 = rows.iter().map(|r| r.federal_cents).sum();
    let direct_match: i64 = rows.iter().map(|r| r.non_federal_cents).sum();
    let direct = FederalRow::new(FederalCategory::TotalDirectCosts, direct_federal, direct_match);

    let indirect = indirect_amount(program).map(|amount| {
        let federal = if direct.total_cents > 0 {
            (amount as f64 * direct.federal_cents as f64 / direct.total_cents as f64).round() as i64
        } else {
            0
        };
        let non_federal = if direct.total_cents > 0 { amount - federal } else { 0 };
        FederalRow::new(FederalCategory::IndirectCosts, federal, non_federal)
    });

    let mut project_federal = direct.federal_cents;
    let mut project_match = direct.non_federal_cents;
    if let Some(ref row) = indirect {
        project_federal += row.federal_cents;
        project_match += row.non_federal_cents;
    }

    rows.push(direct);
    if let Some(row) = indirect {
        rows.push(row);
    }
    rows.push(FederalRow::new(
        FederalCategory::TotalProjectCosts,
        project_federal,
        project_match,
    ));

    log::debug!(
        "federal table: {} rows, split federal={} match={}",
        rows.len(),
        split.federal_cents,
        split.match_cents
    );
    rows
}

/// Row for `category`, if present.
pub fn find_row(rows: &[FederalRow], category: FederalCategory) -> Option<&FederalRow> {
    rows.iter().find(|r| r.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::{split_match, MatchMode};
    use crate::formula::generate_program;
    use crate::locality::LocalityFactor;
    use crate::money::to_dollars;

    fn baseline_table(value: f64, mode: MatchMode) -> (Vec<ProgramRow>, MatchSplit, Vec<FederalRow>) {
        let program = generate_program(LocalityFactor::BASELINE);
        let total: i64 = program.iter().map(|r| r.total_cents).sum();
        let split = split_match(to_dollars(total), value, mode);
        let table = build_federal_table(&program, &split);
        (program, split, table)
    }

    #[test]
    fn row_order() {
        let (_, _, table) = baseline_table(0.25, MatchMode::PercentOfTotal);
        let labels: Vec<&str> = table.iter().map(|r| r.category.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Personnel",
                "Fringe Benefits",
                "Travel",
                "Equipment",
                "Supplies",
                "Contractual",
                "Other",
                "Total Direct Costs",
                "Indirect Costs",
                "TOTAL PROJECT COSTS",
            ]
        );
    }

    #[test]
    fn direct_rows_sum_to_split_exactly() {
        let (_, split, table) = baseline_table(0.37, MatchMode::PercentOfFederal);
        let direct = find_row(&table, FederalCategory::TotalDirectCosts).unwrap();
        assert_eq!(direct.federal_cents, split.federal_cents);
        assert_eq!(direct.non_federal_cents, split.match_cents);
        for row in &table {
            assert_eq!(row.total_cents, row.federal_cents + row.non_federal_cents);
        }
    }

    #[test]
    fn zero_match_keeps_everything_federal() {
        let (_, _, table) = baseline_table(0.0, MatchMode::PercentOfTotal);
        let personnel = find_row(&table, FederalCategory::Personnel).unwrap();
        assert_eq!(personnel.non_federal_cents, 0);
        for row in &table {
            assert_eq!(row.non_federal_cents, 0);
        }
    }

    #[test]
    fn indirect_uses_direct_cost_ratio() {
        let (program, _, table) = baseline_table(0.25, MatchMode::PercentOfTotal);
        let indirect = find_row(&table, FederalCategory::IndirectCosts).unwrap();
        let amount = indirect_amount(&program).unwrap();
        assert_eq!(amount, 2_955_400);
        assert_eq!(indirect.total_cents, amount);

        let direct = find_row(&table, FederalCategory::TotalDirectCosts).unwrap();
        let ratio = direct.federal_cents as f64 / direct.total_cents as f64;
        assert_eq!(indirect.federal_cents, (amount as f64 * ratio).round() as i64);
    }

    #[test]
    fn total_project_costs_double_counts_indirect() {
        let (_, split, table) = baseline_table(0.25, MatchMode::PercentOfTotal);
        let other = find_row(&table, FederalCategory::Other).unwrap();
        let indirect = find_row(&table, FederalCategory::IndirectCosts).unwrap();
        let grand = find_row(&table, FederalCategory::TotalProjectCosts).unwrap();

        // Other already carries a share of the indirect amount...
        assert!(other.total_cents > 0);
        // ...and the grand total adds the full indirect line on top of the split.
        assert_eq!(grand.total_cents, split.total_cents + indirect.total_cents);
        assert_eq!(grand.total_cents, 32_509_400 + 2_955_400);
    }

    #[test]
    fn no_indirect_row_when_no_keyword() {
        let program = vec![
            ProgramRow::new("Program Director (1.0 FTE)", 12.0, 650_000),
            ProgramRow::new("Office Supplies", 12.0, 40_000),
        ];
        let split = split_match(82_800.0, 0.1, MatchMode::PercentOfTotal);
        let table = build_federal_table(&program, &split);
        assert_eq!(table.len(), 9);
        assert!(find_row(&table, FederalCategory::IndirectCosts).is_none());
        let grand = find_row(&table, FederalCategory::TotalProjectCosts).unwrap();
        assert_eq!(grand.total_cents, split.total_cents);
    }

    #[test]
    fn training_and_indirect_row_counts_in_other_once_and_again_as_indirect() {
        let program = vec![
            ProgramRow::new("Case Managers (2.0 FTE)", 24.0, 420_000),
            ProgramRow::new("Indirect Training Overhead", 1.0, 1_000_000),
        ];
        let total: i64 = program.iter().map(|r| r.total_cents).sum();
        let split = split_match(to_dollars(total), 0.0, MatchMode::PercentOfTotal);
        let table = build_federal_table(&program, &split);

        let other = find_row(&table, FederalCategory::Other).unwrap();
        assert_eq!(other.total_cents, 1_000_000);
        let indirect = find_row(&table, FederalCategory::IndirectCosts).unwrap();
        assert_eq!(indirect.total_cents, 1_000_000);
        let grand = find_row(&table, FederalCategory::TotalProjectCosts).unwrap();
        assert_eq!(grand.total_cents, total + 1_000_000);
    }

    #[test]
    fn zero_split_gives_zero_table() {
        let program = generate_program(LocalityFactor::BASELINE);
        let table = build_federal_table(&program, &MatchSplit::ZERO);
        for row in &table {
            assert_eq!(row.total_cents, 0);
        }
    }
}
