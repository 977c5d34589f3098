//! Program line items → federal reporting categories.
//!
//! Classification is keyword containment, case-insensitive, against the line
//! item text. A row counts at most once per category but may land in several
//! categories (e.g. "Indirect Training" is both Other and the indirect line).

use serde::Serialize;

use crate::model::{FederalCategory, ProgramRow};

/// One entry of the rule table: a category and the keywords that select it.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: FederalCategory,
    pub keywords: &'static [&'static str],
}

/// Ordered rule table, one entry per direct-cost category. Contractual has no
/// keywords and always totals zero.
pub const CATEGORY_RULES: [CategoryRule; 7] = [
    CategoryRule { category: FederalCategory::Personnel, keywords: &["FTE", "Director", "Manager", "Assistant"] },
    CategoryRule { category: FederalCategory::FringeBenefits, keywords: &["Fringe"] },
    CategoryRule { category: FederalCategory::Travel, keywords: &["Travel", "Transportation"] },
    CategoryRule { category: FederalCategory::Equipment, keywords: &["Equipment"] },
    CategoryRule { category: FederalCategory::Supplies, keywords: &["Materials", "Supplies"] },
    CategoryRule { category: FederalCategory::Contractual, keywords: &[] },
    CategoryRule { category: FederalCategory::Other, keywords: &["Communications", "Training", "Indirect"] },
];

/// Keyword that marks a row as indirect cost for the standalone Indirect Costs line.
pub const INDIRECT_KEYWORD: &str = "Indirect";

impl CategoryRule {
    pub fn matches(&self, line_item: &str) -> bool {
        let haystack = line_item.to_lowercase();
        self.keywords
            .iter()
            .any(|kw| haystack.contains(&kw.to_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: FederalCategory,
    pub total_cents: i64,
}

/// Categories a single line item falls into, in rule-table order.
pub fn categories_for(line_item: &str) -> Vec<FederalCategory> {
    CATEGORY_RULES
        .iter()
        .filter(|rule| rule.matches(line_item))
        .map(|rule| rule.category)
        .collect()
}

/// Sum program totals per category, in rule-table order.
pub fn map_categories(rows: &[ProgramRow]) -> Vec<CategoryTotal> {
    CATEGORY_RULES
        .iter()
        .map(|rule| CategoryTotal {
            category: rule.category,
            total_cents: rows
                .iter()
                .filter(|row| rule.matches(&row.line_item))
                .map(|row| row.total_cents)
                .sum(),
        })
        .collect()
}

/// Sum of rows mentioning the indirect keyword, or `None` if no row does.
pub fn indirect_amount(rows: &[ProgramRow]) -> Option<i64> {
    let needle = INDIRECT_KEYWORD.to_lowercase();
    let matching: Vec<&ProgramRow> = rows
        .iter()
        .filter(|row| row.line_item.to_lowercase().contains(&needle))
        .collect();
    if matching.is_empty() {
        None
    } else {
        Some(matching.iter().map(|row| row.total_cents).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::generate_program;
    use crate::locality::LocalityFactor;

    fn total_for(totals: &[CategoryTotal], category: FederalCategory) -> i64 {
        totals
            .iter()
            .find(|t| t.category == category)
            .map(|t| t.total_cents)
            .unwrap()
    }

    #[test]
    fn baseline_program_rollup() {
        let totals = map_categories(&generate_program(LocalityFactor::BASELINE));
        assert_eq!(totals.len(), 7);
        assert_eq!(total_for(&totals, FederalCategory::Personnel), 19_680_000);
        assert_eq!(total_for(&totals, FederalCategory::FringeBenefits), 5_904_000);
        assert_eq!(total_for(&totals, FederalCategory::Travel), 1_250_000);
        assert_eq!(total_for(&totals, FederalCategory::Equipment), 0);
        assert_eq!(total_for(&totals, FederalCategory::Supplies), 1_980_000);
        assert_eq!(total_for(&totals, FederalCategory::Contractual), 0);
        // Training 5,000 + Communications 2,400 + Indirect 29,554
        assert_eq!(total_for(&totals, FederalCategory::Other), 3_695_400);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(categories_for("program DIRECTOR"), vec![FederalCategory::Personnel]);
        assert_eq!(categories_for("staff travel"), vec![FederalCategory::Travel]);
        assert!(categories_for("Consultant fees").is_empty());
    }

    #[test]
    fn row_counts_once_per_category() {
        // Two Other keywords on one row still count the row once.
        let rows = vec![ProgramRow::new("Indirect Training", 1.0, 10_000)];
        let totals = map_categories(&rows);
        assert_eq!(total_for(&totals, FederalCategory::Other), 10_000);
        assert_eq!(indirect_amount(&rows), Some(10_000));
    }

    #[test]
    fn row_can_land_in_several_categories() {
        let rows = vec![ProgramRow::new("Equipment Manager (0.5 FTE)", 6.0, 50_000)];
        let totals = map_categories(&rows);
        assert_eq!(total_for(&totals, FederalCategory::Personnel), 300_000);
        assert_eq!(total_for(&totals, FederalCategory::Equipment), 300_000);
        assert_eq!(
            categories_for("Equipment Manager (0.5 FTE)"),
            vec![FederalCategory::Personnel, FederalCategory::Equipment]
        );
    }

    #[test]
    fn no_indirect_row() {
        let rows = vec![ProgramRow::new("Office Supplies", 12.0, 40_000)];
        assert_eq!(indirect_amount(&rows), None);
    }

    #[test]
    fn contractual_never_matches() {
        assert!(!CATEGORY_RULES[5].matches("Contractual services"));
    }
}
