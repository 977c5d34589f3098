use serde::Serialize;

use crate::allocate::{resolve_total_cost, split_match, MatchRule, TargetAmount};
use crate::federal::{build_federal_table, find_row};
use crate::formula::{generate_operating, generate_program};
use crate::locality::LocalityFactor;
use crate::model::{
    normalize_program_rows, BudgetMeta, BudgetPackage, BudgetSummary, FederalCategory, FederalRow,
    MatchSplit, OperatingRow, ProgramRow,
};

/// Everything one run depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetParams {
    pub factor: LocalityFactor,
    pub rule: MatchRule,
    pub target: Option<TargetAmount>,
}

/// Generate all three tables from one parameter set.
pub fn run(params: &BudgetParams) -> BudgetPackage {
    let operating = generate_operating(params.factor);
    let mut program = generate_program(params.factor);
    let (split, federal) = rebuild_federal(&mut program, params);
    let summary = summarize(&operating, &program, &federal);

    log::info!(
        "generated budget at factor {}: program {} / federal request {}",
        params.factor,
        summary.total_program_cents,
        summary.federal_request_cents
    );

    BudgetPackage {
        meta: meta(params, split),
        operating,
        program,
        federal,
        summary,
    }
}

/// Re-derive the federal table from (possibly edited) program rows.
///
/// Program totals are re-asserted from `units * unit_cost` first.
pub fn rebuild_federal(program: &mut [ProgramRow], params: &BudgetParams) -> (MatchSplit, Vec<FederalRow>) {
    let corrected = normalize_program_rows(program);
    if corrected > 0 {
        log::info!("re-asserted totals on {corrected} edited program row(s)");
    }

    let program_total: i64 = program.iter().map(|r| r.total_cents).sum();
    let total_cost = resolve_total_cost(program_total, &params.rule, params.target.as_ref());
    let split = split_match(total_cost, params.rule.value, params.rule.mode);
    (split, build_federal_table(program, &split))
}

/// Headline figures for the three tables.
pub fn summarize(operating: &[OperatingRow], program: &[ProgramRow], federal: &[FederalRow]) -> BudgetSummary {
    let federal_share_sum: i64 = federal.iter().map(|r| r.federal_cents).sum();
    let federal_request = find_row(federal, FederalCategory::TotalProjectCosts)
        .map(|r| r.total_cents)
        .unwrap_or(federal_share_sum);

    BudgetSummary {
        total_operating_cents: operating.iter().map(|r| r.amount_cents).sum(),
        total_program_cents: program.iter().map(|r| r.total_cents).sum(),
        federal_request_cents: federal_request,
        federal_share_sum_cents: federal_share_sum,
        non_federal_share_sum_cents: federal.iter().map(|r| r.non_federal_cents).sum(),
        federal_total_sum_cents: federal.iter().map(|r| r.total_cents).sum(),
    }
}

fn meta(params: &BudgetParams, split: MatchSplit) -> BudgetMeta {
    BudgetMeta {
        locality_factor: params.factor.value(),
        match_mode: params.rule.mode.to_string(),
        match_fraction: params.rule.value,
        split,
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocate::{MatchMode, TargetInterpretation};

    fn params(mode: MatchMode, percent: f64, target: Option<TargetAmount>) -> BudgetParams {
        BudgetParams {
            factor: LocalityFactor::BASELINE,
            rule: MatchRule::from_percent(mode, percent).unwrap(),
            target,
        }
    }

    #[test]
    fn baseline_run() {
        let pkg = run(&params(MatchMode::PercentOfTotal, 25.0, None));
        assert_eq!(pkg.operating.len(), 9);
        assert_eq!(pkg.program.len(), 10);
        assert_eq!(pkg.federal.len(), 10);
        assert_eq!(pkg.summary.total_operating_cents, 84_000_000);
        assert_eq!(pkg.summary.total_program_cents, 32_509_400);
        assert_eq!(pkg.meta.split.total_cents, 32_509_400);
        assert_eq!(pkg.meta.match_mode, "percent_of_total");
        assert_eq!(pkg.summary.federal_request_cents, 32_509_400 + 2_955_400);
    }

    #[test]
    fn runs_are_independent() {
        let p = params(MatchMode::PercentOfFederal, 10.0, None);
        let a = run(&p);
        let _other = run(&params(MatchMode::PercentOfTotal, 50.0, None));
        let b = run(&p);
        assert_eq!(a.program, b.program);
        assert_eq!(a.federal, b.federal);
        assert_eq!(a.operating, b.operating);
    }

    #[test]
    fn federal_target_is_back_derived() {
        let target = TargetAmount {
            amount_cents: 30_000_000,
            interpretation: TargetInterpretation::FederalShare,
        };
        let pkg = run(&params(MatchMode::PercentOfTotal, 25.0, Some(target)));
        assert_eq!(pkg.meta.split.total_cents, 40_000_000);
        assert_eq!(pkg.meta.split.federal_cents, 30_000_000);
        assert_eq!(pkg.meta.split.match_cents, 10_000_000);
        let direct = find_row(&pkg.federal, FederalCategory::TotalDirectCosts).unwrap();
        assert_eq!(direct.federal_cents, 30_000_000);
    }

    #[test]
    fn total_target_replaces_program_total() {
        let target = TargetAmount {
            amount_cents: 20_000_000,
            interpretation: TargetInterpretation::TotalProjectCost,
        };
        let pkg = run(&params(MatchMode::PercentOfFederal, 25.0, Some(target)));
        assert_eq!(pkg.meta.split.total_cents, 20_000_000);
        assert_eq!(pkg.meta.split.federal_cents, 16_000_000);
        assert_eq!(pkg.meta.split.match_cents, 4_000_000);
    }

    #[test]
    fn edited_program_is_normalized_before_rollup() {
        let p = params(MatchMode::PercentOfTotal, 0.0, None);
        let mut program = generate_program(LocalityFactor::BASELINE);
        // Edit units without touching the stale total.
        program[0].units = 6.0;
        let (split, federal) = rebuild_federal(&mut program, &p);

        assert_eq!(program[0].total_cents, 3_900_000);
        let expected_total: i64 = program.iter().map(|r| r.total_cents).sum();
        assert_eq!(split.total_cents, expected_total);
        let personnel = find_row(&federal, FederalCategory::Personnel).unwrap();
        assert_eq!(personnel.total_cents, 3_900_000 + 10_080_000 + 1_800_000);
    }

    #[test]
    fn edited_fringe_total_reaches_federal_table() {
        let p = params(MatchMode::PercentOfTotal, 0.0, None);
        let mut program = generate_program(LocalityFactor::BASELINE);
        let fringe = program
            .iter_mut()
            .find(|r| r.line_item == crate::formula::FRINGE_LABEL)
            .unwrap();
        fringe.total_cents = 6_000_000;
        let (_, federal) = rebuild_federal(&mut program, &p);

        let fringe_row = find_row(&federal, FederalCategory::FringeBenefits).unwrap();
        assert_eq!(fringe_row.total_cents, 6_000_000);
        assert_eq!(fringe_row.federal_cents, 6_000_000);
    }

    #[test]
    fn summary_falls_back_to_federal_share_sum() {
        let federal = vec![
            FederalRow::new(FederalCategory::Personnel, 1_000, 500),
            FederalRow::new(FederalCategory::Travel, 2_000, 0),
        ];
        let s = summarize(&[], &[], &federal);
        assert_eq!(s.federal_request_cents, 3_000);
        assert_eq!(s.non_federal_share_sum_cents, 500);
        assert_eq!(s.federal_total_sum_cents, 3_500);
    }
}
