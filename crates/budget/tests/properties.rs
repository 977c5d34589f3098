// Property tests for the allocation and scaling arithmetic.
// Run with: cargo test -p grantbudget-engine --test properties

use proptest::prelude::*;

use grantbudget_engine::allocate::{allocate_shares, split_match, MatchMode};
use grantbudget_engine::formula::{generate_operating, generate_program, OPERATING_TEMPLATE};
use grantbudget_engine::locality::LocalityFactor;
use grantbudget_engine::money::to_cents;

proptest! {
    #[test]
    fn allocation_sums_are_exact(
        weights in prop::collection::vec(0i64..10_000_000, 1..12),
        federal in 0i64..1_000_000_000,
        matching in 0i64..1_000_000_000,
    ) {
        prop_assume!(weights.iter().sum::<i64>() > 0);
        let a = allocate_shares(&weights, federal, matching);
        prop_assert_eq!(a.federal_cents.len(), weights.len());
        prop_assert_eq!(a.federal_cents.iter().sum::<i64>(), federal);
        prop_assert_eq!(a.match_cents.iter().sum::<i64>(), matching);
    }

    #[test]
    fn zero_weight_rows_stay_zero_except_last(
        weights in prop::collection::vec(0i64..1_000, 2..10),
        federal in 0i64..10_000_000,
    ) {
        prop_assume!(weights.iter().sum::<i64>() > 0);
        let a = allocate_shares(&weights, federal, 0);
        let last = weights.len() - 1;
        for (i, w) in weights.iter().enumerate() {
            if *w == 0 && i != last {
                prop_assert_eq!(a.federal_cents[i], 0);
            }
        }
    }

    #[test]
    fn operating_amounts_follow_exponents(f in 0.5f64..=2.0) {
        let factor = LocalityFactor::new(f).unwrap();
        let rows = generate_operating(factor);
        for (row, (category, baseline, exponent)) in rows.iter().zip(OPERATING_TEMPLATE) {
            prop_assert_eq!(row.category.as_str(), *category);
            prop_assert_eq!(row.amount_cents, to_cents(baseline * f.powf(*exponent)));
        }
    }

    #[test]
    fn program_rows_hold_total_invariant(f in 0.5f64..=2.0) {
        let rows = generate_program(LocalityFactor::new(f).unwrap());
        for row in &rows {
            prop_assert_eq!(row.total_cents, (row.units * row.unit_cost_cents as f64).round() as i64);
        }
    }

    #[test]
    fn split_never_goes_negative(total in 0.0f64..5_000_000.0, pct in 0.0f64..=1.0) {
        for mode in [MatchMode::PercentOfTotal, MatchMode::PercentOfFederal] {
            let s = split_match(total, pct, mode);
            prop_assert!(s.federal_cents >= 0);
            prop_assert!(s.match_cents >= 0);
            prop_assert!((s.federal_cents + s.match_cents - s.total_cents).abs() <= 1);
        }
    }
}
