//! Reconciliation engine tests
//!
//! Covers the liters / expected / actual / short-excess derivations and the
//! mismatch classification.

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    classify, compute_actual, compute_expected, compute_liters, compute_mismatch, format_amount,
    MismatchKind, Reconciliation,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// total_liters = closing - opening - test_sales
    #[test]
    fn test_liters_basic() {
        assert_eq!(compute_liters(dec("100"), dec("150"), dec("2")), Some(dec("48")));
    }

    #[test]
    fn test_liters_fractional_readings() {
        // 12345.67 -> 12890.12 with 5.5 L of test pumping
        let liters = compute_liters(dec("12345.67"), dec("12890.12"), dec("5.5")).unwrap();
        assert_eq!(liters, dec("538.95"));
    }

    #[test]
    fn test_liters_meter_rollover_is_not_clamped() {
        let liters = compute_liters(dec("99990"), dec("15"), dec("0")).unwrap();
        assert_eq!(liters, dec("-99975"));

        let expected = compute_expected(liters, dec("100")).unwrap();
        assert_eq!(expected, dec("-9997500"));
    }

    #[test]
    fn test_expected_amount() {
        assert_eq!(compute_expected(dec("48"), dec("90")), Some(dec("4320")));
        assert_eq!(compute_expected(dec("10.5"), dec("95.50")), Some(dec("1002.75")));
    }

    #[test]
    fn test_actual_amount() {
        let actual = compute_actual(dec("3000"), dec("1000"), dec("500"), dec("0"));
        assert_eq!(actual, Some(dec("4500")));
    }

    #[test]
    fn test_mismatch_sign() {
        assert_eq!(compute_mismatch(dec("4500"), dec("4320")), Some(dec("180")));
        assert_eq!(compute_mismatch(dec("4000"), dec("4320")), Some(dec("-320")));
    }

    /// Figures beyond the decimal range are reported, not wrapped
    #[test]
    fn test_overflow_is_detected() {
        let liters = dec("79228162514264337593543950335");
        assert_eq!(compute_expected(liters, dec("2")), None);
        assert_eq!(compute_liters(dec("-1"), liters, dec("0")), None);
        assert_eq!(compute_actual(liters, liters, dec("0"), dec("0")), None);
        assert_eq!(compute_mismatch(-liters, liters), None);
    }

    #[test]
    fn test_classify_exhaustive() {
        assert_eq!(classify(dec("-320")), MismatchKind::Shortage);
        assert_eq!(classify(dec("180")), MismatchKind::Excess);
        assert_eq!(classify(dec("0.00")), MismatchKind::Match);
    }

    #[test]
    fn test_classification_display() {
        assert_eq!(MismatchKind::Shortage.to_string(), "Shortage");
        assert_eq!(MismatchKind::Excess.to_string(), "Excess");
        assert_eq!(MismatchKind::Match.to_string(), "Perfect Match");
    }

    /// Scenario from the daily register: pump 1, morning shift
    #[test]
    fn test_full_scenario() {
        let r = Reconciliation::from_parts(
            dec("100"),
            dec("150"),
            dec("2"),
            dec("90"),
            [dec("3000"), dec("1000"), dec("500"), dec("0")],
        )
        .unwrap();

        assert_eq!(format_amount(r.total_liters), "48.00");
        assert_eq!(format_amount(r.expected_amount), "4320.00");
        assert_eq!(format_amount(r.actual_amount), "4500.00");
        assert_eq!(format_amount(r.short_excess), "180.00");
        assert_eq!(r.classification(), MismatchKind::Excess);
    }

    /// Rounding happens only when formatting
    #[test]
    fn test_full_precision_until_display() {
        let liters = compute_liters(dec("0"), dec("1.005"), dec("0")).unwrap();
        let expected = compute_expected(liters, dec("3")).unwrap();
        assert_eq!(expected, dec("3.015"));
        assert_eq!(format_amount(expected), "3.02");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Meter readings with two decimals, up to a million liters
    fn reading_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..100_000_000).prop_map(|n| Decimal::new(n, 2))
    }

    fn rate_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..50_000).prop_map(|n| Decimal::new(n, 2))
    }

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
    }

    fn signed_amount_strategy() -> impl Strategy<Value = Decimal> {
        (-10_000_000i64..10_000_000).prop_map(|n| Decimal::new(n, 2))
    }

    proptest! {
        /// Property: liters is exactly closing - opening - test, negatives included
        #[test]
        fn prop_liters_formula(
            opening in reading_strategy(),
            closing in reading_strategy(),
            test in reading_strategy()
        ) {
            let liters = compute_liters(opening, closing, test);
            prop_assert_eq!(liters, Some(closing - opening - test));
        }

        /// Property: expected amount is exact under decimal arithmetic
        #[test]
        fn prop_expected_formula(liters in signed_amount_strategy(), rate in rate_strategy()) {
            prop_assert_eq!(compute_expected(liters, rate), Some(liters * rate));
        }

        /// Property: actual amount does not depend on channel order
        #[test]
        fn prop_actual_commutative(
            cash in amount_strategy(),
            card in amount_strategy(),
            upi in amount_strategy(),
            credit in amount_strategy()
        ) {
            let a = compute_actual(cash, card, upi, credit);
            prop_assert_eq!(a, compute_actual(credit, upi, card, cash));
            prop_assert_eq!(a, compute_actual(upi, cash, credit, card));
            prop_assert_eq!(a, Some(cash + card + upi + credit));
        }

        /// Property: classification follows the sign, exclusively
        #[test]
        fn prop_classify_by_sign(value in signed_amount_strategy()) {
            let kind = classify(value);
            if value < Decimal::ZERO {
                prop_assert_eq!(kind, MismatchKind::Shortage);
            } else if value > Decimal::ZERO {
                prop_assert_eq!(kind, MismatchKind::Excess);
            } else {
                prop_assert_eq!(kind, MismatchKind::Match);
            }
        }

        /// Property: short/excess plus expected gives back actual
        #[test]
        fn prop_mismatch_balances(
            actual in amount_strategy(),
            expected in signed_amount_strategy()
        ) {
            let mismatch = compute_mismatch(actual, expected).unwrap();
            prop_assert_eq!(expected + mismatch, actual);
        }
    }
}
