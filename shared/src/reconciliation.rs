//! Sales reconciliation engine
//!
//! Turns meter readings and payment channel totals into the derived figures
//! of a sales entry. All computations run at full decimal precision; values
//! are rounded to two places only when formatted for display.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{RegisterError, RegisterResult};
use crate::models::SalesEntryInput;
use crate::validation::label;

/// Currency symbol used in rendered amounts
pub const CURRENCY_SYMBOL: &str = "₹";

/// Liters dispensed during the shift: `closing - opening - test_sales`.
///
/// Not clamped: a closing reading below the opening one yields a negative
/// figure. `None` when the result does not fit a `Decimal`.
pub fn compute_liters(opening: Decimal, closing: Decimal, test_sales: Decimal) -> Option<Decimal> {
    closing.checked_sub(opening)?.checked_sub(test_sales)
}

/// Revenue the meters say should have been collected
pub fn compute_expected(total_liters: Decimal, rate: Decimal) -> Option<Decimal> {
    total_liters.checked_mul(rate)
}

/// Money the attendant actually reported across all payment channels
pub fn compute_actual(
    cash: Decimal,
    card: Decimal,
    upi: Decimal,
    credit: Decimal,
) -> Option<Decimal> {
    cash.checked_add(card)?.checked_add(upi)?.checked_add(credit)
}

/// Short/excess: `actual - expected`
pub fn compute_mismatch(actual_amount: Decimal, expected_amount: Decimal) -> Option<Decimal> {
    actual_amount.checked_sub(expected_amount)
}

/// Mismatch classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    Shortage,
    Excess,
    Match,
}

impl MismatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MismatchKind::Shortage => "shortage",
            MismatchKind::Excess => "excess",
            MismatchKind::Match => "match",
        }
    }

    /// Highlight color used by the history table and printouts
    pub fn color(&self) -> &'static str {
        match self {
            MismatchKind::Shortage => "red",
            MismatchKind::Excess => "green",
            MismatchKind::Match => "orange",
        }
    }
}

impl std::fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MismatchKind::Shortage => write!(f, "Shortage"),
            MismatchKind::Excess => write!(f, "Excess"),
            MismatchKind::Match => write!(f, "Perfect Match"),
        }
    }
}

/// Classify a short/excess value by its sign
pub fn classify(short_excess: Decimal) -> MismatchKind {
    if short_excess.is_sign_negative() && !short_excess.is_zero() {
        MismatchKind::Shortage
    } else if short_excess > Decimal::ZERO {
        MismatchKind::Excess
    } else {
        MismatchKind::Match
    }
}

/// Derived figures of a sales entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Reconciliation {
    pub total_liters: Decimal,
    pub expected_amount: Decimal,
    pub actual_amount: Decimal,
    pub short_excess: Decimal,
}

impl Reconciliation {
    /// Run the whole engine over a typed input.
    ///
    /// A figure too large to represent is reported against the field that
    /// drives it.
    pub fn compute(input: &SalesEntryInput) -> RegisterResult<Self> {
        Self::checked(
            input.opening_reading,
            input.closing_reading,
            input.test_sales,
            input.rate,
            [
                input.cash_sales,
                input.card_sales,
                input.upi_sales,
                input.credit_sales,
            ],
        )
        .map_err(|field| {
            RegisterError::validation(field, format!("{} value is too large", label(field)))
        })
    }

    /// `payments` is `[cash, card, upi, credit]`. `None` on overflow.
    pub fn from_parts(
        opening: Decimal,
        closing: Decimal,
        test_sales: Decimal,
        rate: Decimal,
        payments: [Decimal; 4],
    ) -> Option<Self> {
        Self::checked(opening, closing, test_sales, rate, payments).ok()
    }

    fn checked(
        opening: Decimal,
        closing: Decimal,
        test_sales: Decimal,
        rate: Decimal,
        payments: [Decimal; 4],
    ) -> Result<Self, &'static str> {
        let total_liters =
            compute_liters(opening, closing, test_sales).ok_or("closing_reading")?;
        let expected_amount = compute_expected(total_liters, rate).ok_or("rate")?;
        let [cash, card, upi, credit] = payments;
        let actual_amount = compute_actual(cash, card, upi, credit).ok_or("cash_sales")?;
        let short_excess = compute_mismatch(actual_amount, expected_amount).ok_or("rate")?;

        tracing::debug!(
            %total_liters,
            %expected_amount,
            %actual_amount,
            %short_excess,
            "Reconciled sales figures"
        );

        Ok(Self {
            total_liters,
            expected_amount,
            actual_amount,
            short_excess,
        })
    }

    pub fn classification(&self) -> MismatchKind {
        classify(self.short_excess)
    }
}

/// Round half away from zero to two places, always showing two decimals
pub fn format_amount(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    if rounded.is_zero() {
        // Avoid "-0.00" for tiny negative values
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}

/// Mismatch text used by the detail view and printouts
pub fn describe_mismatch(short_excess: Decimal) -> String {
    match classify(short_excess) {
        MismatchKind::Shortage => format!(
            "Shortage: {}{}",
            CURRENCY_SYMBOL,
            format_amount(short_excess.abs())
        ),
        MismatchKind::Excess => {
            format!("Excess: {}{}", CURRENCY_SYMBOL, format_amount(short_excess))
        }
        MismatchKind::Match => MismatchKind::Match.to_string(),
    }
}

/// Signed mismatch cell for the history table, e.g. `-₹12.50`.
/// A perfect match renders with a plus sign.
pub fn format_signed_mismatch(short_excess: Decimal) -> String {
    let sign = if classify(short_excess) == MismatchKind::Shortage {
        '-'
    } else {
        '+'
    };
    format!(
        "{}{}{}",
        sign,
        CURRENCY_SYMBOL,
        format_amount(short_excess.abs())
    )
}
