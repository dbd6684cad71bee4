//! Sales register models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::serde_helpers;
use crate::error::RegisterResult;
use crate::reconciliation::{MismatchKind, Reconciliation};
use crate::validation::{validate_non_negative, validate_positive};

/// Work period a sales entry is attributed to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Shift {
    #[default]
    Morning,
    Evening,
    Night,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Morning, Shift::Evening, Shift::Night];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shift::Morning => "Morning",
            Shift::Evening => "Evening",
            Shift::Night => "Night",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Shift::ALL
            .into_iter()
            .find(|shift| shift.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finalized, persisted sales register entry.
///
/// The derived fields are a frozen snapshot taken at submission and are
/// never recomputed from a live form afterwards. Readings and amounts are
/// stored as JSON numbers, the layout the browser dashboard reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalesRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub shift: Shift,
    pub attendant: String,
    #[serde(deserialize_with = "serde_helpers::pump_number")]
    pub pump_no: u32,
    #[serde(with = "serde_helpers::number", default)]
    pub opening_reading: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub closing_reading: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub test_sales: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub rate: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub total_liters: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub expected_amount: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub actual_amount: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub cash_sales: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub card_sales: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub upi_sales: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub credit_sales: Decimal,
    #[serde(with = "serde_helpers::number", default)]
    pub short_excess: Decimal,
    pub created_at: DateTime<Utc>,
}

impl SalesRecord {
    /// Freeze a validated input into a record
    pub fn new(
        id: i64,
        input: SalesEntryInput,
        created_at: DateTime<Utc>,
    ) -> RegisterResult<Self> {
        let derived = Reconciliation::compute(&input)?;
        Ok(Self {
            id,
            date: input.date,
            shift: input.shift,
            attendant: input.attendant,
            pump_no: input.pump_no,
            opening_reading: input.opening_reading,
            closing_reading: input.closing_reading,
            test_sales: input.test_sales,
            rate: input.rate,
            total_liters: derived.total_liters,
            expected_amount: derived.expected_amount,
            actual_amount: derived.actual_amount,
            cash_sales: input.cash_sales,
            card_sales: input.card_sales,
            upi_sales: input.upi_sales,
            credit_sales: input.credit_sales,
            short_excess: derived.short_excess,
            created_at,
        })
    }

    /// The raw inputs this record was created from
    pub fn input(&self) -> SalesEntryInput {
        SalesEntryInput {
            date: self.date,
            shift: self.shift,
            attendant: self.attendant.clone(),
            pump_no: self.pump_no,
            opening_reading: self.opening_reading,
            closing_reading: self.closing_reading,
            test_sales: self.test_sales,
            rate: self.rate,
            cash_sales: self.cash_sales,
            card_sales: self.card_sales,
            upi_sales: self.upi_sales,
            credit_sales: self.credit_sales,
        }
    }

    /// The frozen derived snapshot
    pub fn reconciliation(&self) -> Reconciliation {
        Reconciliation {
            total_liters: self.total_liters,
            expected_amount: self.expected_amount,
            actual_amount: self.actual_amount,
            short_excess: self.short_excess,
        }
    }

    pub fn classification(&self) -> MismatchKind {
        crate::reconciliation::classify(self.short_excess)
    }
}

/// Typed sales entry input, produced by [`crate::validation::parse_sales_form`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct SalesEntryInput {
    pub date: NaiveDate,
    pub shift: Shift,
    #[validate(length(min = 1, message = "Attendant name is required"))]
    pub attendant: String,
    #[validate(range(min = 1, message = "Pump number must be at least 1"))]
    pub pump_no: u32,
    #[validate(custom = "validate_non_negative")]
    pub opening_reading: Decimal,
    /// May be lower than the opening reading (meter rollover, entry error)
    pub closing_reading: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub test_sales: Decimal,
    #[validate(custom = "validate_positive")]
    pub rate: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub cash_sales: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub card_sales: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub upi_sales: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub credit_sales: Decimal,
}

/// Raw form payload as submitted by the dashboard.
///
/// Every value is the untouched text of the matching input element.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SalesEntryForm {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub attendant: Option<String>,
    #[serde(default)]
    pub pump_no: Option<String>,
    #[serde(default)]
    pub opening_reading: Option<String>,
    #[serde(default)]
    pub closing_reading: Option<String>,
    #[serde(default)]
    pub test_sales: Option<String>,
    #[serde(default)]
    pub rate: Option<String>,
    #[serde(default)]
    pub cash_sales: Option<String>,
    #[serde(default)]
    pub card_sales: Option<String>,
    #[serde(default)]
    pub upi_sales: Option<String>,
    #[serde(default)]
    pub credit_sales: Option<String>,
}

impl SalesEntryForm {
    /// Blank form as first shown: date set to `today`, first shift selected
    pub fn for_date(today: NaiveDate) -> Self {
        Self {
            date: Some(today.format("%Y-%m-%d").to_string()),
            shift: Some(Shift::default().as_str().to_string()),
            ..Default::default()
        }
    }
}
