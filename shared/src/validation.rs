//! Form parsing and validation for sales register entries
//!
//! Required fields must be present and parseable; optional amounts fall back
//! to zero when left blank or mistyped.

use std::borrow::Cow;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use validator::{Validate, ValidationError};

use crate::error::{RegisterError, RegisterResult};
use crate::models::{SalesEntryForm, SalesEntryInput, Shift};
use crate::reconciliation::Reconciliation;

/// Form field names in the order they appear on the entry form
pub const FORM_FIELDS: [&str; 12] = [
    "date",
    "shift",
    "attendant",
    "pump_no",
    "opening_reading",
    "closing_reading",
    "test_sales",
    "rate",
    "cash_sales",
    "card_sales",
    "upi_sales",
    "credit_sales",
];

// ============================================================================
// Field Rules
// ============================================================================

/// Amounts and readings cannot be negative
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some(Cow::Borrowed("cannot be negative"));
        return Err(err);
    }
    Ok(())
}

/// Rate per liter must be strictly positive
pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some(Cow::Borrowed("must be greater than zero"));
        return Err(err);
    }
    Ok(())
}

// ============================================================================
// Raw Value Parsing
// ============================================================================

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(value: &'a Option<String>, field: &str) -> RegisterResult<&'a str> {
    present(value)
        .ok_or_else(|| RegisterError::validation(field, format!("{} is required", label(field))))
}

/// Plain or exponent notation, as a number input element accepts
fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn required_decimal(value: &Option<String>, field: &str) -> RegisterResult<Decimal> {
    let raw = required(value, field)?;
    parse_decimal(raw).ok_or_else(|| {
        RegisterError::validation(field, format!("{} must be a valid number", label(field)))
    })
}

/// Blank or mistyped optional amounts count as zero
pub fn decimal_or_zero(value: &Option<String>) -> Decimal {
    present(value)
        .and_then(parse_decimal)
        .unwrap_or(Decimal::ZERO)
}

/// Human readable label for a form field
pub fn label(field: &str) -> &'static str {
    match field {
        "date" => "Date",
        "shift" => "Shift",
        "attendant" => "Attendant",
        "pump_no" => "Pump number",
        "opening_reading" => "Opening reading",
        "closing_reading" => "Closing reading",
        "test_sales" => "Test sales",
        "rate" => "Rate",
        "cash_sales" => "Cash sales",
        "card_sales" => "Card sales",
        "upi_sales" => "UPI sales",
        "credit_sales" => "Credit sales",
        _ => "Field",
    }
}

// ============================================================================
// Form -> Input
// ============================================================================

/// Parse and validate a submitted form into a typed input
pub fn parse_sales_form(form: &SalesEntryForm) -> RegisterResult<SalesEntryInput> {
    let date = NaiveDate::parse_from_str(required(&form.date, "date")?, "%Y-%m-%d")
        .map_err(|_| RegisterError::validation("date", "Date must be in YYYY-MM-DD format"))?;

    let shift = Shift::from_str(required(&form.shift, "shift")?).ok_or_else(|| {
        RegisterError::validation("shift", "Shift must be one of Morning, Evening or Night")
    })?;

    let attendant = required(&form.attendant, "attendant")?.to_string();

    let pump_no = required(&form.pump_no, "pump_no")?
        .parse::<u32>()
        .map_err(|_| RegisterError::validation("pump_no", "Pump number must be a whole number"))?;

    let input = SalesEntryInput {
        date,
        shift,
        attendant,
        pump_no,
        opening_reading: required_decimal(&form.opening_reading, "opening_reading")?,
        closing_reading: required_decimal(&form.closing_reading, "closing_reading")?,
        test_sales: decimal_or_zero(&form.test_sales),
        rate: required_decimal(&form.rate, "rate")?,
        cash_sales: decimal_or_zero(&form.cash_sales),
        card_sales: decimal_or_zero(&form.card_sales),
        upi_sales: decimal_or_zero(&form.upi_sales),
        credit_sales: decimal_or_zero(&form.credit_sales),
    };

    validate_input(&input)?;
    Ok(input)
}

/// Run the field rules, reporting the first failing field in form order
pub fn validate_input(input: &SalesEntryInput) -> RegisterResult<()> {
    let Err(errors) = input.validate() else {
        return Ok(());
    };

    let field_errors = errors.field_errors();
    let (field, detail) = FORM_FIELDS
        .iter()
        .find_map(|field| {
            field_errors
                .get(field)
                .and_then(|errs| errs.first())
                .map(|err| (*field, err))
        })
        .ok_or_else(|| RegisterError::validation("form", "Invalid sales entry"))?;

    let message = match &detail.message {
        Some(msg) if msg.starts_with(char::is_uppercase) => msg.to_string(),
        Some(msg) => format!("{} {}", label(field), msg),
        None => format!("{} is invalid", label(field)),
    };
    Err(RegisterError::validation(field, message))
}

/// Live recompute for a partially filled form.
///
/// Every numeric field, required or not, reads as zero until it holds a
/// number. Figures too large to represent read as zero as well. Never fails.
pub fn preview(form: &SalesEntryForm) -> Reconciliation {
    let figures = Reconciliation::from_parts(
        decimal_or_zero(&form.opening_reading),
        decimal_or_zero(&form.closing_reading),
        decimal_or_zero(&form.test_sales),
        decimal_or_zero(&form.rate),
        [
            decimal_or_zero(&form.cash_sales),
            decimal_or_zero(&form.card_sales),
            decimal_or_zero(&form.upi_sales),
            decimal_or_zero(&form.credit_sales),
        ],
    );
    figures.unwrap_or_else(|| {
        tracing::debug!("Preview figures overflowed, showing zeros");
        Reconciliation::default()
    })
}
