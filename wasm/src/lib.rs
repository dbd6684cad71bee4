//! WebAssembly module for the Fuel Station Sales Register
//!
//! Provides client-side computation and persistence for:
//! - Live reconciliation while the entry form is being filled
//! - Saving, listing, filtering and deleting entries in `localStorage`
//! - CSV export, the detail view and the printable slip

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

mod storage;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::reconciliation::*;
pub use shared::types::*;
pub use storage::{BrowserClock, LocalStorage};

use shared::{
    export_file_name, preview, render_details, render_print_html, Clock, RegisterError,
    RegisterResult, SalesEntryForm, SalesRegister,
};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("Sales register module loaded"));
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

/// Results that overflow read as zero, like unparsable inputs do
fn to_f64(value: Option<Decimal>) -> f64 {
    value.and_then(|v| v.to_f64()).unwrap_or(0.0)
}

/// Log to the browser console and hand the error body to JavaScript
fn to_js(err: RegisterError) -> JsValue {
    web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
    let body = serde_json::to_string(&err.detail()).unwrap_or_else(|_| err.to_string());
    JsValue::from_str(&body)
}

fn open_register() -> RegisterResult<SalesRegister<LocalStorage, BrowserClock>> {
    Ok(SalesRegister::with_clock(LocalStorage::open()?, BrowserClock))
}

fn find_record(
    register: &SalesRegister<LocalStorage, BrowserClock>,
    id: f64,
) -> RegisterResult<SalesRecord> {
    let id = id as i64;
    register.find(id)?.ok_or(RegisterError::NotFound(id))
}

fn parse_filter_date(filter_date: Option<String>) -> RegisterResult<Option<NaiveDate>> {
    match filter_date.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
            RegisterError::validation("filter_date", "Date must be in YYYY-MM-DD format")
        }),
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

/// Liters sold: closing - opening - test sales
#[wasm_bindgen]
pub fn calculate_total_liters(opening: f64, closing: f64, test_sales: f64) -> f64 {
    to_f64(compute_liters(
        to_decimal(opening),
        to_decimal(closing),
        to_decimal(test_sales),
    ))
}

#[wasm_bindgen]
pub fn calculate_expected_amount(total_liters: f64, rate: f64) -> f64 {
    to_f64(compute_expected(to_decimal(total_liters), to_decimal(rate)))
}

#[wasm_bindgen]
pub fn calculate_actual_amount(cash: f64, card: f64, upi: f64, credit: f64) -> f64 {
    to_f64(compute_actual(
        to_decimal(cash),
        to_decimal(card),
        to_decimal(upi),
        to_decimal(credit),
    ))
}

#[wasm_bindgen]
pub fn calculate_short_excess(actual_amount: f64, expected_amount: f64) -> f64 {
    to_f64(compute_mismatch(
        to_decimal(actual_amount),
        to_decimal(expected_amount),
    ))
}

/// "shortage", "excess" or "match"
#[wasm_bindgen]
pub fn classify_short_excess(short_excess: f64) -> String {
    classify(to_decimal(short_excess)).as_str().to_string()
}

/// "Shortage: ₹x.xx", "Excess: ₹x.xx" or "Perfect Match"
#[wasm_bindgen]
pub fn describe_short_excess(short_excess: f64) -> String {
    describe_mismatch(to_decimal(short_excess))
}

/// Signed history table cell, e.g. "-₹12.50"
#[wasm_bindgen]
pub fn format_short_excess(short_excess: f64) -> String {
    format_signed_mismatch(to_decimal(short_excess))
}

/// Display values for the live summary panel
#[derive(Debug, Serialize)]
struct PreviewView {
    total_liters: String,
    expected_amount: String,
    actual_amount: String,
    short_excess: String,
    classification: MismatchKind,
    color: &'static str,
}

fn preview_form_json(form_json: &str) -> RegisterResult<String> {
    let form: SalesEntryForm = serde_json::from_str(form_json)?;
    let r = preview(&form);
    let view = PreviewView {
        total_liters: format_amount(r.total_liters),
        expected_amount: format_amount(r.expected_amount),
        actual_amount: format_amount(r.actual_amount),
        short_excess: format_amount(r.short_excess),
        classification: r.classification(),
        color: r.classification().color(),
    };
    Ok(serde_json::to_string(&view)?)
}

/// Recompute the summary panel from the current form values (JSON object of
/// field name to input text)
#[wasm_bindgen]
pub fn preview_sales_form(form_json: &str) -> Result<String, JsValue> {
    preview_form_json(form_json).map_err(to_js)
}

fn blank_form_json(today: NaiveDate) -> RegisterResult<String> {
    Ok(serde_json::to_string(&SalesEntryForm::for_date(today))?)
}

/// Initial form values: today's date and the first shift
#[wasm_bindgen]
pub fn blank_sales_form() -> Result<String, JsValue> {
    blank_form_json(BrowserClock.now().date_naive()).map_err(to_js)
}

// ============================================================================
// Record Store
// ============================================================================

/// Validate and persist a submitted form. Returns the saved record as JSON.
#[wasm_bindgen]
pub fn save_sales_entry(form_json: &str) -> Result<String, JsValue> {
    let saved = (|| -> RegisterResult<String> {
        let form: SalesEntryForm = serde_json::from_str(form_json)
            .map_err(|e| RegisterError::validation("form", e.to_string()))?;
        let record = open_register()?.create(&form)?;
        Ok(serde_json::to_string(&record)?)
    })();
    saved.map_err(to_js)
}

/// History, optionally restricted to one `YYYY-MM-DD` date, newest first
#[wasm_bindgen]
pub fn list_sales(filter_date: Option<String>) -> Result<String, JsValue> {
    let listed = (|| -> RegisterResult<String> {
        let date = parse_filter_date(filter_date)?;
        let records = open_register()?.list(date)?;
        Ok(serde_json::to_string(&records)?)
    })();
    listed.map_err(to_js)
}

/// Delete an entry after the user confirmed. `false` when it was already gone.
#[wasm_bindgen]
pub fn delete_sales_entry(id: f64) -> Result<bool, JsValue> {
    open_register()
        .and_then(|mut register| register.delete(id as i64))
        .map_err(to_js)
}

/// CSV of every entry; fails with `EMPTY_EXPORT` when there is nothing to export
#[wasm_bindgen]
pub fn export_sales_csv() -> Result<String, JsValue> {
    open_register()
        .and_then(|register| register.export_csv())
        .map_err(to_js)
}

/// Download name for today's export
#[wasm_bindgen]
pub fn export_sales_file_name() -> String {
    export_file_name(BrowserClock.now().date_naive())
}

/// Plain-text detail view
#[wasm_bindgen]
pub fn sales_details(id: f64) -> Result<String, JsValue> {
    open_register()
        .and_then(|register| find_record(&register, id))
        .map(|record| render_details(&record))
        .map_err(to_js)
}

/// Printable HTML slip, written into a new window by the caller
#[wasm_bindgen]
pub fn sales_print_html(id: f64) -> Result<String, JsValue> {
    open_register()
        .and_then(|register| find_record(&register, id))
        .map(|record| render_print_html(&record))
        .map_err(to_js)
}

/// Toast for a finished action, as JSON `{level, message}`
#[wasm_bindgen]
pub fn notification_for(action: &str) -> String {
    let note = match action {
        "save" => Notification::entry_saved(),
        "save_and_print" => Notification::entry_saved_and_printed(),
        "delete" => Notification::entry_deleted(),
        "export" => Notification::exported(),
        _ => Notification::warning(format!("Unknown action: {}", action)),
    };
    serde_json::to_string(&note).unwrap_or_default()
}

/// Toast display time in milliseconds
#[wasm_bindgen]
pub fn notification_timeout_ms() -> u32 {
    NOTIFICATION_TIMEOUT_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculations() {
        assert!((calculate_total_liters(100.0, 150.0, 2.0) - 48.0).abs() < 0.001);
        assert!((calculate_expected_amount(48.0, 90.0) - 4320.0).abs() < 0.001);
        assert!((calculate_actual_amount(3000.0, 1000.0, 500.0, 0.0) - 4500.0).abs() < 0.001);
        assert!((calculate_short_excess(4500.0, 4320.0) - 180.0).abs() < 0.001);
    }

    #[test]
    fn test_overflowing_calculation_reads_as_zero() {
        assert_eq!(calculate_expected_amount(5.0e28, 2.0), 0.0);
        assert_eq!(calculate_actual_amount(5.0e28, 5.0e28, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_preview_overflow_reads_as_zero() {
        let json = preview_form_json(
            r#"{"closing_reading":"79228162514264337593543950335","rate":"2"}"#,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["expected_amount"], "0.00");
        assert_eq!(value["classification"], "match");
    }

    #[test]
    fn test_negative_liters_pass_through() {
        assert!((calculate_total_liters(150.0, 100.0, 0.0) + 50.0).abs() < 0.001);
    }

    #[test]
    fn test_classify_short_excess() {
        assert_eq!(classify_short_excess(-0.5), "shortage");
        assert_eq!(classify_short_excess(12.0), "excess");
        assert_eq!(classify_short_excess(0.0), "match");
    }

    #[test]
    fn test_mismatch_text() {
        assert_eq!(describe_short_excess(-320.0), "Shortage: ₹320.00");
        assert_eq!(format_short_excess(-320.0), "-₹320.00");
        assert_eq!(format_short_excess(0.0), "+₹0.00");
    }

    #[test]
    fn test_preview_json() {
        let json = preview_form_json(
            r#"{"opening_reading":"100","closing_reading":"150","test_sales":"2","rate":"90",
                "cash_sales":"3000","card_sales":"1000","upi_sales":"500","credit_sales":""}"#,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_liters"], "48.00");
        assert_eq!(value["expected_amount"], "4320.00");
        assert_eq!(value["short_excess"], "180.00");
        assert_eq!(value["classification"], "excess");
        assert_eq!(value["color"], "green");
    }

    #[test]
    fn test_preview_rejects_unknown_fields() {
        assert!(preview_form_json(r#"{"volume":"3"}"#).is_err());
    }

    #[test]
    fn test_blank_form() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let json = blank_form_json(today).unwrap();
        let form: SalesEntryForm = serde_json::from_str(&json).unwrap();
        assert_eq!(form.date.as_deref(), Some("2024-01-05"));
        assert_eq!(form.shift.as_deref(), Some("Morning"));
        assert!(form.attendant.is_none());
    }

    #[test]
    fn test_filter_date_parsing() {
        assert_eq!(parse_filter_date(None).unwrap(), None);
        assert_eq!(parse_filter_date(Some(" ".into())).unwrap(), None);
        assert_eq!(
            parse_filter_date(Some("2024-01-05".into())).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert!(parse_filter_date(Some("05/01/2024".into())).is_err());
    }

    #[test]
    fn test_notification_for() {
        let note: Notification = serde_json::from_str(&notification_for("export")).unwrap();
        assert_eq!(note.message, "Sales data exported successfully");
        assert_eq!(note.level, NotificationLevel::Success);
    }
}
