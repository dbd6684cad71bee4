//! Read-only renderers for finalized sales records: CSV export, detail text
//! and the printable entry slip

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{RegisterError, RegisterResult};
use crate::models::SalesRecord;
use crate::reconciliation::{describe_mismatch, format_amount, CURRENCY_SYMBOL};

/// CSV header row, in column order
pub const CSV_HEADERS: [&str; 16] = [
    "Date",
    "Shift",
    "Attendant",
    "Pump No",
    "Opening Reading",
    "Closing Reading",
    "Test Sales",
    "Rate",
    "Total Liters",
    "Expected Amount",
    "Actual Amount",
    "Short/Excess",
    "Cash Sales",
    "Card Sales",
    "UPI Sales",
    "Credit Sales",
];

/// Raw inputs are written as entered, without padding zeros
fn raw(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Export records as CSV. Derived and payment columns carry two decimals.
pub fn export_csv(records: &[SalesRecord]) -> RegisterResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(CSV_HEADERS)?;
    for sale in records {
        wtr.write_record([
            sale.date.format("%Y-%m-%d").to_string(),
            sale.shift.to_string(),
            sale.attendant.clone(),
            sale.pump_no.to_string(),
            raw(sale.opening_reading),
            raw(sale.closing_reading),
            raw(sale.test_sales),
            raw(sale.rate),
            format_amount(sale.total_liters),
            format_amount(sale.expected_amount),
            format_amount(sale.actual_amount),
            format_amount(sale.short_excess),
            format_amount(sale.cash_sales),
            format_amount(sale.card_sales),
            format_amount(sale.upi_sales),
            format_amount(sale.credit_sales),
        ])?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| RegisterError::Serialization(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| RegisterError::Serialization(format!("UTF-8 conversion error: {}", e)))
}

/// Download name for an export made on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("sales_register_{}.csv", date.format("%Y-%m-%d"))
}

/// Plain-text detail view of a record
pub fn render_details(sale: &SalesRecord) -> String {
    let c = CURRENCY_SYMBOL;
    format!(
        "Sales Details:\n\n\
         Date: {date}\n\
         Shift: {shift}\n\
         Attendant: {attendant}\n\
         Pump: {pump}\n\n\
         Meter Readings:\n\
         Opening: {opening} L\n\
         Closing: {closing} L\n\
         Test Sales: {test} L\n\
         Rate: {c}{rate}/L\n\n\
         Calculations:\n\
         Total Liters: {liters}\n\
         Expected Amount: {c}{expected}\n\
         Actual Amount: {c}{actual}\n\
         {mismatch}\n\n\
         Payment Breakdown:\n\
         Cash: {c}{cash}\n\
         Card: {c}{card}\n\
         UPI: {c}{upi}\n\
         Credit: {c}{credit}",
        date = sale.date.format("%Y-%m-%d"),
        shift = sale.shift,
        attendant = sale.attendant,
        pump = sale.pump_no,
        opening = raw(sale.opening_reading),
        closing = raw(sale.closing_reading),
        test = raw(sale.test_sales),
        rate = raw(sale.rate),
        liters = format_amount(sale.total_liters),
        expected = format_amount(sale.expected_amount),
        actual = format_amount(sale.actual_amount),
        mismatch = describe_mismatch(sale.short_excess),
        cash = format_amount(sale.cash_sales),
        card = format_amount(sale.card_sales),
        upi = format_amount(sale.upi_sales),
        credit = format_amount(sale.credit_sales),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn row(label: &str, value: &str, class: &str) -> String {
    let class = if class.is_empty() {
        "row".to_string()
    } else {
        format!("row {}", class)
    };
    format!(
        "      <div class=\"{}\"><span>{}</span><span>{}</span></div>\n",
        class, label, value
    )
}

/// Standalone printable HTML slip for a record
pub fn render_print_html(sale: &SalesRecord) -> String {
    let c = CURRENCY_SYMBOL;
    let color = sale.classification().color();

    let mut html = String::new();
    html.push_str("<html>\n  <head>\n    <title>Sales Register Entry</title>\n    <style>\n");
    html.push_str("      body { font-family: Arial, sans-serif; padding: 20px; }\n");
    html.push_str("      .header { text-align: center; margin-bottom: 30px; }\n");
    html.push_str("      .details { margin: 20px 0; }\n");
    html.push_str(
        "      .row { display: flex; justify-content: space-between; margin: 10px 0; }\n",
    );
    html.push_str("      .total { font-weight: bold; font-size: 18px; margin-top: 20px; }\n");
    html.push_str(&format!(
        "      .mismatch {{ color: {}; font-weight: bold; }}\n",
        color
    ));
    html.push_str("    </style>\n  </head>\n  <body>\n");
    html.push_str("    <div class=\"header\">\n      <h1>Sales Register Entry</h1>\n");
    html.push_str(&format!(
        "      <p>Date: {}</p>\n    </div>\n",
        sale.date.format("%Y-%m-%d")
    ));

    html.push_str("    <div class=\"details\">\n");
    html.push_str(&row("Shift:", sale.shift.as_str(), ""));
    html.push_str(&row("Attendant:", &escape_html(&sale.attendant), ""));
    html.push_str(&row("Pump No:", &sale.pump_no.to_string(), ""));
    html.push_str("      <hr>\n");
    html.push_str(&row("Opening Reading:", &format!("{} L", raw(sale.opening_reading)), ""));
    html.push_str(&row("Closing Reading:", &format!("{} L", raw(sale.closing_reading)), ""));
    html.push_str(&row("Test Sales:", &format!("{} L", raw(sale.test_sales)), ""));
    html.push_str(&row("Rate:", &format!("{}{}/L", c, raw(sale.rate)), ""));
    html.push_str("      <hr>\n");
    html.push_str(&row(
        "Total Sales:",
        &format!("{} L", format_amount(sale.total_liters)),
        "total",
    ));
    html.push_str(&row(
        "Expected Amount:",
        &format!("{}{}", c, format_amount(sale.expected_amount)),
        "total",
    ));
    html.push_str(&row(
        "Actual Amount:",
        &format!("{}{}", c, format_amount(sale.actual_amount)),
        "total",
    ));
    html.push_str(&row(
        "Mismatch:",
        &describe_mismatch(sale.short_excess),
        "total mismatch",
    ));
    html.push_str("      <hr>\n");
    for (label, amount) in [
        ("Cash Sales:", sale.cash_sales),
        ("Card Sales:", sale.card_sales),
        ("UPI Sales:", sale.upi_sales),
        ("Credit Sales:", sale.credit_sales),
    ] {
        html.push_str(&row(label, &format!("{}{}", c, format_amount(amount)), ""));
    }
    html.push_str("    </div>\n  </body>\n</html>\n");
    html
}
