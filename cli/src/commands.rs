//! Command line surface over the sales register

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::{presets, CellAlignment, Table};
use shared::{
    describe_mismatch, export_file_name, format_amount, format_signed_mismatch, preview,
    render_details, render_print_html, Clock, Notification, NotificationLevel, RegisterError,
    SalesEntryForm, SalesRecord, SalesRegister, SystemClock, CURRENCY_SYMBOL,
};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::storage::FileStorage;

#[derive(Debug, Clone, Parser)]
#[clap(about, version, author, name = "sales-register")]
pub struct Cli {
    /// Data directory, overriding storage.data_dir
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Record a new sales entry
    Add {
        #[clap(flatten)]
        entry: EntryArgs,

        /// Also write the printable slip
        #[clap(long)]
        print: bool,

        /// Where to write the slip when --print is given
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Show the reconciliation for the given values without saving
    Preview {
        #[clap(flatten)]
        entry: EntryArgs,
    },
    /// Sales history, newest date first
    List {
        /// Only entries on this date (YYYY-MM-DD)
        #[clap(long)]
        date: Option<NaiveDate>,
    },
    /// Detail view of one entry
    Show { id: i64 },
    /// Write the printable slip of one entry
    Print {
        id: i64,

        #[clap(long, short)]
        output: Option<PathBuf>,
    },
    /// Permanently delete an entry
    Delete {
        id: i64,

        /// Confirm the deletion
        #[clap(long)]
        yes: bool,
    },
    /// Export every entry as CSV
    Export {
        #[clap(long, short)]
        output: Option<PathBuf>,
    },
}

/// Entry form fields, taken as text exactly like the dashboard inputs
#[derive(Debug, Clone, Default, Args)]
pub struct EntryArgs {
    /// Defaults to today
    #[clap(long)]
    pub date: Option<String>,

    /// Morning, Evening or Night (defaults to Morning)
    #[clap(long)]
    pub shift: Option<String>,

    #[clap(long)]
    pub attendant: Option<String>,

    #[clap(long)]
    pub pump_no: Option<String>,

    /// Opening meter reading (L)
    #[clap(long)]
    pub opening: Option<String>,

    /// Closing meter reading (L)
    #[clap(long)]
    pub closing: Option<String>,

    /// Test pumping (L)
    #[clap(long)]
    pub test: Option<String>,

    /// Price per liter
    #[clap(long)]
    pub rate: Option<String>,

    #[clap(long)]
    pub cash: Option<String>,

    #[clap(long)]
    pub card: Option<String>,

    #[clap(long)]
    pub upi: Option<String>,

    #[clap(long)]
    pub credit: Option<String>,
}

impl EntryArgs {
    /// Overlay the given values on the blank form for `today`
    pub fn into_form(self, today: NaiveDate) -> SalesEntryForm {
        let blank = SalesEntryForm::for_date(today);
        SalesEntryForm {
            date: self.date.or(blank.date),
            shift: self.shift.or(blank.shift),
            attendant: self.attendant,
            pump_no: self.pump_no,
            opening_reading: self.opening,
            closing_reading: self.closing,
            test_sales: self.test,
            rate: self.rate,
            cash_sales: self.cash,
            card_sales: self.card,
            upi_sales: self.upi,
            credit_sales: self.credit,
        }
    }
}

/// Print a notification the way the dashboard would toast it
pub fn announce(note: &Notification) {
    match note.level {
        NotificationLevel::Success => println!("✔ {}", note.message),
        NotificationLevel::Warning => eprintln!("! {}", note.message),
        NotificationLevel::Error => eprintln!("✘ {}", note.message),
    }
}

fn write_file(path: &Path, content: &str) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::io(parent.display(), e))?;
    }
    fs::write(path, content).map_err(|e| AppError::io(path.display(), e))
}

pub struct App<'a> {
    config: &'a Config,
    register: SalesRegister<FileStorage>,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config, data_dir: Option<PathBuf>) -> Self {
        let dir = data_dir.unwrap_or_else(|| config.storage.data_dir.clone());
        tracing::debug!(dir = %dir.display(), key = %config.storage.key, "Opening sales register");
        let register =
            SalesRegister::new(FileStorage::new(dir)).with_key(config.storage.key.clone());
        Self { config, register }
    }

    fn today(&self) -> NaiveDate {
        SystemClock.now().date_naive()
    }

    fn default_output(&self, file_name: String) -> PathBuf {
        self.config.export.output_dir.join(file_name)
    }

    pub fn run(&mut self, command: Command) -> AppResult<()> {
        match command {
            Command::Add {
                entry,
                print,
                output,
            } => self.add(entry, print, output),
            Command::Preview { entry } => {
                self.preview(entry);
                Ok(())
            }
            Command::List { date } => self.list(date),
            Command::Show { id } => self.show(id),
            Command::Print { id, output } => self.print(id, output),
            Command::Delete { id, yes } => self.delete(id, yes),
            Command::Export { output } => self.export(output),
        }
    }

    fn add(&mut self, entry: EntryArgs, print: bool, output: Option<PathBuf>) -> AppResult<()> {
        let form = entry.into_form(self.today());
        let record = self.register.create(&form)?;

        println!("{}", summary_table(&record));
        if print {
            let path = output
                .unwrap_or_else(|| self.default_output(format!("sales_entry_{}.html", record.id)));
            write_file(&path, &render_print_html(&record))?;
            println!("Slip written to {}", path.display());
            announce(&Notification::entry_saved_and_printed());
        } else {
            announce(&Notification::entry_saved());
        }
        Ok(())
    }

    fn preview(&self, entry: EntryArgs) {
        let form = entry.into_form(self.today());
        let r = preview(&form);

        let mut table = Table::new();
        table
            .load_preset(presets::ASCII_FULL_CONDENSED)
            .set_header(["Total Sales (L)", "Expected", "Actual", "Short/Excess"])
            .add_row([
                format_amount(r.total_liters),
                format!("{}{}", CURRENCY_SYMBOL, format_amount(r.expected_amount)),
                format!("{}{}", CURRENCY_SYMBOL, format_amount(r.actual_amount)),
                format_amount(r.short_excess),
            ]);
        right_align(&mut table, 0..4);

        println!("{}", table);
        println!("{}", describe_mismatch(r.short_excess));
    }

    fn list(&self, date: Option<NaiveDate>) -> AppResult<()> {
        let records = self.register.list(date)?;
        if records.is_empty() {
            println!("No sales records found");
            return Ok(());
        }
        println!("{}", history_table(&records));
        Ok(())
    }

    fn find(&self, id: i64) -> AppResult<SalesRecord> {
        self.register
            .find(id)?
            .ok_or(AppError::Register(RegisterError::NotFound(id)))
    }

    fn show(&self, id: i64) -> AppResult<()> {
        println!("{}", render_details(&self.find(id)?));
        Ok(())
    }

    fn print(&self, id: i64, output: Option<PathBuf>) -> AppResult<()> {
        let record = self.find(id)?;
        let path =
            output.unwrap_or_else(|| self.default_output(format!("sales_entry_{}.html", id)));
        write_file(&path, &render_print_html(&record))?;
        println!("Slip written to {}", path.display());
        Ok(())
    }

    fn delete(&mut self, id: i64, confirmed: bool) -> AppResult<()> {
        if !confirmed {
            return Err(AppError::ConfirmationRequired(format!(
                "Deleting sales entry {} cannot be undone. Re-run with --yes to confirm.",
                id
            )));
        }

        if self.register.delete(id)? {
            announce(&Notification::entry_deleted());
        } else {
            announce(&Notification::warning(format!("Sales entry {} not found", id)));
        }
        Ok(())
    }

    fn export(&self, output: Option<PathBuf>) -> AppResult<()> {
        let csv = self.register.export_csv()?;
        let path = output.unwrap_or_else(|| self.default_output(export_file_name(self.today())));
        write_file(&path, &csv)?;
        println!("Exported to {}", path.display());
        announce(&Notification::exported());
        Ok(())
    }
}

fn right_align(table: &mut Table, columns: std::ops::Range<usize>) {
    for col in columns {
        if let Some(column) = table.column_mut(col) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn history_table(records: &[SalesRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::ASCII_FULL_CONDENSED).set_header([
        "ID",
        "Date",
        "Shift",
        "Attendant",
        "Pump",
        "Liters",
        "Expected (₹)",
        "Actual (₹)",
        "Mismatch (₹)",
    ]);

    for sale in records {
        table.add_row([
            sale.id.to_string(),
            sale.date.format("%Y-%m-%d").to_string(),
            sale.shift.to_string(),
            sale.attendant.clone(),
            sale.pump_no.to_string(),
            format_amount(sale.total_liters),
            format!("{}{}", CURRENCY_SYMBOL, format_amount(sale.expected_amount)),
            format!("{}{}", CURRENCY_SYMBOL, format_amount(sale.actual_amount)),
            format_signed_mismatch(sale.short_excess),
        ]);
    }
    right_align(&mut table, 5..9);
    table
}

fn summary_table(record: &SalesRecord) -> Table {
    let mut table = history_table(std::slice::from_ref(record));
    table.add_row([
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        describe_mismatch(record.short_excess),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_args_fill_form_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let form = EntryArgs {
            attendant: Some("Ravi".into()),
            opening: Some("10".into()),
            ..Default::default()
        }
        .into_form(today);

        assert_eq!(form.date.as_deref(), Some("2024-01-05"));
        assert_eq!(form.shift.as_deref(), Some("Morning"));
        assert_eq!(form.opening_reading.as_deref(), Some("10"));
        assert!(form.rate.is_none());
    }

    #[test]
    fn test_explicit_date_and_shift_win() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let form = EntryArgs {
            date: Some("2023-12-31".into()),
            shift: Some("Night".into()),
            ..Default::default()
        }
        .into_form(today);

        assert_eq!(form.date.as_deref(), Some("2023-12-31"));
        assert_eq!(form.shift.as_deref(), Some("Night"));
    }

    #[test]
    fn test_cli_parses_add() {
        let cli = Cli::parse_from([
            "sales-register",
            "add",
            "--attendant",
            "Ravi",
            "--pump-no",
            "2",
            "--opening",
            "100",
            "--closing",
            "150",
            "--rate",
            "90",
            "--print",
        ]);
        match cli.command {
            Command::Add { entry, print, .. } => {
                assert!(print);
                assert_eq!(entry.pump_no.as_deref(), Some("2"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_list_date() {
        let cli = Cli::parse_from(["sales-register", "list", "--date", "2024-01-05"]);
        match cli.command {
            Command::List { date } => assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut app = App::new(&config, None);

        let err = app.run(Command::Delete { id: 1, yes: false }).unwrap_err();
        assert!(matches!(err, AppError::ConfirmationRequired(_)));
        assert_eq!(err.notification().level, NotificationLevel::Warning);
    }

    #[test]
    fn test_export_empty_register() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let app = App::new(&config, None);

        let err = app.export(None).unwrap_err();
        assert_eq!(err.notification().message, "No sales data to export");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_add_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut app = App::new(&config, None);

        app.run(Command::Add {
            entry: EntryArgs {
                date: Some("2024-01-05".into()),
                attendant: Some("Ravi".into()),
                pump_no: Some("1".into()),
                opening: Some("100".into()),
                closing: Some("150".into()),
                test: Some("2".into()),
                rate: Some("90".into()),
                cash: Some("3000".into()),
                card: Some("1000".into()),
                upi: Some("500".into()),
                ..Default::default()
            },
            print: false,
            output: None,
        })
        .unwrap();

        let out = dir.path().join("report.csv");
        app.run(Command::Export {
            output: Some(out.clone()),
        })
        .unwrap();

        let csv = fs::read_to_string(out).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.starts_with(
            "2024-01-05,Morning,Ravi,1,100,150,2,90,48.00,4320.00,4500.00,180.00,"
        ));
    }

    fn test_config(root: &Path) -> Config {
        Config {
            environment: "test".into(),
            storage: crate::config::StorageConfig {
                data_dir: root.join("data"),
                key: "salesData".into(),
            },
            logging: crate::config::LoggingConfig {
                level: "info".into(),
            },
            export: crate::config::ExportConfig {
                output_dir: root.join("out"),
            },
        }
    }
}
