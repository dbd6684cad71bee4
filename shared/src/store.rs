//! Record store for sales register entries
//!
//! The whole collection lives in one key-value slot as a JSON array. Every
//! operation loads it fully and every mutation rewrites it wholesale, so two
//! sessions writing the same slot resolve as last-writer-wins.

use std::cell::Cell;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{RegisterError, RegisterResult};
use crate::export::export_csv;
use crate::models::{SalesEntryForm, SalesEntryInput, SalesRecord};
use crate::types::SALES_DATA_KEY;
use crate::validation::{parse_sales_form, validate_input};

/// Minimal string key-value backend (browser `localStorage`, files, memory)
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> RegisterResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> RegisterResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get_item(&self, key: &str) -> RegisterResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> RegisterResult<()> {
        (**self).set_item(key, value)
    }
}

/// In-memory backend with an optional quota on the total stored bytes
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes that would push the total size above `quota_bytes` fail
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> RegisterResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> RegisterResult<()> {
        if let Some(quota) = self.quota_bytes {
            let others: usize = self
                .items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(RegisterError::Persistence(format!(
                    "Storage quota of {} bytes exceeded",
                    quota
                )));
            }
        }
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Source of the current time for ids and `created_at`
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that returns a fixed instant, advancing by `step_ms` on every read
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Cell<DateTime<Utc>>,
    step_ms: i64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>, step_ms: i64) -> Self {
        Self {
            current: Cell::new(start),
            step_ms,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let now = self.current.get();
        self.current
            .set(now + chrono::Duration::milliseconds(self.step_ms));
        now
    }
}

/// Durable collection of finalized sales records
pub struct SalesRegister<S, C = SystemClock> {
    storage: S,
    clock: C,
    key: String,
}

impl<S: KeyValueStore> SalesRegister<S, SystemClock> {
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> SalesRegister<S, C> {
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            key: SALES_DATA_KEY.to_string(),
        }
    }

    /// Use a different storage slot than `salesData`
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Load the full collection in insertion order.
    ///
    /// An absent slot is an empty collection; so is a blob that no longer
    /// parses.
    pub fn load(&self) -> RegisterResult<Vec<SalesRecord>> {
        let Some(raw) = self.storage.get_item(&self.key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<SalesRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Discarding unreadable sales data");
                Ok(Vec::new())
            }
        }
    }

    fn save(&mut self, records: &[SalesRecord]) -> RegisterResult<()> {
        let blob = serde_json::to_string(records)?;
        self.storage.set_item(&self.key, &blob)?;
        tracing::debug!(key = %self.key, count = records.len(), "Persisted sales data");
        Ok(())
    }

    /// Validate a submitted form and persist it as a new record
    pub fn create(&mut self, form: &SalesEntryForm) -> RegisterResult<SalesRecord> {
        let input = parse_sales_form(form)?;
        self.create_input(input)
    }

    /// Persist an already typed input as a new record
    pub fn create_input(&mut self, input: SalesEntryInput) -> RegisterResult<SalesRecord> {
        validate_input(&input)?;

        let mut records = self.load()?;
        let now = self.clock.now();
        let id = next_id(&records, now);
        let record = SalesRecord::new(id, input, now)?;

        records.push(record.clone());
        self.save(&records)?;

        tracing::info!(
            id = record.id,
            date = %record.date,
            shift = %record.shift,
            pump_no = record.pump_no,
            short_excess = %record.short_excess,
            "Sales entry saved"
        );
        Ok(record)
    }

    /// All records, or those dated `filter_date`, newest date first.
    /// Entries sharing a date keep their insertion order.
    pub fn list(&self, filter_date: Option<NaiveDate>) -> RegisterResult<Vec<SalesRecord>> {
        let mut records = self.load()?;
        if let Some(date) = filter_date {
            records.retain(|r| r.date == date);
        }
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }

    pub fn find(&self, id: i64) -> RegisterResult<Option<SalesRecord>> {
        Ok(self.load()?.into_iter().find(|r| r.id == id))
    }

    /// Remove the record with `id`. Returns whether anything was removed;
    /// an unknown id leaves the stored collection untouched.
    ///
    /// Irreversible: callers confirm with the user first.
    pub fn delete(&mut self, id: i64) -> RegisterResult<bool> {
        let mut records = self.load()?;
        let before = records.len();
        records.retain(|r| r.id != id);

        if records.len() == before {
            tracing::debug!(id, "Delete requested for unknown sales entry");
            return Ok(false);
        }

        self.save(&records)?;
        tracing::info!(id, "Sales entry deleted");
        Ok(true)
    }

    /// Every record in listing order, for bulk export
    pub fn export_all(&self) -> RegisterResult<Vec<SalesRecord>> {
        let records = self.list(None)?;
        if records.is_empty() {
            return Err(RegisterError::EmptyExport);
        }
        Ok(records)
    }

    /// CSV document of [`Self::export_all`]
    pub fn export_csv(&self) -> RegisterResult<String> {
        let records = self.export_all()?;
        let csv = export_csv(&records)?;
        tracing::info!(count = records.len(), "Sales data exported");
        Ok(csv)
    }
}

/// Millisecond timestamp id, bumped past the largest stored id when two
/// entries land on the same millisecond or the clock steps backwards
pub fn next_id(records: &[SalesRecord], now: DateTime<Utc>) -> i64 {
    let candidate = now.timestamp_millis();
    match records.iter().map(|r| r.id).max() {
        Some(last) if candidate <= last => last + 1,
        _ => candidate,
    }
}
