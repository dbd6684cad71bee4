//! Browser-backed storage and clock

use chrono::{DateTime, Utc};
use shared::{Clock, KeyValueStore, RegisterError, RegisterResult};
use wasm_bindgen::JsValue;

fn js_error(err: JsValue) -> RegisterError {
    RegisterError::Persistence(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

/// `window.localStorage`
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> RegisterResult<Self> {
        let window = web_sys::window()
            .ok_or_else(|| RegisterError::Persistence("No browser window available".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| RegisterError::Persistence("localStorage is disabled".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> RegisterResult<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    // Throws QuotaExceededError when the origin is out of space
    fn set_item(&mut self, key: &str, value: &str) -> RegisterResult<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }
}

/// `Date.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }
}
