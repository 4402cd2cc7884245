//! `window.localStorage` backend.

use chat::KeyValueStore;
use proto::StoreError;

use crate::log;

/// Key-value store over the page's `localStorage`.
///
/// When storage is unavailable (no window, disabled by the browser) reads
/// see an empty store and writes fail with [`StoreError::Unavailable`], so
/// the widget still works for the lifetime of the page.
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    /// Opens the page's local storage.
    pub fn open() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log("localStorage unavailable; chats will not be saved");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StoreError> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Unavailable("localStorage is not accessible".to_string()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let Some(storage) = self.storage.as_ref() else {
            return Ok(None);
        };
        storage
            .get_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        // setItem only throws when the quota is exhausted.
        self.storage()?
            .set_item(key, value)
            .map_err(|_| StoreError::QuotaExceeded {
                key: key.to_string(),
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}
