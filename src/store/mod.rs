//! Preference Store adapter.
//!
//! The store is an origin-scoped key-value area shared by every tab. All
//! access is best-effort: failures degrade to "no persistence this session"
//! and are only logged.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::theme::{Mode, STORAGE_KEY};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Storage disabled or not reachable in this context
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// Write refused (quota, security policy)
    #[error("storage rejected write: {0}")]
    Rejected(String),
}

/// Durable key-value store shared across contexts of one origin
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Read the persisted choice. Errors and corrupted values read as absent.
pub fn read_choice(store: &dyn PreferenceStore) -> Option<Mode> {
    match store.get(STORAGE_KEY) {
        Ok(Some(raw)) => {
            let mode = Mode::parse(&raw);
            if mode.is_none() {
                tracing::debug!("Ignoring invalid stored theme value {:?}", raw);
            }
            mode
        }
        Ok(None) => None,
        Err(e) => {
            tracing::debug!("Theme store read failed: {}", e);
            None
        }
    }
}

/// Persist the choice once. Failure is logged and otherwise ignored.
pub fn persist_choice(store: &dyn PreferenceStore, mode: Mode) {
    if let Err(e) = store.set(STORAGE_KEY, mode.as_str()) {
        tracing::debug!("Theme store write failed, keeping in-memory state: {}", e);
    }
}

#[derive(Default)]
struct MemoryStoreInner {
    values: HashMap<String, String>,
    failing: bool,
    writes: usize,
}

/// In-memory store. Clones share the same data, like tabs of one origin.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryStoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `value` under the theme key
    pub fn with_choice(value: &str) -> Self {
        let store = Self::new();
        store.put(STORAGE_KEY, value);
        store
    }

    /// Write directly, bypassing failure simulation and write counting
    pub fn put(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .values
            .insert(key.to_string(), value.to_string());
    }

    /// Remove a key, as an external agent clearing storage would
    pub fn clear(&self, key: &str) {
        self.inner.borrow_mut().values.remove(key);
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }

    /// Make every subsequent access fail (storage disabled)
    pub fn set_failing(&self, failing: bool) {
        self.inner.borrow_mut().failing = failing;
    }

    /// Number of successful `set` calls
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.borrow();
        if inner.failing {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.failing {
            return Err(StoreError::Rejected("quota exceeded".into()));
        }
        inner.values.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_choice_valid() {
        let store = MemoryStore::with_choice("dark");
        assert_eq!(read_choice(&store), Some(Mode::Dark));
    }

    #[test]
    fn test_read_choice_corrupted_is_absent() {
        let store = MemoryStore::with_choice("auto");
        assert_eq!(read_choice(&store), None);
        store.put(STORAGE_KEY, "{\"mode\":\"dark\"}");
        assert_eq!(read_choice(&store), None);
    }

    #[test]
    fn test_read_choice_is_case_and_space_exact() {
        for raw in ["DARK", "Light", "  dark\n", " light"] {
            let store = MemoryStore::with_choice(raw);
            assert_eq!(read_choice(&store), None, "{:?}", raw);
        }
    }

    #[test]
    fn test_failures_are_swallowed() {
        let store = MemoryStore::with_choice("dark");
        store.set_failing(true);
        assert_eq!(read_choice(&store), None);

        persist_choice(&store, Mode::Light);
        assert_eq!(store.write_count(), 0);

        store.set_failing(false);
        assert_eq!(store.peek(STORAGE_KEY).as_deref(), Some("dark"));
    }

    #[test]
    fn test_clones_share_origin() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.clone();
        persist_choice(&tab_a, Mode::Dark);
        assert_eq!(read_choice(&tab_b), Some(Mode::Dark));
        assert_eq!(tab_b.write_count(), 1);
    }
}
