//! Persistence of the set of dismissed order ids.
//!
//! The set is stored under [`CLEARED_KEY`] as a JSON array of integers. It only
//! ever grows: "clear all" merges the held ids into it and nothing prunes it.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::NotificationResult;
use crate::storage::KeyValueStore;
use crate::types::OrderId;

/// Storage key of the cleared set.
pub const CLEARED_KEY: &str = "cleared_notifications";

/// Order ids the operator dismissed via "clear all".
pub type ClearedSet = BTreeSet<OrderId>;

pub struct ClearedSetStore<S> {
    store: S,
}

impl<S: KeyValueStore> ClearedSetStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads the persisted set.
    ///
    /// Never fails: a missing key, an unreadable store or a value that is not
    /// an array of integers all yield an empty set (the latter two are logged).
    pub fn load(&self) -> ClearedSet {
        let raw = match self.store.get(CLEARED_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No cleared notifications stored yet");
                return ClearedSet::new();
            }
            Err(e) => {
                warn!(error = %e, "Could not read cleared notifications; starting with an empty set");
                return ClearedSet::new();
            }
        };

        match serde_json::from_str::<Vec<OrderId>>(&raw) {
            Ok(ids) => {
                let set: ClearedSet = ids.into_iter().collect();
                debug!(count = set.len(), "Loaded cleared notifications");
                set
            }
            Err(e) => {
                warn!(error = %e, "Stored cleared notifications are malformed; ignoring them");
                ClearedSet::new()
            }
        }
    }

    /// Overwrites the stored value with `ids`, serialized in ascending order.
    pub fn persist(&self, ids: &ClearedSet) -> NotificationResult<()> {
        let ids: Vec<OrderId> = ids.iter().copied().collect();
        let json = serde_json::to_string(&ids)?;
        self.store.set(CLEARED_KEY, &json)?;
        debug!(count = ids.len(), "Persisted cleared notifications");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::storage::{MemoryKeyValueStore, MockKeyValueStore};
    use mockall::predicate::eq;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_missing_key_is_empty() {
        let store = ClearedSetStore::new(MemoryKeyValueStore::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_malformed_values_are_empty() {
        for raw in ["not json", "{\"a\":1}", "[1, \"two\"]", "[1.5]", "null"] {
            let store = ClearedSetStore::new(MemoryKeyValueStore::with_entry(CLEARED_KEY, raw));
            assert!(store.load().is_empty(), "{:?} should load as empty", raw);
        }
    }

    #[test]
    fn test_load_store_failure_is_empty() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_get()
            .with(eq(CLEARED_KEY))
            .returning(|_| Err(NotificationError::persistence_error_no_source("get", "disk gone")));
        assert!(ClearedSetStore::new(mock).load().is_empty());
    }

    #[test]
    fn test_persist_then_load_is_identity() {
        let store = ClearedSetStore::new(MemoryKeyValueStore::new());
        let ids: ClearedSet = [103, 101, 102].into_iter().collect();
        store.persist(&ids).unwrap();
        assert_eq!(store.load(), ids);
    }

    #[test]
    fn test_persist_writes_sorted_array() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_set()
            .with(eq(CLEARED_KEY), eq("[7,42,100]"))
            .times(1)
            .returning(|_, _| Ok(()));
        let ids: ClearedSet = [100, 7, 42].into_iter().collect();
        ClearedSetStore::new(mock).persist(&ids).unwrap();
    }

    #[test]
    fn test_persist_propagates_store_failure() {
        let mut mock = MockKeyValueStore::new();
        mock.expect_set()
            .returning(|_, _| Err(NotificationError::persistence_error_no_source("set", "read-only")));
        let result = ClearedSetStore::new(mock).persist(&ClearedSet::new());
        assert!(matches!(result, Err(NotificationError::Persistence { .. })));
    }

    #[test]
    fn test_load_duplicates_collapse() {
        let store = ClearedSetStore::new(MemoryKeyValueStore::with_entry(CLEARED_KEY, "[5,5,3]"));
        assert_eq!(store.load(), [3, 5].into_iter().collect::<ClearedSet>());
    }
}
