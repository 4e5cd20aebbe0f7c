//! Process-lifetime customer preference map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::AppError;

pub type Preferences = HashMap<String, String>;

/// Shared, cloneable handle over one mutex-guarded map.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    inner: Arc<Mutex<HashMap<String, Preferences>>>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `preferences` for `customer_id`, replacing any previous entry.
    ///
    /// Returns `{customer_id: preferences}`.
    pub fn save(&self, customer_id: &str, preferences: Preferences) -> HashMap<String, Preferences> {
        self.inner
            .lock()
            .insert(customer_id.to_string(), preferences.clone());
        tracing::info!(customer_id, keys = preferences.len(), "saved customer preferences");
        HashMap::from([(customer_id.to_string(), preferences)])
    }

    pub fn get(&self, customer_id: &str) -> Result<Preferences, AppError> {
        self.inner
            .lock()
            .get(customer_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No preferences stored for customer '{customer_id}'.")))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(pairs: &[(&str, &str)]) -> Preferences {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn save_returns_mapping_keyed_by_customer() {
        let store = PreferenceStore::new();
        let saved = store.save("c-1", prefs(&[("region", "caiso")]));
        assert_eq!(saved["c-1"]["region"], "caiso");
        assert_eq!(store.get("c-1").unwrap(), prefs(&[("region", "caiso")]));
    }

    #[test]
    fn second_save_overwrites() {
        let store = PreferenceStore::new();
        store.save("c-1", prefs(&[("region", "caiso"), ("units", "t")]));
        store.save("c-1", prefs(&[("region", "ercot")]));
        assert_eq!(store.get("c-1").unwrap(), prefs(&[("region", "ercot")]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clones_share_state_and_unknown_customer_errors() {
        let store = PreferenceStore::new();
        let other = store.clone();
        other.save("c-2", Preferences::new());
        assert!(store.get("c-2").unwrap().is_empty());
        assert!(matches!(store.get("c-3"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn concurrent_saves_keep_every_customer() {
        let store = PreferenceStore::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = store.clone();
                std::thread::spawn(move || {
                    s.save(&format!("c-{i}"), prefs(&[("n", &i.to_string())]));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 8);
    }
}
