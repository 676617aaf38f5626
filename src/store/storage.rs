use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::session::profile::Profile;
use crate::store::KvStore;
use crate::store::schema;

/// Namespaced, typed view over a [`KvStore`].
///
/// Reads never fail: an absent, unreadable or corrupt value yields the
/// caller's default. Writes are best-effort and only report success as a
/// bool; failures are logged and otherwise ignored.
#[derive(Clone)]
pub struct Storage {
    kv: Arc<dyn KvStore>,
    prefix: String,
}

impl Storage {
    pub fn new(kv: Arc<dyn KvStore>, save_key: &str) -> Self {
        Self {
            kv,
            prefix: save_key.to_string(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name)
    }

    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let key = self.key(name);
        let raw = match self.kv.get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring corrupt stored value");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    pub fn set<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> bool {
        let key = self.key(name);
        let result = serde_json::to_string(value)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.kv.set(&key, &json));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage write failed");
                false
            }
        }
    }

    pub fn remove(&self, name: &str) -> bool {
        let key = self.key(name);
        match self.kv.remove(&key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage remove failed");
                false
            }
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get_or(name, false)
    }

    pub fn set_flag(&self, name: &str, on: bool) -> bool {
        self.set(name, &on)
    }

    /// Number of the most recently started attempt (0 before the first).
    pub fn attempt(&self) -> u32 {
        self.get_or(schema::ATTEMPT, 0)
    }

    /// Bump the persisted attempt counter and return the new number. The
    /// returned value is used even when the write fails.
    pub fn next_attempt(&self) -> u32 {
        let next = self.attempt().saturating_add(1);
        self.set(schema::ATTEMPT, &next);
        next
    }

    pub fn last_question_ids(&self) -> Vec<String> {
        self.get_or(schema::LAST_QUESTION_IDS, Vec::new())
    }

    pub fn set_last_question_ids(&self, ids: &[String]) -> bool {
        self.set(schema::LAST_QUESTION_IDS, ids)
    }

    pub fn profile(&self) -> Option<Profile> {
        self.get(schema::PROFILE)
    }

    pub fn save_profile(&self, profile: &Profile) -> bool {
        self.set(schema::PROFILE, profile)
    }

    pub fn toast_muted(&self) -> bool {
        self.flag(schema::TOAST_MUTED)
    }

    pub fn set_toast_muted(&self, on: bool) -> bool {
        self.set_flag(schema::TOAST_MUTED, on)
    }

    pub fn install_dismissed(&self) -> bool {
        self.flag(schema::INSTALL_DISMISSED)
    }

    pub fn set_install_dismissed(&self, on: bool) -> bool {
        self.set_flag(schema::INSTALL_DISMISSED, on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn storage() -> (Arc<MemoryStore>, Storage) {
        let kv = Arc::new(MemoryStore::new());
        let storage = Storage::new(kv.clone(), "step2026");
        (kv, storage)
    }

    #[test]
    fn keys_are_namespaced() {
        let (kv, storage) = storage();
        assert!(storage.set("attempt", &2u32));
        assert_eq!(kv.get("step2026_attempt").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn corrupt_values_fall_back_to_default() {
        let (kv, storage) = storage();
        kv.set("step2026_attempt", "not json").unwrap();
        kv.set("step2026_lastQuestionIds", "{\"oops\":1}").unwrap();
        assert_eq!(storage.attempt(), 0);
        assert!(storage.last_question_ids().is_empty());
    }

    #[test]
    fn attempt_counter_increments() {
        let (_kv, storage) = storage();
        assert_eq!(storage.next_attempt(), 1);
        assert_eq!(storage.next_attempt(), 2);
        assert_eq!(storage.attempt(), 2);
    }

    #[test]
    fn failed_writes_are_swallowed() {
        let (kv, storage) = storage();
        kv.set_fail_writes(true);
        assert!(!storage.set("attempt", &5u32));
        assert!(!storage.remove("attempt"));
        assert_eq!(storage.next_attempt(), 1);
        assert_eq!(storage.attempt(), 0);
    }

    #[test]
    fn preference_flags_default_off() {
        let (_kv, storage) = storage();
        assert!(!storage.toast_muted());
        assert!(!storage.install_dismissed());
        storage.set_toast_muted(true);
        storage.set_install_dismissed(true);
        assert!(storage.toast_muted());
        assert!(storage.install_dismissed());
    }

    #[test]
    fn separate_prefixes_do_not_collide() {
        let kv = Arc::new(MemoryStore::new());
        let a = Storage::new(kv.clone(), "a");
        let b = Storage::new(kv, "b");
        a.next_attempt();
        assert_eq!(b.attempt(), 0);
    }
}
