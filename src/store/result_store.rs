use crate::error::TestError;
use crate::session::result::TestResult;
use crate::store::Storage;
use crate::store::schema;

/// Latest finished result plus the unlock flag that gates registration.
#[derive(Clone)]
pub struct ResultStore {
    storage: Storage,
}

impl ResultStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Overwrite the stored result and set the unlock flag.
    pub fn save(&self, result: &TestResult) -> bool {
        let saved = self.storage.set(schema::RESULT, result);
        let unlocked = self.storage.set_flag(schema::UNLOCK, true);
        saved && unlocked
    }

    pub fn load(&self) -> Option<TestResult> {
        self.storage.get(schema::RESULT)
    }

    /// Drop the stored result. The unlock flag survives: it records that a
    /// test was completed at some point on this device.
    pub fn clear(&self) -> bool {
        self.storage.remove(schema::RESULT)
    }

    pub fn is_unlocked(&self) -> bool {
        self.storage.flag(schema::UNLOCK)
    }

    /// Gate for surfaces that require a completed test.
    pub fn require_unlocked(&self) -> Result<(), TestError> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(TestError::Locked)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bank::Section;
    use crate::engine::plan::{Timeframe, build_plan};
    use crate::engine::scoring::score;
    use crate::session::profile::Profile;
    use crate::session::state::TestState;
    use crate::store::MemoryStore;

    fn sample_result() -> TestResult {
        let bank = crate::bank::Bank::new(vec![crate::bank::test_support::question(
            "g1",
            Section::Grammar,
            3,
            0,
        )]);
        let mut state = TestState::new(1, vec!["g1".into()]);
        state.answers[0] = Some(0);
        let analysis = score(&state, &bank);
        let plan = build_plan(Timeframe::SevenDays, &analysis);
        TestResult::new(&Profile::new("Sara"), &state, analysis, plan)
    }

    fn store() -> ResultStore {
        ResultStore::new(Storage::new(Arc::new(MemoryStore::new()), "t"))
    }

    #[test]
    fn locked_until_first_save() {
        let store = store();
        assert!(!store.is_unlocked());
        assert_eq!(store.require_unlocked(), Err(TestError::Locked));
        assert!(store.load().is_none());

        let result = sample_result();
        assert!(store.save(&result));
        assert!(store.is_unlocked());
        assert!(store.require_unlocked().is_ok());
        assert_eq!(store.load(), Some(result));
    }

    #[test]
    fn save_overwrites_previous_result() {
        let store = store();
        let mut first = sample_result();
        first.attempt = 1;
        let mut second = sample_result();
        second.attempt = 2;

        store.save(&first);
        store.save(&second);
        assert_eq!(store.load().unwrap().attempt, 2);
    }

    #[test]
    fn clear_keeps_unlock_flag() {
        let store = store();
        store.save(&sample_result());
        assert!(store.clear());
        assert!(store.load().is_none());
        assert!(store.is_unlocked());
    }
}
