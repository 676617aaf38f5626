use crate::error::TestError;
use crate::session::state::{StatePatch, TestState};
use crate::store::Storage;
use crate::store::schema;

/// Owns the in-progress `TestState` and writes it through on every change.
///
/// The in-memory copy is authoritative: if a write fails the session keeps
/// going and only a reload would lose the unsaved change.
pub struct SessionManager {
    storage: Storage,
    state: Option<TestState>,
}

impl SessionManager {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            state: None,
        }
    }

    pub fn state(&self) -> Option<&TestState> {
        self.state.as_ref()
    }

    /// Whether persisted, non-empty progress exists to resume from.
    pub fn has_saved(&self) -> bool {
        self.load_saved().is_some()
    }

    pub fn create(&mut self, attempt: u32, question_ids: Vec<String>) -> &TestState {
        let state = TestState::new(attempt, question_ids);
        tracing::info!(attempt, questions = state.len(), "test session created");
        self.persist(&state);
        self.state.insert(state)
    }

    pub fn resume(&mut self) -> Result<&TestState, TestError> {
        let state = self.load_saved().ok_or(TestError::NoSavedProgress)?;
        tracing::info!(
            attempt = state.attempt,
            answered = state.answered_count(),
            current = state.current,
            "test session resumed"
        );
        Ok(&*self.state.insert(state))
    }

    pub fn mutate(&mut self, patch: &StatePatch) -> Result<&TestState, TestError> {
        let current = self.state.as_ref().ok_or(TestError::NoActiveSession)?;
        let next = current.apply_patch(patch);
        self.persist(&next);
        Ok(&*self.state.insert(next))
    }

    /// Record `choice` for question `index` and keep the cursor there.
    pub fn answer(&mut self, index: usize, choice: usize) -> Result<&TestState, TestError> {
        let current = self.state.as_ref().ok_or(TestError::NoActiveSession)?;
        let mut answers = current.answers.clone();
        if let Some(slot) = answers.get_mut(index) {
            *slot = Some(choice);
        }
        self.mutate(&StatePatch {
            answers: Some(answers),
            current: Some(index),
        })
    }

    pub fn go_to(&mut self, index: usize) -> Result<&TestState, TestError> {
        self.mutate(&StatePatch::current(index))
    }

    pub fn next(&mut self) -> Result<&TestState, TestError> {
        let current = self.state.as_ref().ok_or(TestError::NoActiveSession)?.current;
        self.go_to(current.saturating_add(1))
    }

    pub fn prev(&mut self) -> Result<&TestState, TestError> {
        let current = self.state.as_ref().ok_or(TestError::NoActiveSession)?.current;
        self.go_to(current.saturating_sub(1))
    }

    /// Drop the session from memory and storage, returning what was active.
    pub fn clear(&mut self) -> Option<TestState> {
        self.storage.remove(schema::TEST_STATE);
        self.state.take()
    }

    fn load_saved(&self) -> Option<TestState> {
        self.storage
            .get::<TestState>(schema::TEST_STATE)
            .filter(|s| !s.is_empty())
            .map(TestState::repaired)
    }

    fn persist(&self, state: &TestState) {
        if !self.storage.set(schema::TEST_STATE, state) {
            tracing::warn!(attempt = state.attempt, "progress kept in memory only");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::{KvStore, MemoryStore};

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("q{i}")).collect()
    }

    fn manager() -> (Arc<MemoryStore>, SessionManager) {
        let kv = Arc::new(MemoryStore::new());
        let mgr = SessionManager::new(Storage::new(kv.clone(), "t"));
        (kv, mgr)
    }

    fn reload(kv: &Arc<MemoryStore>) -> SessionManager {
        SessionManager::new(Storage::new(kv.clone(), "t"))
    }

    #[test]
    fn resume_after_reload_is_identical() {
        let (kv, mut mgr) = manager();
        mgr.create(1, ids(50));
        let mut answers = mgr.state().unwrap().answers.clone();
        answers[10] = Some(2);
        let before = mgr.mutate(&StatePatch::answers(answers)).unwrap().clone();

        let mut fresh = reload(&kv);
        let after = fresh.resume().unwrap();
        assert_eq!(*after, before);
        assert_eq!(after.answers[10], Some(2));
    }

    #[test]
    fn nothing_to_resume() {
        let (kv, mut mgr) = manager();
        assert_eq!(mgr.resume().unwrap_err(), TestError::NoSavedProgress);
        assert!(!mgr.has_saved());

        mgr.create(1, Vec::new());
        assert!(!reload(&kv).has_saved(), "empty sessions are not resumable");
    }

    #[test]
    fn corrupt_saved_state_is_not_resumable() {
        let (kv, mut mgr) = manager();
        kv.set("t_testState", "{\"attempt\":").unwrap();
        assert_eq!(mgr.resume().unwrap_err(), TestError::NoSavedProgress);
    }

    #[test]
    fn resume_repairs_inconsistent_record() {
        let (kv, mut mgr) = manager();
        kv.set(
            "t_testState",
            r#"{"attempt":2,"createdAt":"2026-01-01T00:00:00Z","questionIds":["a","b","c"],"answers":[1],"current":9}"#,
        )
        .unwrap();
        let st = mgr.resume().unwrap();
        assert_eq!(st.answers, vec![Some(1), None, None]);
        assert_eq!(st.current, 2);
    }

    #[test]
    fn mutate_requires_session() {
        let (_kv, mut mgr) = manager();
        assert_eq!(mgr.go_to(1).unwrap_err(), TestError::NoActiveSession);
        assert_eq!(mgr.answer(0, 1).unwrap_err(), TestError::NoActiveSession);
    }

    #[test]
    fn navigation_clamps() {
        let (_kv, mut mgr) = manager();
        mgr.create(1, ids(3));
        assert_eq!(mgr.prev().unwrap().current, 0);
        assert_eq!(mgr.next().unwrap().current, 1);
        assert_eq!(mgr.next().unwrap().current, 2);
        assert_eq!(mgr.next().unwrap().current, 2);
        assert_eq!(mgr.go_to(100).unwrap().current, 2);
    }

    #[test]
    fn answer_sets_slot_and_cursor() {
        let (_kv, mut mgr) = manager();
        mgr.create(1, ids(4));
        let st = mgr.answer(2, 3).unwrap();
        assert_eq!(st.answers[2], Some(3));
        assert_eq!(st.current, 2);
        assert_eq!(st.answered_count(), 1);

        let st = mgr.answer(2, 1).unwrap();
        assert_eq!(st.answers[2], Some(1), "answers can be changed");
        assert_eq!(st.answered_count(), 1);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let (kv, mut mgr) = manager();
        mgr.create(1, ids(5));
        mgr.answer(0, 1).unwrap();
        mgr.next().unwrap();
        let saved = reload(&kv).resume().unwrap().clone();
        assert_eq!(saved.current, 1);
        assert_eq!(saved.answers[0], Some(1));
    }

    #[test]
    fn write_failure_keeps_memory_authoritative() {
        let (kv, mut mgr) = manager();
        mgr.create(1, ids(5));
        kv.set_fail_writes(true);

        let st = mgr.answer(3, 2).unwrap();
        assert_eq!(st.answers[3], Some(2));
        assert_eq!(mgr.state().unwrap().answers[3], Some(2));

        let saved = reload(&kv).resume().unwrap().clone();
        assert_eq!(saved.answers[3], None);
    }

    #[test]
    fn clear_removes_persisted_state() {
        let (kv, mut mgr) = manager();
        mgr.create(1, ids(2));
        assert!(mgr.clear().is_some());
        assert!(mgr.state().is_none());
        assert!(!reload(&kv).has_saved());
    }
}
