use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bank::loader::BankLoader;
use crate::bank::{Bank, Question};
use crate::engine::plan::build_plan;
use crate::engine::scoring::score;
use crate::engine::selector::{Distribution, pick};
use crate::error::TestError;
use crate::session::manager::SessionManager;
use crate::session::profile::Profile;
use crate::session::result::TestResult;
use crate::session::state::TestState;
use crate::store::{ResultStore, Storage};

/// One learner's placement test on one device.
///
/// Wires the bank loader, selector, session manager, scorer, plan generator
/// and result store together. Every dependency is passed in, so several
/// independent tests can run side by side in one process.
pub struct PlacementTest<R = StdRng> {
    loader: Arc<BankLoader>,
    storage: Storage,
    sessions: SessionManager,
    results: ResultStore,
    distribution: Distribution,
    bank: Arc<Bank>,
    rng: R,
}

impl PlacementTest<StdRng> {
    pub fn new(loader: Arc<BankLoader>, storage: Storage, distribution: Distribution) -> Self {
        Self::with_rng(loader, storage, distribution, StdRng::from_entropy())
    }

    pub fn seeded(
        loader: Arc<BankLoader>,
        storage: Storage,
        distribution: Distribution,
        seed: u64,
    ) -> Self {
        Self::with_rng(loader, storage, distribution, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PlacementTest<R> {
    pub fn with_rng(
        loader: Arc<BankLoader>,
        storage: Storage,
        distribution: Distribution,
        rng: R,
    ) -> Self {
        Self {
            loader,
            sessions: SessionManager::new(storage.clone()),
            results: ResultStore::new(storage.clone()),
            storage,
            distribution,
            bank: Arc::new(Bank::default()),
            rng,
        }
    }

    /// Validate the learner, pick a fresh question list and open a session.
    ///
    /// A blank name fails before anything is written. An empty selection
    /// (no bank, or a bank with nothing usable) fails with `EmptyBank` and
    /// leaves the attempt counter untouched so a retry reuses the number.
    pub fn start(&mut self, profile: Profile) -> Result<&TestState, TestError> {
        let profile = profile.validated()?;
        self.storage.save_profile(&profile);

        self.bank = self.loader.load();
        let last_ids = self.storage.last_question_ids();
        let attempt = self.storage.attempt().saturating_add(1);

        let question_ids: Vec<String> = pick(
            &self.bank,
            attempt,
            &last_ids,
            &self.distribution,
            &mut self.rng,
        )
        .into_iter()
        .map(|q| q.id.clone())
        .collect();

        if question_ids.is_empty() {
            tracing::warn!(attempt, bank = self.bank.len(), "no questions selected");
            return Err(TestError::EmptyBank);
        }

        let attempt = self.storage.next_attempt();
        tracing::info!(
            attempt,
            learner = %profile.name,
            timeframe = %profile.timeframe,
            questions = question_ids.len(),
            "placement test started"
        );
        Ok(self.sessions.create(attempt, question_ids))
    }

    pub fn has_saved_progress(&self) -> bool {
        self.sessions.has_saved()
    }

    /// Reopen saved progress. The bank is loaded too, so stale ids simply
    /// render as missing and are skipped at scoring time.
    pub fn resume(&mut self) -> Result<&TestState, TestError> {
        if !self.sessions.has_saved() {
            return Err(TestError::NoSavedProgress);
        }
        self.bank = self.loader.load();
        self.sessions.resume()
    }

    /// Abandon the current attempt.
    pub fn reset(&mut self) {
        if let Some(state) = self.sessions.clear() {
            tracing::info!(attempt = state.attempt, "placement test reset");
        }
    }

    pub fn state(&self) -> Option<&TestState> {
        self.sessions.state()
    }

    pub fn question_at(&self, index: usize) -> Option<&Question> {
        let id = self.sessions.state()?.question_ids.get(index)?;
        self.bank.get(id)
    }

    pub fn current_question(&self) -> Option<&Question> {
        let state = self.sessions.state()?;
        self.question_at(state.current)
    }

    /// Answer the question under the cursor.
    pub fn answer(&mut self, choice: usize) -> Result<&TestState, TestError> {
        let current = self
            .sessions
            .state()
            .ok_or(TestError::NoActiveSession)?
            .current;
        self.answer_at(current, choice)
    }

    pub fn answer_at(&mut self, index: usize, choice: usize) -> Result<&TestState, TestError> {
        if let Some(question) = self.question_at(index)
            && choice >= question.options.len()
        {
            return Err(TestError::Validation(format!(
                "Choose one of options 1-{}.",
                question.options.len()
            )));
        }
        self.sessions.answer(index, choice)
    }

    pub fn next(&mut self) -> Result<&TestState, TestError> {
        self.sessions.next()
    }

    pub fn prev(&mut self) -> Result<&TestState, TestError> {
        self.sessions.prev()
    }

    pub fn go_to(&mut self, index: usize) -> Result<&TestState, TestError> {
        self.sessions.go_to(index)
    }

    /// Score the session, build the plan, store the result and unlock
    /// registration. The session is cleared and its ids become the next
    /// attempt's exclusion list.
    ///
    /// Without a bank nothing can be scored, so `EmptyBank` is returned and
    /// the saved session is left as it was.
    pub fn finish(&mut self) -> Result<TestResult, TestError> {
        let state = self
            .sessions
            .state()
            .ok_or(TestError::NoActiveSession)?
            .clone();

        if self.bank.is_empty() {
            self.bank = self.loader.load();
        }
        if self.bank.is_empty() {
            tracing::warn!(attempt = state.attempt, "bank unavailable, finish deferred");
            return Err(TestError::EmptyBank);
        }

        let profile = self.storage.profile().unwrap_or_default();
        let analysis = score(&state, &self.bank);
        let plan = build_plan(profile.timeframe, &analysis);
        let result = TestResult::new(&profile, &state, analysis, plan);

        self.results.save(&result);
        self.storage.set_last_question_ids(&state.question_ids);
        self.sessions.clear();

        tracing::info!(
            attempt = result.attempt,
            overall = result.overall_pct,
            level = %result.level.label,
            weak = %result.weak_section,
            "placement test finished"
        );
        Ok(result)
    }

    pub fn last_result(&self) -> Option<TestResult> {
        self.results.load()
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, bail};
    use rand::rngs::SmallRng;

    use super::*;
    use crate::bank::source::BankSource;
    use crate::store::MemoryStore;

    struct StaticSource(String);

    impl BankSource for StaticSource {
        fn fetch(&self) -> Result<String> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".into()
        }
    }

    struct BrokenSource;

    impl BankSource for BrokenSource {
        fn fetch(&self) -> Result<String> {
            bail!("offline")
        }

        fn describe(&self) -> String {
            "broken".into()
        }
    }

    fn bank_json(per_section: usize) -> String {
        let mut questions = Vec::new();
        for section in ["grammar", "reading", "listening"] {
            for i in 0..per_section {
                questions.push(serde_json::json!({
                    "id": format!("{section}-{i}"),
                    "section": section,
                    "difficulty": (i % 5) + 1,
                    "prompt": "?",
                    "options": ["a", "b", "c", "d"],
                    "answerIndex": 1,
                }));
            }
        }
        serde_json::json!({ "questions": questions }).to_string()
    }

    fn placement(
        source: Box<dyn BankSource>,
        dist: Distribution,
    ) -> (Arc<MemoryStore>, PlacementTest<SmallRng>) {
        let kv = Arc::new(MemoryStore::new());
        let storage = Storage::new(kv.clone(), "t");
        let test = PlacementTest::with_rng(
            Arc::new(BankLoader::new(source)),
            storage,
            dist,
            SmallRng::seed_from_u64(42),
        );
        (kv, test)
    }

    fn small() -> Distribution {
        Distribution {
            grammar: 2,
            reading: 2,
            listening: 1,
        }
    }

    #[test]
    fn blank_name_blocks_start_without_writes() {
        let (kv, mut test) = placement(Box::new(StaticSource(bank_json(5))), small());
        let err = test.start(Profile::new(" ")).unwrap_err();
        assert!(matches!(err, TestError::Validation(_)));
        assert!(kv.is_empty());
        assert!(test.state().is_none());
    }

    #[test]
    fn empty_bank_is_retryable_and_keeps_attempt() {
        let (_kv, mut test) = placement(Box::new(BrokenSource), small());
        let err = test.start(Profile::new("Sara")).unwrap_err();
        assert_eq!(err, TestError::EmptyBank);
        assert!(err.is_retryable());
        assert_eq!(test.storage().attempt(), 0);
    }

    #[test]
    fn start_answer_finish() {
        let (_kv, mut test) = placement(Box::new(StaticSource(bank_json(5))), small());
        let state = test.start(Profile::new("Sara")).unwrap();
        assert_eq!(state.attempt, 1);
        assert_eq!(state.len(), 5);

        for i in 0..5 {
            test.go_to(i).unwrap();
            test.answer(1).unwrap();
        }
        assert!(test.state().unwrap().is_complete());

        let result = test.finish().unwrap();
        assert_eq!(result.overall_pct, 100);
        assert_eq!(result.total, 5);
        assert!(test.state().is_none());
        assert!(!test.has_saved_progress());
        assert!(test.results().is_unlocked());
        assert_eq!(test.last_result(), Some(result));
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let (_kv, mut test) = placement(Box::new(StaticSource(bank_json(5))), small());
        test.start(Profile::new("Sara")).unwrap();
        assert!(matches!(test.answer(4), Err(TestError::Validation(_))));
        assert_eq!(test.state().unwrap().answered_count(), 0);
    }

    #[test]
    fn finish_records_ids_for_next_attempt() {
        let (_kv, mut test) = placement(Box::new(StaticSource(bank_json(10))), small());
        let first = test.start(Profile::new("Sara")).unwrap().question_ids.clone();
        test.finish().unwrap();
        assert_eq!(test.storage().last_question_ids(), first);

        let second = test.start(Profile::new("Sara")).unwrap();
        assert_eq!(second.attempt, 2);
        assert!(second.question_ids.iter().all(|id| !first.contains(id)));
    }

    #[test]
    fn finish_without_session() {
        let (_kv, mut test) = placement(Box::new(StaticSource(bank_json(5))), small());
        assert_eq!(test.finish().unwrap_err(), TestError::NoActiveSession);
    }

    #[test]
    fn reset_discards_progress() {
        let (_kv, mut test) = placement(Box::new(StaticSource(bank_json(5))), small());
        test.start(Profile::new("Sara")).unwrap();
        assert!(test.has_saved_progress());
        test.reset();
        assert!(!test.has_saved_progress());
        assert_eq!(test.resume().unwrap_err(), TestError::NoSavedProgress);
        assert!(test.last_result().is_none());
    }

    #[test]
    fn current_question_follows_cursor() {
        let (_kv, mut test) = placement(Box::new(StaticSource(bank_json(5))), small());
        test.start(Profile::new("Sara")).unwrap();
        let second_id = test.state().unwrap().question_ids[1].clone();
        test.next().unwrap();
        assert_eq!(test.current_question().unwrap().id, second_id);
    }
}
