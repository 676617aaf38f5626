use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// In-progress test record, persisted after every change.
///
/// `answers` always has one slot per question id and `current` always
/// points at a valid slot (or 0 for an empty list).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestState {
    pub attempt: u32,
    pub created_at: DateTime<Utc>,
    pub question_ids: Vec<String>,
    #[serde(default)]
    pub answers: Vec<Option<usize>>,
    #[serde(default)]
    pub current: usize,
}

/// Partial update to a `TestState`. Absent fields keep their value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub answers: Option<Vec<Option<usize>>>,
    pub current: Option<usize>,
}

impl StatePatch {
    pub fn answers(answers: Vec<Option<usize>>) -> Self {
        Self {
            answers: Some(answers),
            current: None,
        }
    }

    pub fn current(current: usize) -> Self {
        Self {
            answers: None,
            current: Some(current),
        }
    }
}

impl TestState {
    pub fn new(attempt: u32, question_ids: Vec<String>) -> Self {
        let answers = vec![None; question_ids.len()];
        Self {
            attempt,
            created_at: Utc::now(),
            question_ids,
            answers,
            current: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.question_ids.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.answered_count() == self.len()
    }

    pub fn current_id(&self) -> Option<&str> {
        self.question_ids.get(self.current).map(String::as_str)
    }

    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.len().saturating_sub(1))
    }

    /// Merge a patch into a new state, restoring the invariants.
    pub fn apply_patch(&self, patch: &StatePatch) -> TestState {
        let mut next = self.clone();
        if let Some(answers) = &patch.answers {
            next.answers = answers.clone();
        }
        if let Some(current) = patch.current {
            next.current = current;
        }
        next.repaired()
    }

    /// Pad or truncate `answers` to the id list and clamp `current`. Used on
    /// every patch and on records read back from storage.
    pub fn repaired(mut self) -> TestState {
        self.answers.resize(self.question_ids.len(), None);
        self.current = self.clamp_index(self.current);
        self
    }
}
