use serde::{Deserialize, Serialize};

use crate::engine::plan::Timeframe;
use crate::error::TestError;

/// Learner intake, overwritten at the start of every fresh attempt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub goal: String,
    pub region: String,
    /// Self-assessed hardest area.
    pub hardest: String,
    pub style: String,
    pub took_before: bool,
    pub prev_score: Option<u32>,
    pub target_score: Option<u32>,
    pub timeframe: Timeframe,
    pub exam_date: String,
}

impl Profile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Trim free-text fields and reject a blank name.
    pub fn validated(mut self) -> Result<Self, TestError> {
        self.name = self.name.trim().to_string();
        self.goal = self.goal.trim().to_string();
        self.region = self.region.trim().to_string();
        self.hardest = self.hardest.trim().to_string();
        self.style = self.style.trim().to_string();
        self.exam_date = self.exam_date.trim().to_string();

        if self.name.is_empty() {
            return Err(TestError::Validation(
                "Enter your name (required) so the plan can be made out to you.".to_string(),
            ));
        }
        Ok(self)
    }
}
