use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::Section;
use crate::engine::plan::Plan;
use crate::engine::scoring::{Analysis, Level, ReviewEntry, SectionScores};
use crate::session::profile::Profile;
use crate::session::state::TestState;
use crate::store::schema::RESULT_VERSION;

/// Finished attempt as handed to the results screen and the registration
/// message builder. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub attempt: u32,
    pub profile: Profile,
    pub overall_pct: u32,
    pub correct: usize,
    pub total: usize,
    pub sections: SectionScores,
    pub weak_section: Section,
    pub level: Level,
    pub plan: Plan,
    #[serde(default)]
    pub review: Vec<ReviewEntry>,
}

impl TestResult {
    pub fn new(profile: &Profile, state: &TestState, analysis: Analysis, plan: Plan) -> Self {
        Self {
            version: RESULT_VERSION.to_string(),
            created_at: Utc::now(),
            attempt: state.attempt,
            profile: profile.clone(),
            overall_pct: analysis.overall_pct,
            correct: analysis.correct,
            total: analysis.total,
            sections: analysis.sections,
            weak_section: analysis.weak_section,
            level: analysis.level,
            plan,
            review: analysis.review,
        }
    }

    /// Short blurb for sharing a result outside the app.
    pub fn share_text(&self) -> String {
        let who = if self.profile.name.is_empty() {
            "My result".to_string()
        } else {
            format!("{} scored", self.profile.name)
        };
        format!(
            "{who} {}% on the STEP placement test (grammar {}% \u{2022} reading {}% \u{2022} listening {}%).\nSuggested plan: {}",
            self.overall_pct,
            self.sections.grammar.pct,
            self.sections.reading.pct,
            self.sections.listening.pct,
            self.plan.title,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Bank;
    use crate::bank::test_support::question;
    use crate::engine::plan::{Timeframe, build_plan};
    use crate::engine::scoring::score;

    fn finished(name: &str) -> TestResult {
        let bank = Bank::new(vec![
            question("g1", Section::Grammar, 3, 0),
            question("r1", Section::Reading, 3, 0),
        ]);
        let mut state = TestState::new(4, vec!["g1".into(), "r1".into()]);
        state.answers = vec![Some(0), Some(1)];
        let analysis = score(&state, &bank);
        let plan = build_plan(Timeframe::NoDate, &analysis);
        TestResult::new(&Profile::new(name), &state, analysis, plan)
    }

    #[test]
    fn copies_analysis_and_attempt() {
        let result = finished("Sara");
        assert_eq!(result.version, RESULT_VERSION);
        assert_eq!(result.attempt, 4);
        assert_eq!(result.correct, 1);
        assert_eq!(result.total, 2);
        assert_eq!(result.overall_pct, 50);
        assert_eq!(result.weak_section, Section::Reading);
        assert_eq!(result.review.len(), 2);
        assert!(result.plan.booking_advice.is_some());
    }

    #[test]
    fn stored_shape_uses_camel_case() {
        let json = serde_json::to_value(finished("Sara")).unwrap();
        for key in ["createdAt", "overallPct", "weakSection", "plan", "review"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["weakSection"], "reading");
        assert_eq!(json["level"]["label"], "intermediate");
    }

    #[test]
    fn share_text_mentions_name_scores_and_plan() {
        let result = finished("Sara");
        let text = result.share_text();
        assert!(text.starts_with("Sara scored 50%"));
        assert!(text.contains("grammar 100%"));
        assert!(text.contains("reading 0%"));
        assert!(text.contains(&result.plan.title));

        assert!(finished("").share_text().starts_with("My result 50%"));
    }
}
