use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bank::{Bank, Section};
use crate::session::state::TestState;

/// Rounded percentage; zero when there is nothing to divide by.
pub fn percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScore {
    pub pct: u32,
    pub correct: usize,
    pub total: usize,
}

impl SectionScore {
    fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    fn finalize(&mut self) {
        self.pct = percent(self.correct, self.total);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionScores {
    pub grammar: SectionScore,
    pub reading: SectionScore,
    pub listening: SectionScore,
}

impl SectionScores {
    pub fn get(&self, section: Section) -> &SectionScore {
        match section {
            Section::Grammar => &self.grammar,
            Section::Reading => &self.reading,
            Section::Listening => &self.listening,
        }
    }

    fn get_mut(&mut self, section: Section) -> &mut SectionScore {
        match section {
            Section::Grammar => &mut self.grammar,
            Section::Reading => &mut self.reading,
            Section::Listening => &mut self.listening,
        }
    }
}

/// Lowest-scoring section. Ties resolve in `Section::ALL` order, so a
/// three-way tie reports grammar.
pub fn weak_section(scores: &SectionScores) -> Section {
    Section::ALL
        .into_iter()
        .min_by_key(|&s| scores.get(s).pct)
        .unwrap_or(Section::Grammar)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelLabel {
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for LevelLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LevelLabel::Beginner => "beginner",
            LevelLabel::Intermediate => "intermediate",
            LevelLabel::Advanced => "advanced",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub label: LevelLabel,
    pub note: String,
}

pub fn classify_level(overall_pct: u32) -> Level {
    let (label, note) = if overall_pct < 45 {
        (
            LevelLabel::Beginner,
            "Focus on the fundamentals and practice daily.",
        )
    } else if overall_pct < 70 {
        (
            LevelLabel::Intermediate,
            "Solid base: now raise accuracy and pace.",
        )
    } else {
        (
            LevelLabel::Advanced,
            "Excellent: focus on question patterns and speed.",
        )
    };
    Level {
        label,
        note: note.to_string(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    pub id: String,
    pub section: Section,
    pub chosen: Option<usize>,
    pub correct_index: usize,
}

impl ReviewEntry {
    pub fn is_correct(&self) -> bool {
        self.chosen == Some(self.correct_index)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    pub correct: usize,
    pub total: usize,
    pub overall_pct: u32,
    pub sections: SectionScores,
    pub weak_section: Section,
    pub level: Level,
    pub review: Vec<ReviewEntry>,
}

/// Score a session against the bank.
///
/// Ids missing from the bank and questions without a usable answer key are
/// skipped, so they count toward neither the correct nor the total tallies.
pub fn score(state: &TestState, bank: &Bank) -> Analysis {
    let mut sections = SectionScores::default();
    let mut review = Vec::with_capacity(state.question_ids.len());
    let mut correct = 0;
    let mut skipped = 0;

    for (i, id) in state.question_ids.iter().enumerate() {
        let Some((question, correct_index)) =
            bank.get(id).and_then(|q| Some((q, q.scoreable_index()?)))
        else {
            skipped += 1;
            continue;
        };

        let entry = ReviewEntry {
            id: question.id.clone(),
            section: question.section,
            chosen: state.answers.get(i).copied().flatten(),
            correct_index,
        };
        let is_correct = entry.is_correct();
        if is_correct {
            correct += 1;
        }
        sections.get_mut(question.section).record(is_correct);
        review.push(entry);
    }

    if skipped > 0 {
        tracing::warn!(skipped, "questions skipped while scoring (missing or unscoreable)");
    }

    for section in Section::ALL {
        sections.get_mut(section).finalize();
    }

    let total = review.len();
    let overall_pct = percent(correct, total);

    Analysis {
        correct,
        total,
        overall_pct,
        sections,
        weak_section: weak_section(&sections),
        level: classify_level(overall_pct),
        review,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::bank::test_support::question;

    fn state(ids: &[&str], answers: Vec<Option<usize>>) -> TestState {
        TestState {
            attempt: 1,
            created_at: Utc::now(),
            question_ids: ids.iter().map(|s| s.to_string()).collect(),
            answers,
            current: 0,
        }
    }

    #[test]
    fn percent_edge_cases() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(3, 4), 75);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(classify_level(0).label, LevelLabel::Beginner);
        assert_eq!(classify_level(44).label, LevelLabel::Beginner);
        assert_eq!(classify_level(45).label, LevelLabel::Intermediate);
        assert_eq!(classify_level(69).label, LevelLabel::Intermediate);
        assert_eq!(classify_level(70).label, LevelLabel::Advanced);
        assert_eq!(classify_level(100).label, LevelLabel::Advanced);
        assert!(!classify_level(50).note.is_empty());
    }

    #[test]
    fn weak_section_tie_breaks_in_section_order() {
        let tied = SectionScore {
            pct: 50,
            correct: 1,
            total: 2,
        };
        let scores = SectionScores {
            grammar: tied,
            reading: tied,
            listening: tied,
        };
        assert_eq!(weak_section(&scores), Section::Grammar);

        let scores = SectionScores {
            grammar: SectionScore { pct: 80, ..tied },
            reading: SectionScore { pct: 30, ..tied },
            listening: SectionScore { pct: 30, ..tied },
        };
        assert_eq!(weak_section(&scores), Section::Reading);
    }

    #[test]
    fn scores_per_section_and_overall() {
        let bank = Bank::new(vec![
            question("g1", Section::Grammar, 3, 0),
            question("g2", Section::Grammar, 3, 1),
            question("r1", Section::Reading, 3, 2),
            question("l1", Section::Listening, 3, 3),
        ]);
        let st = state(
            &["g1", "g2", "r1", "l1"],
            vec![Some(0), Some(0), Some(2), None],
        );
        let analysis = score(&st, &bank);

        assert_eq!(analysis.correct, 2);
        assert_eq!(analysis.total, 4);
        assert_eq!(analysis.overall_pct, 50);
        assert_eq!(analysis.sections.grammar.pct, 50);
        assert_eq!(analysis.sections.reading.pct, 100);
        assert_eq!(analysis.sections.listening.pct, 0);
        assert_eq!(analysis.weak_section, Section::Listening);
        assert_eq!(analysis.review.len(), 4);
        assert_eq!(analysis.review[3].chosen, None);
    }

    #[test]
    fn stale_and_unscoreable_questions_are_skipped() {
        let mut broken = question("bad", Section::Reading, 3, 0);
        broken.answer_index = Some(9);
        let bank = Bank::new(vec![question("g1", Section::Grammar, 3, 0), broken]);
        let st = state(&["g1", "gone", "bad"], vec![Some(0), Some(1), Some(0)]);

        let analysis = score(&st, &bank);
        assert_eq!(analysis.total, 1);
        assert_eq!(analysis.correct, 1);
        assert_eq!(analysis.overall_pct, 100);
        assert_eq!(analysis.sections.reading.total, 0);
    }

    #[test]
    fn short_answers_vector_counts_as_unanswered() {
        let bank = Bank::new(vec![
            question("g1", Section::Grammar, 3, 0),
            question("g2", Section::Grammar, 3, 0),
        ]);
        let st = state(&["g1", "g2"], vec![Some(0)]);
        let analysis = score(&st, &bank);
        assert_eq!(analysis.correct, 1);
        assert_eq!(analysis.total, 2);
    }

    #[test]
    fn scoring_is_pure() {
        let bank = Bank::new(vec![
            question("g1", Section::Grammar, 3, 0),
            question("r1", Section::Reading, 3, 1),
        ]);
        let st = state(&["g1", "r1"], vec![Some(1), Some(1)]);
        assert_eq!(score(&st, &bank), score(&st, &bank));
    }

    #[test]
    fn empty_session_scores_zero() {
        let analysis = score(&state(&[], vec![]), &Bank::default());
        assert_eq!(analysis.overall_pct, 0);
        assert_eq!(analysis.total, 0);
        assert_eq!(analysis.weak_section, Section::Grammar);
        assert_eq!(analysis.level.label, LevelLabel::Beginner);
    }
}
