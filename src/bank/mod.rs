pub mod loader;
pub mod normalize;
pub mod source;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Grammar,
    Reading,
    Listening,
}

impl Section {
    /// Iteration order doubles as the weak-section tie-break order.
    pub const ALL: [Section; 3] = [Section::Grammar, Section::Reading, Section::Listening];

    /// Case-insensitive mapping of raw section names. Vocabulary is scored
    /// as grammar; anything unrecognized falls back to grammar.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "reading" => Section::Reading,
            "listening" => Section::Listening,
            _ => Section::Grammar,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Grammar => "grammar",
            Section::Reading => "reading",
            Section::Listening => "listening",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Section::Grammar => "Grammar",
            Section::Reading => "Reading",
            Section::Listening => "Listening",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_DIFFICULTY: u8 = 3;
pub const MAX_DIFFICULTY: u8 = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub section: Section,
    pub difficulty: u8,
    pub prompt: String,
    pub options: Vec<String>,
    pub answer_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

impl Question {
    /// The answer key, when it points at one of the options. Questions
    /// without one never count toward a score.
    pub fn scoreable_index(&self) -> Option<usize> {
        self.answer_index.filter(|&i| i < self.options.len())
    }

    /// Reading passage or listening transcript, whichever applies.
    pub fn stimulus(&self) -> Option<&str> {
        match self.section {
            Section::Reading => self.passage.as_deref(),
            Section::Listening => self.transcript.as_deref(),
            Section::Grammar => None,
        }
    }
}

/// Read-only collection of normalized questions.
#[derive(Clone, Debug, Default)]
pub struct Bank {
    questions: Vec<Question>,
    index: HashMap<String, usize>,
}

impl Bank {
    pub fn new(questions: Vec<Question>) -> Self {
        let mut index = HashMap::with_capacity(questions.len());
        for (i, q) in questions.iter().enumerate() {
            // first occurrence wins on duplicate ids
            index.entry(q.id.clone()).or_insert(i);
        }
        Self { questions, index }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.index.get(id).map(|&i| &self.questions[i])
    }

    pub fn in_section(&self, section: Section) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(move |q| q.section == section)
    }

    pub fn section_count(&self, section: Section) -> usize {
        self.in_section(section).count()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn question(id: &str, section: Section, difficulty: u8, answer: usize) -> Question {
        Question {
            id: id.to_string(),
            section,
            difficulty,
            prompt: format!("prompt {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer_index: Some(answer),
            passage: None,
            transcript: None,
        }
    }

    /// `count` questions per section, ids like `grammar-7`, difficulty
    /// cycling through 1..=5, answer key always option 0.
    pub fn uniform_bank(count: usize) -> Bank {
        let mut questions = Vec::new();
        for section in Section::ALL {
            for i in 0..count {
                questions.push(question(
                    &format!("{section}-{i}"),
                    section,
                    (i % 5) as u8 + 1,
                    0,
                ));
            }
        }
        Bank::new(questions)
    }
}
