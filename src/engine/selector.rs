use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::bank::{Bank, Question, Section};

/// Per-section question targets for one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(default = "default_grammar")]
    pub grammar: usize,
    #[serde(default = "default_reading")]
    pub reading: usize,
    #[serde(default = "default_listening")]
    pub listening: usize,
}

fn default_grammar() -> usize {
    20
}
fn default_reading() -> usize {
    20
}
fn default_listening() -> usize {
    10
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            grammar: default_grammar(),
            reading: default_reading(),
            listening: default_listening(),
        }
    }
}

impl Distribution {
    pub fn target(&self, section: Section) -> usize {
        match section {
            Section::Grammar => self.grammar,
            Section::Reading => self.reading,
            Section::Listening => self.listening,
        }
    }

    pub fn total(&self) -> usize {
        self.grammar + self.reading + self.listening
    }
}

/// Difficulty floor for an attempt: 1, then 2, then 3 from the third
/// attempt on.
pub fn min_difficulty(attempt: u32) -> u8 {
    match attempt {
        0 | 1 => 1,
        2 => 2,
        _ => 3,
    }
}

/// Build the question list for one attempt.
///
/// Each section is narrowed in two independent steps, each of which is
/// dropped when it would leave fewer candidates than the section target:
/// first excluding the previous attempt's ids, then applying the difficulty
/// floor. The survivors are shuffled and truncated to the target (a thin pool
/// just under-fills), and the concatenation is shuffled once more so sections
/// interleave.
pub fn pick<'b, R: Rng + ?Sized>(
    bank: &'b Bank,
    attempt: u32,
    last_ids: &[String],
    distribution: &Distribution,
    rng: &mut R,
) -> Vec<&'b Question> {
    let excluded: HashSet<&str> = last_ids.iter().map(String::as_str).collect();
    let floor = min_difficulty(attempt);
    let mut picked = Vec::with_capacity(distribution.total());

    for section in Section::ALL {
        let need = distribution.target(section);
        if need == 0 {
            continue;
        }

        let mut pool: Vec<&Question> = bank.in_section(section).collect();

        let fresh: Vec<&Question> = pool
            .iter()
            .copied()
            .filter(|q| !excluded.contains(q.id.as_str()))
            .collect();
        if fresh.len() >= need {
            pool = fresh;
        }

        let hard: Vec<&Question> = pool
            .iter()
            .copied()
            .filter(|q| q.difficulty >= floor)
            .collect();
        if hard.len() >= need {
            pool = hard;
        }

        pool.shuffle(rng);
        pool.truncate(need);

        if pool.len() < need {
            tracing::debug!(
                section = %section,
                need,
                available = pool.len(),
                "section under-filled"
            );
        }
        picked.extend(pool);
    }

    picked.shuffle(rng);
    picked
}
