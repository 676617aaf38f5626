use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bank::Section;
use crate::engine::scoring::Analysis;

/// Time the learner has until their real exam.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Timeframe {
    LessThanDay,
    ThreeDays,
    #[default]
    SevenDays,
    FifteenDays,
    ThirtyDays,
    SixtyDays,
    NinetyDays,
    NoDate,
}

impl Timeframe {
    pub const ALL: [Timeframe; 8] = [
        Timeframe::LessThanDay,
        Timeframe::ThreeDays,
        Timeframe::SevenDays,
        Timeframe::FifteenDays,
        Timeframe::ThirtyDays,
        Timeframe::SixtyDays,
        Timeframe::NinetyDays,
        Timeframe::NoDate,
    ];

    /// Unknown or blank keys fall back to the seven-day bucket.
    pub fn parse(key: &str) -> Self {
        match key.trim() {
            "lt24" => Timeframe::LessThanDay,
            "3d" => Timeframe::ThreeDays,
            "7d" => Timeframe::SevenDays,
            "15d" => Timeframe::FifteenDays,
            "30d" => Timeframe::ThirtyDays,
            "60d" => Timeframe::SixtyDays,
            "90d" => Timeframe::NinetyDays,
            "no_date" => Timeframe::NoDate,
            _ => Timeframe::default(),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Timeframe::LessThanDay => "lt24",
            Timeframe::ThreeDays => "3d",
            Timeframe::SevenDays => "7d",
            Timeframe::FifteenDays => "15d",
            Timeframe::ThirtyDays => "30d",
            Timeframe::SixtyDays => "60d",
            Timeframe::NinetyDays => "90d",
            Timeframe::NoDate => "no_date",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::LessThanDay => "Less than 24 hours",
            Timeframe::ThreeDays => "Within 3 days",
            Timeframe::SevenDays => "Within 7 days",
            Timeframe::FifteenDays => "Within 15 days",
            Timeframe::ThirtyDays => "Within a month",
            Timeframe::SixtyDays => "Within two months",
            Timeframe::NinetyDays => "Within 3 months",
            Timeframe::NoDate => "Not booked yet",
        }
    }
}

impl From<String> for Timeframe {
    fn from(key: String) -> Self {
        Timeframe::parse(&key)
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.key().to_string()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDay {
    pub label: String,
    pub tag: String,
    pub tasks: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub title: String,
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_advice: Option<String>,
    pub days: Vec<PlanDay>,
}

/// Select and parameterize the study plan for a timeframe.
pub fn build_plan(timeframe: Timeframe, analysis: &Analysis) -> Plan {
    let weak = analysis.weak_section;
    let (title, days) = template(timeframe, weak);

    let booking_advice = match timeframe {
        Timeframe::NoDate => Some(booking_advice(analysis.overall_pct).to_string()),
        _ => None,
    };

    Plan {
        title: title.to_string(),
        tips: vec![section_tip(weak).to_string()],
        booking_advice,
        days,
    }
}

pub fn section_tip(section: Section) -> &'static str {
    match section {
        Section::Listening => {
            "Catch the general idea first, then the details: listen for keywords only."
        }
        Section::Reading => "Skim, then scan. Never get stuck on a single question.",
        Section::Grammar => "Understand the rule, then apply it right away instead of memorizing lists.",
    }
}

/// How long to prepare before booking, banded by overall score.
pub fn booking_advice(overall_pct: u32) -> &'static str {
    if overall_pct >= 75 {
        "Your level allows booking after 10-14 days of regular practice (with the latest mock papers)."
    } else if overall_pct >= 55 {
        "Book after 3-4 weeks (follow the 30-day plan) to raise accuracy and settle the basics."
    } else {
        "Book after 6-8 weeks (follow the 60-day plan) to build a strong base, then full mocks."
    }
}

fn day(label: &str, tag: &str, tasks: &[&str]) -> PlanDay {
    PlanDay {
        label: label.to_string(),
        tag: tag.to_string(),
        tasks: tasks.iter().map(|t| t.to_string()).collect(),
    }
}

fn pick_task<'a>(emphasize: bool, focused: &'a str, regular: &'a str) -> &'a str {
    if emphasize { focused } else { regular }
}

fn template(timeframe: Timeframe, weak: Section) -> (&'static str, Vec<PlanDay>) {
    match timeframe {
        Timeframe::LessThanDay => (
            "One-day plan (rescue)",
            vec![day(
                "Today (before the exam)",
                "Rescue",
                &[
                    "1 hour in the morning: review reading and listening strategies (main idea + keywords).",
                    "2 hours: one timed reading set and one listening set, then a quick review of the answers.",
                    "1 hour in the evening: common grammar mistakes and linking words.",
                    "Last 20 minutes: study the latest mock papers for their pattern, not for volume.",
                ],
            )],
        ),
        Timeframe::ThreeDays => (
            "Three-day plan (intensive)",
            vec![
                day(
                    "Day 1",
                    "Intro",
                    &[
                        "Introductory lectures: learn the exam format and the course plan.",
                        "Take a short diagnostic test and write down every mistake.",
                        pick_task(
                            weak == Section::Grammar,
                            "Extra focus: tenses and conditionals (if-clauses).",
                            "Quick review of core grammar.",
                        ),
                    ],
                ),
                day(
                    "Day 2",
                    "Focus",
                    &[
                        pick_task(
                            weak == Section::Reading,
                            "Reading techniques: skim/scan and two timed passages.",
                            "One timed reading passage with answer review.",
                        ),
                        pick_task(
                            weak == Section::Listening,
                            "Listening: keyword drill and three short clips.",
                            "Listening: one clip while noting keywords.",
                        ),
                        "Review recurring vocabulary and linking words.",
                    ],
                ),
                day(
                    "Day 3",
                    "Simulation",
                    &[
                        "Take a short mixed mock test.",
                        "Review your mistakes and collect them on a single sheet.",
                        "Study the latest mock papers as question patterns.",
                    ],
                ),
            ],
        ),
        Timeframe::SevenDays => (
            "Seven-day plan (most popular)",
            vec![
                day(
                    "Day 1",
                    "Foundation",
                    &[
                        "Introductory lectures and the exam structure.",
                        pick_task(
                            weak == Section::Grammar,
                            "Grammar: core tenses plus 20 practice questions.",
                            "Grammar: quick review plus 10 questions.",
                        ),
                    ],
                ),
                day(
                    "Day 2",
                    "Grammar",
                    &[
                        "Grammar: conditionals, agreement and error spotting.",
                        "Short grammar set, then log your mistakes.",
                    ],
                ),
                day(
                    "Day 3",
                    "Reading",
                    &[
                        "Reading: skim/scan, main idea and inference.",
                        "Two timed passages with a quick review.",
                    ],
                ),
                day(
                    "Day 4",
                    "Listening",
                    &[
                        "Listening: keyword strategy and short drills.",
                        "A short listening set with answer review.",
                    ],
                ),
                day(
                    "Day 5",
                    "Mix",
                    &[
                        "Mixed practice (grammar, reading and listening).",
                        "An extra 15 minutes on your weak section.",
                    ],
                ),
                day(
                    "Day 6",
                    "Mocks",
                    &[
                        "Take a mock test (partial or full, as time allows).",
                        "Start with the most recent paper, then review its mistakes.",
                    ],
                ),
                day(
                    "Day 7",
                    "Wrap-up",
                    &[
                        "One final mock, preferably the newest paper.",
                        "Review your mistake sheet, linking words and time management.",
                        "Sleep early and stop studying at the last minute.",
                    ],
                ),
            ],
        ),
        Timeframe::FifteenDays => (
            "Fifteen-day plan (consolidate and level up)",
            vec![
                day(
                    "Days 1-3",
                    "Intro",
                    &[
                        "All introductory lectures plus the intro worksheet (solve, then check).",
                        "Set a fixed routine: 45-60 minutes a day.",
                    ],
                ),
                day(
                    "Days 4-7",
                    "Grammar",
                    &[
                        "Grammar lessons: tenses, conditionals and relative pronouns.",
                        "Unsolved grammar sets, then review the solutions.",
                    ],
                ),
                day(
                    "Days 8-10",
                    "Reading",
                    &[
                        "Reading strategies and recurring passages.",
                        "One or two timed passages a day with answer review.",
                    ],
                ),
                day(
                    "Days 11-12",
                    "Listening",
                    &[
                        "Listening strategies and short mock clips.",
                        "30 minutes of keyword practice every day.",
                    ],
                ),
                day(
                    "Days 13-15",
                    "Mock + Analysis",
                    &[
                        "A full mock test with a detailed error analysis.",
                        "Focus on the three most recent mock papers.",
                    ],
                ),
            ],
        ),
        Timeframe::ThirtyDays => (
            "Thirty-day plan (steady and methodical)",
            vec![
                day(
                    "Week 1",
                    "Foundation",
                    &[
                        "Introduction and the exam pattern.",
                        "Build vocabulary daily (15 minutes).",
                    ],
                ),
                day(
                    "Week 2",
                    "Grammar",
                    &[
                        "Complete grammar coverage with review questions.",
                        pick_task(
                            weak == Section::Grammar,
                            "More daily practice and extra grammar sets.",
                            "Work through grammar sets gradually.",
                        ),
                    ],
                ),
                day(
                    "Week 3",
                    "Reading + Exceptions",
                    &[
                        "Reading: strategies, recurring passages and the rescue capsule.",
                        "Grammar exceptions to push the score higher.",
                    ],
                ),
                day(
                    "Week 4",
                    "Listening + Mock",
                    &[
                        "Listening: steady drills and mock clips.",
                        "Full mock tests with error review.",
                        "Last 3 days: the two most recent papers.",
                    ],
                ),
            ],
        ),
        Timeframe::SixtyDays => (
            "Sixty-day plan (strong base and mocks)",
            vec![
                day(
                    "Month 1",
                    "Foundation",
                    &[
                        "Introduction, core grammar and gradual reading practice.",
                        "Short fixed sessions; do not scatter across sources.",
                    ],
                ),
                day(
                    "Month 2",
                    "Mocks + Consolidation",
                    &[
                        "A mock every other day with error review.",
                        "Timed listening and reading.",
                        "Advanced exceptions and the latest papers before the exam.",
                    ],
                ),
            ],
        ),
        Timeframe::NinetyDays => (
            "Ninety-day plan (best for building up)",
            vec![
                day(
                    "Month 1",
                    "Foundation",
                    &[
                        "Introductory lectures, core grammar and daily vocabulary.",
                        "Grammar concept maps for quick review.",
                    ],
                ),
                day(
                    "Month 2",
                    "Reading + Exceptions",
                    &[
                        "Reading: long passages, strategies and recurring passages.",
                        "Grammar exceptions to raise accuracy.",
                    ],
                ),
                day(
                    "Month 3",
                    "Listening + Mock",
                    &[
                        "Listening: steady practice and mock clips.",
                        "A full mock every week with analysis.",
                        "Final week: the two most recent papers.",
                    ],
                ),
            ],
        ),
        Timeframe::NoDate => (
            "Flexible plan (no exam date yet)",
            vec![
                day(
                    "Weeks 1-2",
                    "Foundation",
                    &[
                        "Introductory lectures and the exam pattern.",
                        "A fixed daily slot: 45 minutes, five days a week.",
                    ],
                ),
                day(
                    "Weeks 3-4",
                    "Targeted practice",
                    &[
                        pick_task(
                            weak == Section::Grammar,
                            "Daily grammar sets on your weakest rules.",
                            "Grammar review twice a week.",
                        ),
                        pick_task(
                            weak == Section::Reading,
                            "A timed reading passage every day.",
                            "Two timed reading passages a week.",
                        ),
                        pick_task(
                            weak == Section::Listening,
                            "Daily listening clips with keyword notes.",
                            "Listening clips twice a week.",
                        ),
                    ],
                ),
                day(
                    "Until booking",
                    "Mocks",
                    &[
                        "A full mock test every week with error analysis.",
                        "Retake the placement test to decide when to book.",
                    ],
                ),
            ],
        ),
    }
}
