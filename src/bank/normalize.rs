use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::{Map, Value};

use crate::bank::{Bank, DEFAULT_DIFFICULTY, MAX_DIFFICULTY, Question, Section};

const GENERATED_ID_LEN: usize = 10;

/// Parse a raw payload and normalize it into a bank.
pub fn parse_bank<R: Rng + ?Sized>(raw: &str, rng: &mut R) -> serde_json::Result<Bank> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(normalize_bank(value, rng))
}

/// Accepts a bare list of question records or an object wrapping a
/// `questions` list. Any other shape yields an empty bank.
pub fn normalize_bank<R: Rng + ?Sized>(value: Value, rng: &mut R) -> Bank {
    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("questions") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let questions: Vec<Question> = records
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(obj) => Some(normalize_question(&obj, rng)),
            _ => None,
        })
        .collect();

    Bank::new(questions)
}

pub fn normalize_question<R: Rng + ?Sized>(raw: &Map<String, Value>, rng: &mut R) -> Question {
    let id = first_present(raw, &["id", "qid"])
        .and_then(scalar_text)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| random_id(rng));

    let section = raw
        .get("section")
        .and_then(Value::as_str)
        .map(Section::from_raw)
        .unwrap_or(Section::Grammar);

    // the first key present decides; a bad value there leaves no answer key
    let answer_index = first_present(raw, &["answerIndex", "correctIndex", "answer"])
        .and_then(as_index);

    let options = ["options", "choices"]
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(|v| v.as_array())
        .map(|items| items.iter().filter_map(scalar_text).collect())
        .unwrap_or_default();

    Question {
        id,
        section,
        difficulty: difficulty(raw.get("difficulty")),
        prompt: raw
            .get("prompt")
            .and_then(scalar_text)
            .unwrap_or_default(),
        options,
        answer_index,
        passage: first_present(raw, &["passage", "passageText"]).and_then(scalar_text),
        transcript: first_present(raw, &["transcript", "audioText"]).and_then(scalar_text),
    }
}

fn first_present<'a>(raw: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get(*key))
        .find(|v| !v.is_null())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_index(value: &Value) -> Option<usize> {
    let n = value.as_f64()?;
    if n >= 0.0 && n.fract() == 0.0 {
        Some(n as usize)
    } else {
        None
    }
}

/// Missing, zero or non-numeric difficulty means 3; valid values are
/// rounded and clamped into 1..=5.
fn difficulty(value: Option<&Value>) -> u8 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() && n != 0.0 => n.round().clamp(1.0, MAX_DIFFICULTY as f64) as u8,
        _ => DEFAULT_DIFFICULTY,
    }
}

fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..GENERATED_ID_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_lowercase())
        .collect()
}
