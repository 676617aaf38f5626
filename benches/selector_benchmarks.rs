use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde_json::{Value, json};

use leveltest::bank::Bank;
use leveltest::bank::normalize::normalize_bank;
use leveltest::engine::scoring::score;
use leveltest::engine::selector::{Distribution, pick};
use leveltest::session::state::TestState;

fn raw_bank(per_section: usize) -> Value {
    let questions: Vec<Value> = ["grammar", "reading", "listening"]
        .iter()
        .flat_map(|section| {
            (0..per_section).map(move |i| {
                json!({
                    "id": format!("{section}-{i}"),
                    "section": section,
                    "difficulty": (i % 5) + 1,
                    "prompt": "?",
                    "choices": ["a", "b", "c", "d"],
                    "correctIndex": i % 4,
                })
            })
        })
        .collect();
    json!({ "questions": questions })
}

fn make_bank(per_section: usize) -> Bank {
    normalize_bank(raw_bank(per_section), &mut SmallRng::seed_from_u64(0))
}

fn bench_normalize(c: &mut Criterion) {
    let raw = raw_bank(300);
    c.bench_function("normalize_bank (900 questions)", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| normalize_bank(black_box(raw.clone()), &mut rng))
    });
}

fn bench_pick(c: &mut Criterion) {
    let bank = make_bank(300);
    let dist = Distribution::default();
    let last_ids: Vec<String> = (0..20).map(|i| format!("grammar-{i}")).collect();

    c.bench_function("pick 50 from 900 (attempt 3)", |b| {
        let mut rng = SmallRng::seed_from_u64(2);
        b.iter(|| pick(black_box(&bank), 3, black_box(&last_ids), &dist, &mut rng))
    });
}

fn bench_score(c: &mut Criterion) {
    let bank = make_bank(300);
    let mut rng = SmallRng::seed_from_u64(3);
    let ids: Vec<String> = pick(&bank, 1, &[], &Distribution::default(), &mut rng)
        .into_iter()
        .map(|q| q.id.clone())
        .collect();
    let mut state = TestState::new(1, ids);
    for (i, slot) in state.answers.iter_mut().enumerate() {
        *slot = Some(i % 4);
    }

    c.bench_function("score 50 answers", |b| {
        b.iter(|| score(black_box(&state), black_box(&bank)))
    });
}

criterion_group!(benches, bench_normalize, bench_pick, bench_score);
criterion_main!(benches);
