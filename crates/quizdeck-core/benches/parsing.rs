use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use quizdeck_core::loader::parse_raw_set;
use quizdeck_core::selection::ShuffleWithinCategories;

fn question_json(i: usize) -> String {
    format!(
        r#"{{"passageTitle": "p{i}", "passage": "passage {i}", "question": "q{i}", "choices": ["a", "b", "c", "d"], "answer": {}, "explanation": "", "type": "objective", "image": ""}}"#,
        i % 4
    )
}

fn flat_set(n: usize) -> String {
    let list: Vec<String> = (0..n).map(question_json).collect();
    format!(r#"{{"title": "bench", "list": [{}]}}"#, list.join(","))
}

fn categorized_set(categories: usize, per_category: usize) -> String {
    let entries: Vec<String> = (0..categories)
        .map(|c| {
            let list: Vec<String> = (0..per_category).map(question_json).collect();
            format!(r#""category{c}": [{}]"#, list.join(","))
        })
        .collect();
    format!("{{{}}}", entries.join(","))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_raw_set");

    let small = flat_set(10);
    let large = flat_set(500);
    let categorized = categorized_set(10, 50);

    group.bench_function("flat_10", |b| b.iter(|| parse_raw_set(black_box(&small))));
    group.bench_function("flat_500", |b| b.iter(|| parse_raw_set(black_box(&large))));
    group.bench_function("categorized_10x50", |b| {
        b.iter(|| parse_raw_set(black_box(&categorized)))
    });

    group.finish();
}

fn bench_shuffle(c: &mut Criterion) {
    let categorized = categorized_set(10, 50);

    c.bench_function("shuffle_within_categories_10x50", |b| {
        b.iter(|| {
            let raw = parse_raw_set(&categorized).unwrap();
            let mut rng = StdRng::seed_from_u64(7);
            raw.into_questions(&ShuffleWithinCategories, &mut rng)
        })
    });
}

criterion_group!(benches, bench_parse, bench_shuffle);
criterion_main!(benches);
