use criterion::{black_box, criterion_group, criterion_main, Criterion};

use helmcurve_core::accuracy::instance_accuracy;
use helmcurve_core::evaluator::{matches_up_to_symbol_permutation, Evaluator};
use helmcurve_core::model::*;

fn make_response(id: usize, expected: &str, completion: &str) -> Response {
    Response {
        instance: Instance {
            id: format!("id{id}"),
            split: Some(Split::Test),
            references: vec![
                Reference {
                    output: expected.into(),
                    tags: vec!["correct".into()],
                },
                Reference {
                    output: "wrong".into(),
                    tags: vec![],
                },
            ],
        },
        train_trial_index: 0,
        output_mapping: None,
        result: RequestResult {
            completions: vec![Completion {
                text: completion.into(),
            }],
        },
    }
}

fn bench_evaluators(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluators");

    group.bench_function("exact_match", |b| {
        let response = make_response(0, "Paris", " Paris ");
        b.iter(|| Evaluator::ExactMatch.score(black_box(&response)))
    });

    group.bench_function("boxed_expression", |b| {
        let response = make_response(0, "so boxed{\\frac{1}{2}}", "I get boxed{\\frac{1}{2}} here");
        b.iter(|| Evaluator::BoxedExpression.score(black_box(&response)))
    });

    group.bench_function("answer_phrase", |b| {
        let response = make_response(0, "The answer is 18.", "Adding up, The answer is 18.");
        b.iter(|| Evaluator::AnswerPhrase.score(black_box(&response)))
    });

    group.bench_function("symbol_permutation", |b| {
        b.iter(|| {
            matches_up_to_symbol_permutation(
                black_box("X + Y * Z = Z - X"),
                black_box("Z + X * Y = Y - Z"),
            )
        })
    });

    group.finish();
}

fn bench_instance_accuracy(c: &mut Criterion) {
    let responses: Vec<Response> = (0..1000)
        .map(|i| make_response(i, "answer", if i % 3 == 0 { "answer" } else { "other" }))
        .collect();

    c.bench_function("instance_accuracy_1000", |b| {
        b.iter(|| instance_accuracy(black_box(&responses), "dyck", Some(Split::Test)))
    });
}

criterion_group!(benches, bench_evaluators, bench_instance_accuracy);
criterion_main!(benches);
