use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examrunner_core::convert::convert_text;
use examrunner_core::parser::parse_question_bank_str;

fn bench_json_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_loading");

    // Generate question banks of various sizes
    let small = generate_bank_json(5);
    let medium = generate_bank_json(50);
    let large = generate_bank_json(200);

    group.bench_function("5_questions", |b| {
        b.iter(|| parse_question_bank_str(black_box(&small), black_box("bench.json")))
    });

    group.bench_function("50_questions", |b| {
        b.iter(|| parse_question_bank_str(black_box(&medium), black_box("bench.json")))
    });

    group.bench_function("200_questions", |b| {
        b.iter(|| parse_question_bank_str(black_box(&large), black_box("bench.json")))
    });

    group.finish();
}

fn bench_text_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_conversion");

    let medium = generate_bank_text(50);
    let large = generate_bank_text(200);

    group.bench_function("50_blocks", |b| {
        b.iter(|| convert_text(black_box(&medium)))
    });

    group.bench_function("200_blocks", |b| {
        b.iter(|| convert_text(black_box(&large)))
    });

    group.finish();
}

fn generate_bank_json(n: usize) -> String {
    let entries: Vec<String> = (1..=n)
        .map(|i| {
            format!(
                r#"{{"id": {i}, "question": "Benchmark question {i}?", "options": ["first {i}", "second {i}", "third {i}", "fourth {i}"], "answerIndex": {}}}"#,
                i % 4
            )
        })
        .collect();
    format!("[{}]", entries.join(",\n"))
}

fn generate_bank_text(n: usize) -> String {
    let mut s = String::from("Benchmark question paper\n\n");
    for i in 1..=n {
        s.push_str(&format!(
            "{i}. Benchmark question {i} that wraps\nonto a second line?\nA) first\nB) second\nC) third\nD) fourth\nAnswer: {}\n\n",
            ['A', 'B', 'C', 'D'][i % 4]
        ));
    }
    s
}

criterion_group!(benches, bench_json_loading, bench_text_conversion);
criterion_main!(benches);
