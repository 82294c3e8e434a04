use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examrunner_core::model::{Question, QuestionBank, SubmittedAnswer};
use examrunner_core::session::ExamSession;
use examrunner_core::statistics::summarize;

fn make_log(n: usize) -> Vec<SubmittedAnswer> {
    (0..n)
        .map(|i| SubmittedAnswer {
            question_id: i as u32 + 1,
            selected_index: i % 4,
            is_correct: i % 3 == 0,
            correct_index: 0,
        })
        .collect()
}

fn make_bank(n: usize) -> Arc<QuestionBank> {
    let questions = (0..n)
        .map(|i| Question {
            id: i as u32 + 1,
            text: format!("Question {i}"),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            answer_index: i % 4,
        })
        .collect();
    Arc::new(QuestionBank::new(questions).expect("valid bench bank"))
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for n in [10, 200, 5000] {
        let log = make_log(n);
        group.bench_function(format!("{n}_answers"), |b| {
            b.iter(|| summarize(black_box(&log)))
        });
    }

    group.finish();
}

fn bench_full_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let bank = make_bank(200);

    group.bench_function("answer_all_200", |b| {
        b.iter(|| {
            let mut session = ExamSession::new(Arc::clone(&bank));
            session.start().unwrap();
            for i in 0..200 {
                session.submit(black_box(i % 4)).unwrap();
                session.next().unwrap();
            }
            session.results().unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_summarize, bench_full_session);
criterion_main!(benches);
