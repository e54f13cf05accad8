use criterion::{black_box, criterion_group, criterion_main, Criterion};

use itemgauge::{conventional_groups, parse, unanswerability, QaEnsemble};

fn generation_line() -> String {
    " [SEP]  [SEP] Which of the following statements about the passage is correct?\
     [SEP] A. The first claim made by the author[SEP] B. The second claim made by the author\
     [SEP] C. The third claim made by the author[SEP] D. The fourth claim made by the author"
        .to_string()
}

fn parse_benchmarks(c: &mut Criterion) {
    let raw = generation_line();
    let context = "A paragraph of source text that the item was generated from.";

    c.bench_function("parse_generation_line", |b| {
        b.iter(|| parse(black_box(&raw), black_box(context)).unwrap())
    });
}

fn stats_benchmarks(c: &mut Criterion) {
    let records = 256;
    let nested: Vec<Vec<Vec<f64>>> = (0..6)
        .map(|m| {
            (0..records)
                .map(|r| (0..4).map(|k| ((m + r * 3 + k * 7) % 11) as f64 * 0.25).collect())
                .collect()
        })
        .collect();
    let ensemble = QaEnsemble::from_nested(&nested, conventional_groups(6, 3).unwrap()).unwrap();

    c.bench_function("unanswerability_256_records", |b| {
        b.iter(|| unanswerability(black_box(&ensemble)))
    });
}

criterion_group!(benches, parse_benchmarks, stats_benchmarks);
criterion_main!(benches);
