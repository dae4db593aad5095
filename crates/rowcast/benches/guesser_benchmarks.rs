//! Type guessing and schema synthesis benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rowcast::{MemoryCursor, SchemaSynthesizer, TranslationConfig, TypeGuesser};

/// Build an in-memory grid mixing integers, reals, dates, and labels.
fn generate_grid(rows: usize) -> MemoryCursor {
    let grid: Vec<Vec<Option<String>>> = (0..rows)
        .map(|row| {
            vec![
                Some(format!("{row}")),
                Some(format!("{:.3}", row as f64 / 7.0)),
                Some(format!("2023-{:02}-{:02}", (row % 12) + 1, (row % 28) + 1)),
                Some(if row % 2 == 0 { "yes" } else { "no" }.to_string()),
                Some(format!("label_{}", row % 50)),
            ]
        })
        .collect();
    MemoryCursor::new(grid)
}

/// Benchmark the probe pass at various probe depths.
fn bench_guess(c: &mut Criterion) {
    let mut group = c.benchmark_group("type_guess");

    for probe in [100, 1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("probe_rows", probe), probe, |b, &probe| {
            b.iter_with_setup(
                || {
                    let cursor = generate_grid(probe);
                    let config = TranslationConfig::bootstrap(&cursor);
                    (cursor, config)
                },
                |(mut cursor, mut config)| {
                    TypeGuesser::new()
                        .with_probe_rows(probe)
                        .guess(&mut cursor, &mut config)
                        .unwrap();
                    black_box(config)
                },
            )
        });
    }

    group.finish();
}

/// Benchmark schema synthesis over a fully-typed configuration.
fn bench_synthesize(c: &mut Criterion) {
    let mut group = c.benchmark_group("schema_synthesis");

    for rows in [1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("rows", rows), rows, |b, &rows| {
            b.iter_with_setup(
                || {
                    let mut cursor = generate_grid(rows);
                    let mut config = TranslationConfig::bootstrap(&cursor);
                    TypeGuesser::new().guess(&mut cursor, &mut config).unwrap();
                    (cursor, config)
                },
                |(mut cursor, config)| {
                    black_box(
                        SchemaSynthesizer::new()
                            .synthesize(&mut cursor, &config)
                            .unwrap(),
                    )
                },
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_guess, bench_synthesize);
criterion_main!(benches);
