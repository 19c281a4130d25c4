#![allow(missing_docs)]

//! benching
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use proplogic::engine::{infix_to_prefix, Expr, TruthTable};

/// `(P1 * Q1) + (P2 * Q2) + ...`, whose CNF has `2^size` clauses
fn sum_of_products(size: usize) -> String {
    (1..=size)
        .map(|i| format!("(P{i} * Q{i})"))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// `P1 > P2 > ... > Pn` over `size` variables
fn implication_chain(size: usize) -> String {
    (1..=size)
        .map(|i| format!("P{i}"))
        .collect::<Vec<_>>()
        .join(" > ")
}

pub fn bench_prefix(c: &mut Criterion) {
    let mut group = c.benchmark_group("Infix to Prefix");

    for size in [4, 16, 64, 256] {
        let infix = sum_of_products(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &infix, |b, infix| {
            b.iter(|| std::hint::black_box(infix_to_prefix(infix)));
        });
    }

    group.finish();
}

/// Distribution blows up exponentially, so sizes stay small
pub fn bench_cnf(c: &mut Criterion) {
    let mut group = c.benchmark_group("CNF Conversion");

    for size in 2..=10 {
        let expr = Expr::parse_infix(&sum_of_products(size)).expect("benchmark formula parses");

        let (csize, target_time) = if size < 8 {
            (30, std::time::Duration::from_secs(5))
        } else {
            (10, std::time::Duration::from_secs(2))
        };

        group
            .sample_size(csize)
            .measurement_time(target_time)
            .sampling_mode(criterion::SamplingMode::Flat);

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| std::hint::black_box(expr.clone().into_cnf()));
        });
    }

    group.finish();
}

/// Bench enumerating every row up to the variable ceiling
pub fn bench_truth_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("Truth Table");

    for size in (2..=18).step_by(2) {
        let expr = Expr::parse_infix(&implication_chain(size)).expect("benchmark formula parses");

        let csize;
        // Reduce Criterion's own measurement time for large inputs
        let target_time = if size < 10 {
            csize = 30;
            std::time::Duration::from_secs(5)
        } else if size < 15 {
            csize = 15;
            std::time::Duration::from_secs(3)
        } else {
            csize = 10;
            std::time::Duration::from_secs(1)
        };

        group
            .sample_size(csize)
            .measurement_time(target_time)
            .sampling_mode(criterion::SamplingMode::Flat);

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| std::hint::black_box(TruthTable::new(&expr)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_prefix, bench_cnf, bench_truth_table);
criterion_main!(benches);
