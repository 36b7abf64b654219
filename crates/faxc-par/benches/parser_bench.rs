//! Parser benchmarks. Run with `cargo bench --package faxc-par`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use faxc_par::Parser;

fn parse_source(source: &str) -> usize {
    let output = Parser::new(source).parse_program();
    output.statements.len()
}

fn bench_parser_var_decl(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let source = "number x = 42;";
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("var_decl", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_function(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_function");

    let source = r#"
        number fib(number n) {
            if (n <= 1) {
                return n;
            }
            return fib(n - 1) + fib(n - 2);
        }
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("recursive_function", |b| {
        b.iter(|| parse_source(black_box(source)))
    });

    group.finish();
}

fn bench_parser_control_flow(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_control_flow");

    let source = r#"
        number process(number n) {
            number sum = 0;
            for (number i = 0; i < n; i = i + 1) {
                sum = sum + i;
            }
            while (sum > 100) {
                sum = sum - 100;
            }
            return sum;
        }
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("loops", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

fn bench_parser_class(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_class");

    let source = r#"
        class Point {
            number x = 0;
            number y = 0;
            number distance(Point other) {
                return (x - other.x) * (x - other.x);
            }
        }
    "#;
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("class_decl", |b| b.iter(|| parse_source(black_box(source))));

    group.finish();
}

criterion_group!(
    benches,
    bench_parser_var_decl,
    bench_parser_function,
    bench_parser_control_flow,
    bench_parser_class
);
criterion_main!(benches);
