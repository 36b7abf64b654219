//! Lexer benchmarks. Run with `cargo bench --package faxc-lex`.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use faxc_lex::Lexer;

fn token_count(source: &str) -> usize {
    Lexer::new(source).tokenize().len()
}

fn bench_lexer_keywords(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = "function number add(number a, number b) { return a + b; }";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("var_decl", |b| {
        b.iter(|| token_count(black_box("number x = 42;")))
    });

    group.bench_function("function_with_body", |b| {
        b.iter(|| token_count(black_box(source)))
    });

    group.finish();
}

fn bench_lexer_complex(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer_complex");

    let unicode_source = "number 变量名 = 42; 变量名 = 变量名 + 1;";
    group.bench_function("unicode_identifiers", |b| {
        b.iter(|| token_count(black_box(unicode_source)))
    });

    let multiline_string = "const text = \"\"\"\n    Hello,\n    World!\n    \"\"\";";
    group.bench_function("multiline_string", |b| {
        b.iter(|| token_count(black_box(multiline_string)))
    });

    let loop_source = "for (number i = 0; i < 1000; i = i + 1) { sum = sum + i; }";
    group.bench_function("for_loop", |b| {
        b.iter(|| token_count(black_box(loop_source)))
    });

    group.finish();
}

criterion_group!(benches, bench_lexer_keywords, bench_lexer_complex);
criterion_main!(benches);
