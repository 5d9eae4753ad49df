//! Parser benchmarks: the two-pass forward-declaration scheme means every
//! program pays for a prepass over the full token stream before the real
//! parse starts, so these track that overhead at a few program shapes.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use zincc_par::Parser;
use zincc_util::FileId;

fn parse(source: &str) {
    let _ = Parser::parse(black_box(source), FileId::DUMMY);
}

fn bench_parser_straight_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_straight_line");

    let source = "there is a number called x which is 2 plus 3 times 4\nsay x\n";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("declaration_and_say", |b| b.iter(|| parse(source)));

    group.finish();
}

fn bench_parser_forward_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_forward_reference");

    let source = "to do the main thing:\n    say the result of doubling with 21\nend\n\
                  to doubling with a number called n and return a number:\n    return n times 2\nend\n";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("call_before_def", |b| b.iter(|| parse(source)));

    group.finish();
}

fn bench_parser_loop_and_branch(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser_loop_and_branch");

    let source = "to do the main thing:\n\
                  \tfor each number i from 1 to 20:\n\
                  \t\tif i modulo 2 equals 0 then\n\
                  \t\t\tsay i\n\
                  \t\totherwise\n\
                  \t\t\tskip to the next one\n\
                  \t\tend\n\
                  \tend\n\
                  end\n";
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("for_each_with_if", |b| b.iter(|| parse(source)));

    group.finish();
}

criterion_group!(
    benches,
    bench_parser_straight_line,
    bench_parser_forward_reference,
    bench_parser_loop_and_branch
);
criterion_main!(benches);
