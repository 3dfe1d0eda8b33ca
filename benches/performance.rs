use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lazyseq_core::SeqConfig;
use lazyseq_operators::Sequence;

fn make_rows(rows: usize) -> Vec<(i64, String)> {
    (0..rows)
        .map(|i| (i as i64, format!("group-{}", i % 16)))
        .collect()
}

fn bench_streaming_chain(c: &mut Criterion) {
    let seq = Sequence::range(0, 10_000)
        .filter(|x| x % 3 == 0)
        .select(|x| x * 2)
        .take_while(|x| *x < 15_000);
    c.bench_function("filter_select_take_while_10k", |b| {
        b.iter(|| black_box(seq.sum().unwrap()))
    });
}

fn bench_order_by(c: &mut Criterion) {
    let rows = Sequence::from_vec(make_rows(4096)).shuffle_with(&SeqConfig::default().with_seed(1));
    let sorted = rows.order_by(|r| r.1.clone()).then_by_descending(|r| r.0);
    c.bench_function("order_by_then_by_4k", |b| {
        b.iter(|| black_box(sorted.count().unwrap()))
    });
}

fn bench_group_by(c: &mut Criterion) {
    let rows = Sequence::from_vec(make_rows(4096));
    let groups = rows.group_by_select(|r| r.1.clone(), |key, g| (key, g.count().unwrap_or(0)));
    c.bench_function("group_by_4k", |b| {
        b.iter(|| black_box(groups.to_vec().unwrap()))
    });
}

fn bench_join(c: &mut Criterion) {
    let outer = Sequence::range(0, 2048);
    let inner = Sequence::range(0, 4096).select(|x| x / 2);
    let joined = outer.join(inner, |o| *o, |i| *i, |o, i| o + i);
    c.bench_function("hash_join_2k_x_4k", |b| {
        b.iter(|| black_box(joined.count().unwrap()))
    });
}

fn bench_distinct(c: &mut Criterion) {
    let seq = Sequence::range(0, 10_000).select(|x| x % 257);
    c.bench_function("distinct_10k", |b| {
        b.iter(|| black_box(seq.distinct().count().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_streaming_chain,
    bench_order_by,
    bench_group_by,
    bench_join,
    bench_distinct
);
criterion_main!(benches);
