use criterion::{Criterion, black_box, criterion_group, criterion_main};
use roller_core::parse;

fn bench_parse(c: &mut Criterion) {
    let mut g = c.benchmark_group("parse");
    for token in ["0I2", "7O1.5", "9i0", "3o12.125"] {
        g.bench_function(token, |b| b.iter(|| parse(black_box(token))));
    }
    g.bench_function("invalid", |b| b.iter(|| parse(black_box("4X?"))));
    g.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
