use criterion::{criterion_group, criterion_main, Criterion};
use dotmatrix::test::{build_test, TestOptions};

fn benchmark_cpu_step(c: &mut Criterion) {
    let mut gb = build_test(TestOptions::default());
    gb.load_rom_empty().unwrap();

    c.bench_function("cpu_step", |b| {
        b.iter(|| {
            for _ in 0..1_000_000 {
                gb.step();
            }
        })
    });
}

criterion_group!(benches, benchmark_cpu_step);
criterion_main!(benches);
