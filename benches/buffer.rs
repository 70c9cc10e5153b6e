use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use line_pipeline::Buffer;
use std::thread;

fn benchmark_uncontended_push_pop(c: &mut Criterion) {
    let buffer = Buffer::new(1024);
    let mut group = c.benchmark_group("buffer");
    group.throughput(Throughput::Elements(1));
    group.bench_function("uncontended_push_pop", |b| {
        b.iter(|| {
            buffer.push(black_box(vec![0u8; 64])).unwrap();
            black_box(buffer.pop());
        });
    });
    group.finish();
}

fn benchmark_spsc_handoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    group.throughput(Throughput::Elements(10_000));
    group.bench_function("spsc_10k_capacity_16", |b| {
        b.iter(|| {
            let buffer = Buffer::new(16);
            let consumer = {
                let buffer = buffer.clone();
                thread::spawn(move || {
                    let mut count = 0u64;
                    while buffer.pop().is_some() {
                        count += 1;
                    }
                    count
                })
            };

            for i in 0..10_000u32 {
                buffer.push(black_box(i.to_le_bytes().to_vec())).unwrap();
            }
            buffer.close();
            assert_eq!(consumer.join().unwrap(), 10_000);
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_uncontended_push_pop,
    benchmark_spsc_handoff
);
criterion_main!(benches);
