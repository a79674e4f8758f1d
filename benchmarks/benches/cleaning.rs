use benchmarks::raw_listings;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rental_insights::cleaning::{clean_listings, FlagDetector};
use rental_insights::config::CleaningConfig;
use rental_insights::dataset::read_raw_listings;

fn raw_csv(n: usize) -> Vec<u8> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in raw_listings(n, 42) {
        wtr.serialize(row).unwrap();
    }
    wtr.into_inner().unwrap()
}

fn bench_clean_listings(c: &mut Criterion) {
    let config = CleaningConfig::default();
    let mut group = c.benchmark_group("clean_listings");
    for size in [100, 1000, 10000].iter() {
        let raw = raw_listings(*size, 42);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| {
                let output = clean_listings(black_box(raw), &config).unwrap();
                black_box(output);
            });
        });
    }
    group.finish();
}

fn bench_read_raw_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_raw_csv");
    for size in [1000, 10000].iter() {
        let bytes = raw_csv(*size);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &bytes, |b, bytes| {
            b.iter(|| {
                let rows = read_raw_listings(black_box(bytes.as_slice())).unwrap();
                black_box(rows);
            });
        });
    }
    group.finish();
}

fn bench_flag_detection(c: &mut Criterion) {
    let detector = FlagDetector::from_config(&CleaningConfig::default()).unwrap();
    let raw = raw_listings(1000, 7);
    c.bench_function("flag_detection_1000", |b| {
        b.iter(|| {
            for listing in &raw {
                black_box(detector.detect(black_box(listing)));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_clean_listings,
    bench_read_raw_csv,
    bench_flag_detection
);
criterion_main!(benches);
