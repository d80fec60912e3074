use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxistr::similarity::SystemAllocator;
use oxistr::{ByteSet, SubstitutionMatrix};

fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

fn bench_byte_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_byte");
    for size in [1 << 10, 1 << 16, 1 << 20] {
        let mut hay = gen_data(size, 7);
        // Plant the needle near the end so the scan covers the buffer.
        let needle = 0xA7;
        hay.iter_mut().for_each(|b| {
            if *b == needle {
                *b = 0;
            }
        });
        hay[size - 3] = needle;
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("dispatch", size), &hay, |b, hay| {
            b.iter(|| oxistr::find_byte(black_box(hay), needle))
        });
        group.bench_with_input(BenchmarkId::new("serial", size), &hay, |b, hay| {
            b.iter(|| oxistr::serial::find_byte(black_box(hay), needle))
        });
    }
    group.finish();
}

fn bench_substring_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    let hay = gen_data(1 << 20, 42);
    for needle_len in [3usize, 8, 16, 64] {
        let needle = hay[hay.len() - needle_len - 1..hay.len() - 1].to_vec();
        group.throughput(Throughput::Bytes(hay.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("dispatch", needle_len),
            &needle,
            |b, needle| b.iter(|| oxistr::find(black_box(&hay), black_box(needle))),
        );
        group.bench_with_input(
            BenchmarkId::new("serial", needle_len),
            &needle,
            |b, needle| b.iter(|| oxistr::serial::find(black_box(&hay), black_box(needle))),
        );
    }
    group.finish();
}

fn bench_byteset_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_byteset");
    let size = 1 << 20;
    let hay = gen_data(size, 99).iter().map(|b| b | 0x80).collect::<Vec<_>>();
    let ascii = ByteSet::ascii();
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("dispatch", |b| {
        b.iter(|| oxistr::find_byteset(black_box(&hay), &ascii))
    });
    group.bench_function("serial", |b| {
        b.iter(|| oxistr::serial::find_byteset(black_box(&hay), &ascii))
    });
    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");
    let size = 1 << 18;
    let a = gen_data(size, 3);
    let mut b = a.clone();
    b[size - 1] ^= 1;
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("equal", |bench| {
        bench.iter(|| oxistr::equal(black_box(&a), black_box(&b)))
    });
    group.bench_function("order", |bench| {
        bench.iter(|| oxistr::order(black_box(&a), black_box(&b)))
    });
    group.finish();
}

fn bench_checksum_and_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    for size in [64usize, 4096, 1 << 21] {
        let data = gen_data(size, 11);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("checksum", size), &data, |b, data| {
            b.iter(|| oxistr::checksum(black_box(data)))
        });
        group.bench_with_input(BenchmarkId::new("hash", size), &data, |b, data| {
            b.iter(|| oxistr::hash(black_box(data)))
        });
    }
    group.finish();
}

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");
    let alloc = SystemAllocator;
    let a = gen_data(512, 21);
    let mut b = a.clone();
    for i in (0..b.len()).step_by(17) {
        b[i] = b[i].wrapping_add(1);
    }
    group.bench_function("levenshtein_512", |bench| {
        bench.iter(|| oxistr::levenshtein(black_box(&a), black_box(&b), &alloc))
    });
    let unit = SubstitutionMatrix::uniform(0, 1);
    group.bench_function("needleman_wunsch_512", |bench| {
        bench.iter(|| oxistr::needleman_wunsch(black_box(&a), black_box(&b), &unit, 1, &alloc))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_byte_search,
    bench_substring_search,
    bench_byteset_search,
    bench_compare,
    bench_checksum_and_hash,
    bench_similarity
);
criterion_main!(benches);
