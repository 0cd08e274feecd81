//! Benchmarks for Arabic shaping and bidi reordering
//!
//! Run with: `cargo bench --bench shaping`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ar_reshaper::ArabicReshaper;
use bilingual_reels::text::TextShaper;

/// A typical body line: words, a number, punctuation
const BODY_LINE: &str =
    "\u{0627}\u{0644}\u{0628}\u{064A}\u{062A}\u{0643}\u{0648}\u{064A}\u{0646} \u{064A}\u{0635}\u{0644} \u{0625}\u{0644}\u{0649} 70000 \u{062F}\u{0648}\u{0644}\u{0627}\u{0631}!";

fn bench_shape(c: &mut Criterion) {
    let shaper = TextShaper::new();
    let mut group = c.benchmark_group("shape");

    for lines in [1usize, 4, 16] {
        let text = vec![BODY_LINE; lines].join("\n");
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &text, |b, text| {
            b.iter(|| shaper.shape(black_box(text)))
        });
    }

    group.finish();
}

fn bench_reshape_only(c: &mut Criterion) {
    let reshaper = ArabicReshaper::default();
    c.bench_function("reshape", |b| b.iter(|| reshaper.reshape(black_box(BODY_LINE))));
}

criterion_group!(benches, bench_shape, bench_reshape_only);
criterion_main!(benches);
