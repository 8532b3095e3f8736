// Performance benchmarks for fitting and matching
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::rngs::StdRng;
use spinematch::{CatalogRecord, MatchOptions, Matcher, MatcherConfig};

const WORDS: &[&str] = &[
    "winter", "garden", "shadow", "river", "night", "stone", "house", "silent", "golden", "empire",
    "glass", "letters", "ocean", "forest", "city", "secret", "summer", "crown", "fire", "memory",
];

const NAMES: &[&str] = &[
    "Collins", "Tolkien", "Wilde", "McCarthy", "Austen", "Morrison", "Ishiguro", "Atwood",
];

fn random_title(rng: &mut StdRng) -> String {
    let len = rng.random_range(2..6);
    let mut words = vec!["the"];
    words.extend((0..len).map(|_| WORDS[rng.random_range(0..WORDS.len())]));
    words.join(" ")
}

fn generate_catalog(size: usize) -> Vec<CatalogRecord> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..size)
        .map(|i| {
            let author = NAMES[rng.random_range(0..NAMES.len())];
            CatalogRecord::new(format!("book-{}", i), random_title(&mut rng), [author])
        })
        .collect()
}

/// Uppercase with a few OCR confusions and a dropped leading letter
fn ocr_noise(title: &str) -> String {
    let noisy: String = title
        .to_uppercase()
        .chars()
        .map(|c| match c {
            'O' => '0',
            'S' => '5',
            c => c,
        })
        .collect();
    noisy.get(1..).unwrap_or_default().to_string()
}

fn fitted(size: usize) -> (Matcher, Vec<CatalogRecord>) {
    let catalog = generate_catalog(size);
    let matcher = Matcher::new(MatcherConfig::default()).unwrap();
    matcher.fit(&catalog).unwrap();
    (matcher, catalog)
}

fn benchmark_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");

    for size in [100, 1000, 10000].iter() {
        let catalog = generate_catalog(*size);
        group.bench_with_input(BenchmarkId::new("advanced", size), size, |b, _| {
            let matcher = Matcher::new(MatcherConfig::default()).unwrap();
            b.iter(|| matcher.fit(black_box(&catalog)).unwrap());
        });
    }

    group.finish();
}

fn benchmark_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match");

    for size in [100, 1000, 10000].iter() {
        let (matcher, catalog) = fitted(*size);
        let query = ocr_noise(&catalog[size / 2].title);
        group.bench_with_input(BenchmarkId::new("noisy", size), size, |b, _| {
            b.iter(|| matcher.match_query(black_box(&query)).unwrap());
        });
    }

    let (matcher, _) = fitted(1000);
    let config = MatcherConfig {
        use_character_ngrams: false,
        ..Default::default()
    };
    let no_ngrams = Matcher::new(config).unwrap();
    no_ngrams.fit(&generate_catalog(1000)).unwrap();
    group.bench_function("with_ngrams_1000", |b| {
        b.iter(|| matcher.match_query(black_box("GARDEN 0F SHAD0WS AUSTEN")).unwrap());
    });
    group.bench_function("without_ngrams_1000", |b| {
        b.iter(|| no_ngrams.match_query(black_box("GARDEN 0F SHAD0WS AUSTEN")).unwrap());
    });

    group.finish();
}

fn benchmark_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");
    let (matcher, catalog) = fitted(5000);
    let queries: Vec<String> = catalog.iter().step_by(50).map(|r| ocr_noise(&r.title)).collect();

    group.bench_function("100_queries_5000", |b| {
        b.iter(|| matcher.match_batch(black_box(queries.as_slice()), &MatchOptions::default()));
    });

    group.finish();
}

criterion_group!(benches, benchmark_fit, benchmark_match, benchmark_batch);
criterion_main!(benches);
