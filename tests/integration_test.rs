// Integration tests for spinematch
use spinematch::{
    confusion_variants, normalize, parse_catalog, AdvancedMatcher, CatalogRecord, LegacyMatcher,
    MatchError, MatchOptions, MatchResult, MatchSource, MatchStrategy, MatchTier, Matcher,
    MatcherConfig,
};
use spinematch_engine::FitSummary;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

fn shelf() -> Vec<CatalogRecord> {
    vec![
        CatalogRecord::new("hunger", "The Hunger Games", ["Suzanne Collins"]),
        CatalogRecord::new("collins", "The Ballad of Songbirds and Snakes", ["Suzanne Collins"])
            .with_publisher("Scholastic Press"),
        CatalogRecord::new("wilde", "The Ballad of Reading Gaol", ["Oscar Wilde"]),
        CatalogRecord::new("hobbit", "The Hobbit", ["J. R. R. Tolkien"]),
        CatalogRecord::new("road", "The Road", ["Cormac McCarthy"]),
    ]
}

fn fitted(config: MatcherConfig) -> Matcher {
    let matcher = Matcher::new(config).unwrap();
    matcher.fit(&shelf()).unwrap();
    matcher
}

fn by_id(results: &[MatchResult]) -> HashMap<&str, &MatchResult> {
    results.iter().map(|r| (r.id.as_str(), r)).collect()
}

#[test]
fn test_noisy_spine_end_to_end() {
    let matcher = Matcher::new(MatcherConfig::default()).unwrap();
    matcher
        .fit(&[
            CatalogRecord::new("collins", "The Ballad of Songbirds and Snakes", ["Suzanne Collins"]),
            CatalogRecord::new("wilde", "The Ballad of Reading Gaol", ["Oscar Wilde"]),
        ])
        .unwrap();

    let results = matcher
        .match_query("THE BALLAD OF OLLINS SONGBIRDS AND SNAKES SCHOLASTIC PRESS")
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, "collins");
    assert!(results[0].confidence >= 0.75, "{}", results[0].confidence);
    assert!(results[0].confidence - results[1].confidence >= 0.15);
    assert!(results[0].is_match());
    assert_eq!(results[0].source, MatchSource::Advanced);
}

#[test]
fn test_exact_title_and_author() {
    let matcher = fitted(MatcherConfig::default());
    let results = matcher.match_query("The Hunger Games Suzanne Collins").unwrap();

    assert_eq!(results[0].id, "hunger");
    assert!(results[0].confidence >= 0.90);
    assert_eq!(results[0].tier, MatchTier::Exact);
}

#[test]
fn test_title_only_query() {
    let matcher = fitted(MatcherConfig::default());
    let results = matcher.match_query("THE HUNGER GAMES").unwrap();
    assert_eq!(results[0].id, "hunger");
    assert!(results[0].is_match());
}

#[test]
fn test_stopword_query_is_not_confident() {
    let matcher = fitted(MatcherConfig::default());
    let results = matcher.match_query("the").unwrap();

    assert!(!results.is_empty());
    for result in &results {
        assert!(matches!(result.tier, MatchTier::Poor | MatchTier::Weak), "{:?}", result);
        assert!(!result.is_match());
    }
}

#[test]
fn test_empty_catalog_and_empty_query() {
    let matcher = Matcher::new(MatcherConfig::default()).unwrap();
    let summary = matcher.fit(&[]).unwrap();
    assert_eq!(summary, FitSummary::default());
    assert!(matcher.match_query("the hobbit").unwrap().is_empty());

    let matcher = fitted(MatcherConfig::default());
    assert!(matcher.match_query("").unwrap().is_empty());
    assert!(matcher.match_query("  --  ").unwrap().is_empty());
}

#[test]
fn test_match_before_fit() {
    let matcher = Matcher::new(MatcherConfig::default()).unwrap();
    assert_eq!(matcher.match_query("the hobbit"), Err(MatchError::IndexNotFit));
}

#[test]
fn test_normalization_idempotent() {
    let samples = [
        "Les Misérables",
        "  THE  h0bbit!! ",
        "Harry Potter & the Philosopher’s Stone",
        "Self-Reliance — Essays",
        "",
    ];
    for sample in samples {
        let once = normalize(sample);
        let twice = normalize(once.as_str());
        assert_eq!(once, twice, "{:?}", sample);
    }
}

#[test]
fn test_variants_deterministic_and_capped() {
    let text = normalize("50NGB1RD5 AND 5NAKE5");
    for cap in [1, 4, 8] {
        let first = confusion_variants(&text, cap);
        let second = confusion_variants(&text, cap);
        assert_eq!(first, second);
        assert!(first.len() <= cap);
        assert_eq!(first[0], text);
    }
}

#[test]
fn test_disabling_char_ngrams_leaves_other_features() {
    let options = MatchOptions::new(50, 0.65);
    let query = "BALLAD SONGBIRDS SNAKES COLLINS";

    let with = AdvancedMatcher::new(MatcherConfig::default()).unwrap();
    with.fit(&shelf()).unwrap();
    let with = with.match_query(query, &options).unwrap();

    let without = AdvancedMatcher::new(MatcherConfig {
        use_character_ngrams: false,
        ..Default::default()
    })
    .unwrap();
    without.fit(&shelf()).unwrap();
    let without = without.match_query(query, &options).unwrap();

    assert_eq!(without.len(), shelf().len());
    let without = by_id(&without);
    for result in &with {
        let other = without[result.id.as_str()];
        assert_eq!(other.scores.char_ngram, 0.0);
        assert!((result.scores.token_set - other.scores.token_set).abs() < 1e-6);
        assert!((result.scores.soft_overlap - other.scores.soft_overlap).abs() < 1e-6);
        assert!((result.scores.author - other.scores.author).abs() < 1e-6);
        assert!((result.scores.distinctive - other.scores.distinctive).abs() < 1e-6);
    }
}

#[test]
fn test_top_k_prefix_consistent() {
    let matcher = fitted(MatcherConfig::default());
    let query = "THE BALLAD 0F SNAKES";
    let one = matcher.match_with(query, &MatchOptions::new(1, 0.65)).unwrap();
    let ten = matcher.match_with(query, &MatchOptions::new(10, 0.65)).unwrap();

    assert_eq!(one.len(), 1);
    assert_eq!(one[0], ten[0]);
}

#[test]
fn test_scores_within_bounds() {
    let matcher = fitted(MatcherConfig::default());
    let queries = ["THE H0BBIT", "ROAD McCARTHY", "GAOL", "x", "SUZANNE COLLINS"];
    for query in queries {
        for result in matcher.match_query(query).unwrap() {
            assert!((0.0..=1.0).contains(&result.confidence));
            assert!(result.scores.as_array().iter().all(|s| (0.0..=1.0).contains(s)));
            assert_eq!(result.tier, MatchTier::from_confidence(result.confidence));
        }
    }
}

#[test]
fn test_threshold_flags_but_keeps_results() {
    let matcher = fitted(MatcherConfig::default());
    let results = matcher
        .match_with("THE HOBBIT", &MatchOptions::new(10, 0.99))
        .unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().skip(1).all(|r| r.below_threshold));
}

struct BrokenMatcher;

impl MatchStrategy for BrokenMatcher {
    fn source(&self) -> MatchSource {
        MatchSource::Advanced
    }

    fn fit(&self, _catalog: &[CatalogRecord]) -> spinematch_engine::Result<FitSummary> {
        Ok(FitSummary::default())
    }

    fn match_query(
        &self,
        _query: &str,
        _options: &MatchOptions,
    ) -> spinematch_engine::Result<Vec<MatchResult>> {
        Err(MatchError::EngineFailure("index corrupted".into()))
    }
}

#[test]
fn test_legacy_fallback() {
    let matcher = Matcher::with_strategies(
        MatcherConfig::default(),
        Arc::new(BrokenMatcher),
        Some(Arc::new(LegacyMatcher::new())),
    )
    .unwrap();
    matcher.fit(&shelf()).unwrap();

    let results = matcher.match_query("the road").unwrap();
    assert_eq!(results[0].id, "road");
    assert_eq!(results[0].confidence, 1.0);
    assert!(results.iter().all(|r| r.source == MatchSource::Legacy));
}

#[test]
fn test_concurrent_fit_and_match() {
    let left: Vec<CatalogRecord> = (0..20)
        .map(|i| CatalogRecord::new(format!("left-{i}"), format!("Winter Tales {i}"), ["Ann Lee"]))
        .collect();
    let right: Vec<CatalogRecord> = (0..20)
        .map(|i| CatalogRecord::new(format!("right-{i}"), format!("Winter Songs {i}"), ["Bo Ray"]))
        .collect();

    let matcher = Arc::new(Matcher::new(MatcherConfig::default()).unwrap());
    matcher.fit(&left).unwrap();

    std::thread::scope(|scope| {
        let writer = Arc::clone(&matcher);
        scope.spawn(move || {
            for round in 0..20 {
                let catalog = if round % 2 == 0 { &right } else { &left };
                writer.fit(catalog).unwrap();
            }
        });

        for _ in 0..4 {
            let reader = Arc::clone(&matcher);
            scope.spawn(move || {
                for _ in 0..50 {
                    let results = reader.match_query("WINTER").unwrap();
                    assert!(!results.is_empty());
                    let prefix = if results[0].id.starts_with("left") { "left" } else { "right" };
                    assert!(results.iter().all(|r| r.id.starts_with(prefix)));
                }
            });
        }
    });
}

#[test]
fn test_catalog_file_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"numFound": 2, "docs": [
            {{"key": "/works/OL1W", "title": "The Road", "author_name": ["Cormac McCarthy"], "publisher": ["Knopf", "Vintage"]}},
            {{"key": "/works/OL2W", "title": "The Hobbit", "author_name": "J. R. R. Tolkien"}}
        ]}}"#
    )
    .unwrap();

    let raw = std::fs::read_to_string(file.path()).unwrap();
    let catalog = parse_catalog(&raw).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].publisher.as_deref(), Some("Knopf"));

    let matcher = Matcher::new(MatcherConfig::default()).unwrap();
    matcher.fit(&catalog).unwrap();
    let report = matcher
        .match_report("THE H0BBIT TOLKIEN", &MatchOptions::default())
        .unwrap();
    assert_eq!(report.confident_match().map(|r| r.id.as_str()), Some("/works/OL2W"));
}
