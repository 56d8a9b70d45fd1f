use std::sync::Arc;

use tempfile::TempDir;
use versedex_common::error::ErrorKind;
use versedex_ranges::ReferenceSet;
use versedex_text_index::{
    BackendRegistry, BoundaryId, CancelFlag, Corpus, IndexConfig, MemoryCorpus, NoProgress,
    Query, QueryEngine, RestrictionType, corpus::restriction_for,
};

/// Two chapters of three units each.
fn chapters() -> MemoryCorpus {
    MemoryCorpus::with_boundaries([
        (BoundaryId(0), "I love the law"),
        (BoundaryId(0), "a time of peace"),
        (BoundaryId(0), "they hate the light"),
        (BoundaryId(1), "hate not thy brother"),
        (BoundaryId(1), "love thy neighbour"),
        (BoundaryId(1), "the law of love"),
    ])
}

fn engine(temp_dir: &TempDir, corpus: MemoryCorpus, restriction: RestrictionType) -> QueryEngine {
    let config =
        IndexConfig::new(temp_dir.path().join("idx")).with_restriction(restriction);
    engine_with(&config, corpus)
}

fn engine_with(config: &IndexConfig, corpus: MemoryCorpus) -> QueryEngine {
    let backend = BackendRegistry::with_defaults()
        .for_config(config)
        .expect("Failed to resolve backend");
    let blur_restriction = restriction_for(config.blur_restriction, &corpus);
    let corpus: Arc<dyn Corpus> = Arc::new(corpus);
    backend
        .create_builder(config, corpus)
        .expect("Failed to create builder")
        .build(&NoProgress, &CancelFlag::new())
        .expect("Build failed");
    QueryEngine::new(
        backend
            .open_searcher(config, blur_restriction)
            .expect("Failed to open searcher"),
    )
}

fn search(engine: &QueryEngine, text: &str) -> String {
    engine.search(text, None).unwrap().to_string()
}

#[test]
fn test_boolean_queries() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let engine = engine(&temp_dir, chapters(), RestrictionType::Boundary);

    assert_eq!(search(&engine, "love"), "1, 5-6");
    assert_eq!(search(&engine, "love | hate"), "1, 3-6");
    assert_eq!(search(&engine, "love hate"), "1, 3-6");
    assert_eq!(search(&engine, "love & law"), "1, 6");
    assert_eq!(search(&engine, "love + law"), "1, 6");
    assert_eq!(search(&engine, "love - law"), "5");
    assert_eq!(search(&engine, "love ! law"), "5");
    assert_eq!(search(&engine, "(love | hate) & thy"), "4-5");
    assert_eq!(search(&engine, "la*"), "1, 6");
    assert_eq!(search(&engine, "LOVE & Thy"), "5");
    assert_eq!(search(&engine, "sword"), "");
    assert_eq!(search(&engine, "sword & love"), "");
}

#[test]
fn test_comma_slash_and_grammar_queries() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let engine = engine(&temp_dir, chapters(), RestrictionType::Boundary);

    assert_eq!(search(&engine, "love, law"), "1, 6");
    assert_eq!(search(&engine, "love/hate"), "1, 3-6");
    assert_eq!(search(&engine, "hate ~1 , love"), search(&engine, "hate ~1 love"));
    assert_eq!(search(&engine, "hate ~1 , love"), "4");

    // "laws" is not indexed but its root "law" is.
    assert_eq!(search(&engine, "laws"), "");
    assert_eq!(search(&engine, "grammar laws"), "1, 6");
    assert_eq!(search(&engine, "gr laws - love"), "");
    assert_eq!(search(&engine, "gr LAW, peace"), "");
    assert_eq!(search(&engine, "gr brothers"), "4");
}

#[test]
fn test_blur_stays_within_boundaries() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let engine = engine(&temp_dir, chapters(), RestrictionType::Boundary);

    // love = {1, 5, 6}, hate = {3, 4}
    assert_eq!(search(&engine, "hate ~1 love"), "4");
    assert_eq!(search(&engine, "hate ~2 love"), "3-4");
    assert_eq!(search(&engine, "peace ~1 love"), "2");
    assert_eq!(search(&engine, "peace ~0 love"), "");

    // Unit 1 is three units before unit 4, but in another chapter.
    assert_eq!(search(&engine, "love ~3 brother"), "5-6");
    // A run of hits spanning both chapters spreads into both.
    assert_eq!(search(&engine, "love ~3 hate"), "1, 5-6");

    let parsed = Query::parse("hate ~2 love").unwrap();
    let built = Query::blur(
        Query::base("hate").unwrap(),
        Query::base("love").unwrap(),
        2,
    );
    assert_eq!(parsed, built);
    assert_eq!(engine.evaluate(&built).unwrap(), engine.search("hate ~2 love", None).unwrap());

    let searcher = engine.searcher();
    let expected = searcher
        .find("hate")
        .unwrap()
        .intersection(&searcher.find("love").unwrap().blur(2, searcher.restriction()));
    assert_eq!(engine.evaluate(&built).unwrap(), expected);
}

#[test]
fn test_blur_without_restriction() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let engine = engine(&temp_dir, chapters(), RestrictionType::None);

    assert_eq!(search(&engine, "love ~3 brother"), "1, 5-6");
    assert_eq!(search(&engine, "hate ~1 love"), "4");
    assert_eq!(search(&engine, "love ~100 peace"), "1, 5-6");
}

#[test]
fn test_search_within_restriction() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let engine = engine(&temp_dir, chapters(), RestrictionType::Boundary);

    let first_chapter = ReferenceSet::from_ranges([1..4]);
    assert_eq!(
        engine.search("love | hate", Some(&first_chapter)).unwrap().to_string(),
        "1, 3"
    );
    assert!(
        engine
            .search("brother", Some(&first_chapter))
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_syntax_error_names_the_query() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let engine = engine(&temp_dir, chapters(), RestrictionType::Boundary);

    let err = engine.search("love & (hate", None).unwrap_err();
    match err.kind() {
        ErrorKind::Query { query, .. } => assert_eq!(query, "love & (hate"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_best_match_ranking() {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let corpus = MemoryCorpus::from_units([
        "God so loved the world",
        "love your neighbour",
        "the world is mine",
        "God is love",
    ]);
    let engine = engine(&temp_dir, corpus, RestrictionType::Boundary);

    // "the" and "of" are ignored, "lovely" reduces to "love", "worlds" to
    // "world".
    let tally = engine.best_match("the lovely God of worlds", None).unwrap();
    assert_eq!(tally.ranked(10), vec![(1, 3), (4, 2), (2, 1), (3, 1)]);
    assert_eq!(tally.ranked(2), vec![(1, 3), (4, 2)]);

    let restriction = ReferenceSet::from_ranges([2..5]);
    let tally = engine
        .best_match("the lovely God of worlds", Some(&restriction))
        .unwrap();
    assert_eq!(tally.ranked(10), vec![(4, 2), (2, 1), (3, 1)]);

    assert!(engine.best_match("the of and", None).unwrap().is_empty());
    assert!(engine.best_match("swords", None).unwrap().is_empty());
}

#[test]
fn test_best_match_uses_configured_analyzer() {
    let corpus = || MemoryCorpus::from_units(["God-fearing men", "the god of gods"]);

    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let mut config = IndexConfig::new(temp_dir.path().join("idx"));
    config.tokenizer = "unicode-word".to_string();
    config.collation = "unicode-case-preserving".to_string();
    let engine = engine_with(&config, corpus());
    assert_eq!(engine.best_match("God", None).unwrap().ranked(10), vec![(1, 1)]);
    assert_eq!(engine.best_match("fearing", None).unwrap().ranked(10), vec![(1, 1)]);
    assert_eq!(engine.best_match("gods", None).unwrap().ranked(10), vec![(2, 1)]);

    // Small words and roots are English rules.
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let mut config = IndexConfig::new(temp_dir.path().join("idx"));
    config.locale = "de".to_string();
    let engine = engine_with(&config, corpus());
    assert_eq!(engine.best_match("the", None).unwrap().ranked(10), vec![(2, 1)]);
    assert!(engine.best_match("mens", None).unwrap().is_empty());
}
