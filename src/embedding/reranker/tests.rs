use super::*;

#[test]
fn test_stub_loads_without_model() {
    let reranker = Reranker::stub().expect("stub should load");
    assert!(!reranker.is_model_loaded());
    assert!(reranker.config().model_path.is_none());
}

#[test]
fn test_empty_model_path_rejected() {
    let err = Reranker::load(RerankerConfig::new("")).unwrap_err();
    assert!(matches!(err, RerankerError::InvalidConfig { .. }));
}

#[test]
fn test_missing_model_dir() {
    let err = Reranker::load(RerankerConfig::new("/no/such/cross-encoder")).unwrap_err();
    assert!(matches!(err, RerankerError::ModelLoadFailed { .. }));
}

#[test]
fn test_incomplete_model_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), "{}").unwrap();

    let err = Reranker::load(RerankerConfig::new(dir.path())).unwrap_err();
    assert!(err.to_string().contains("model.safetensors"));
}

#[test]
fn test_stub_score_prefers_overlap() {
    let reranker = Reranker::stub().unwrap();

    let relevant = reranker
        .score(
            "banana bread recipe",
            "Banana Bread\nbananas, flour\nMash the bananas",
        )
        .unwrap();
    let unrelated = reranker
        .score("banana bread recipe", "Beef Stew\nbeef, carrots\nSimmer")
        .unwrap();

    assert!(relevant > unrelated);
    assert!((0.0..=1.0).contains(&relevant));
}

#[test]
fn test_stub_score_empty_query() {
    let reranker = Reranker::stub().unwrap();
    assert_eq!(reranker.score("", "anything").unwrap(), 0.0);
}

#[test]
fn test_rerank_sorts_descending() {
    let reranker = Reranker::stub().unwrap();
    let candidates = [
        "Beef Stew\nbeef\nsimmer",
        "Chocolate Brownies\ncocoa, eggs\nbake brownies",
        "Brownie Cookies\nbrownie mix\nbake",
    ];

    let ranked = reranker.rerank("chocolate brownies", &candidates).unwrap();

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].0, 1);
    assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
}

#[test]
fn test_rerank_ties_keep_incoming_order() {
    let reranker = Reranker::stub().unwrap();
    let candidates = ["nothing here", "still nothing", "nope"];

    let ranked = reranker.rerank("lasagna", &candidates).unwrap();
    let order: Vec<usize> = ranked.iter().map(|(idx, _)| *idx).collect();

    assert_eq!(order, vec![0, 1, 2]);
}

#[test]
fn test_rerank_empty_candidates() {
    let reranker = Reranker::stub().unwrap();
    assert!(reranker.rerank("query", &[]).unwrap().is_empty());
}
