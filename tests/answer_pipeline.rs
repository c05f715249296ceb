//! End-to-end answer synthesis over the in-memory index and a scripted generator.

mod common;

use std::time::Duration;

use bakechat::answer::AnswerEngine;
use bakechat::answer::validator::{
    CLARIFICATION_MESSAGE, TOTAL_REFUSAL_MESSAGE, UNMAPPED_TARGET_MESSAGE,
};
use bakechat::embedding::RerankerConfig;
use bakechat::generation::{GenerationAdapter, MockGenerator};
use bakechat::retrieval::{CandidateDocument, RetrievalGateway};
use bakechat::vectordb::MockVectorDbClient;
use bakechat::{AnswerError, AnswerOutcome};

use common::{COLLECTION, banana_bread, brownies, encoder, engine_with, kitchen, offline_engine, seeded_index};

const EGG_FALLBACK: &str = "- 1/4 cup applesauce — adds moisture + binding.\n\
     - 1/2 mashed ripe banana — binds; slight banana taste.\n\
     - 3 tbsp aquafaba — whipped chickpea brine binds/aerates.\n\
     - 1 tbsp ground flax + 3 tbsp water — forms a gel (\"flax egg\").";

const ALL_SOURCES: &str =
    "Sources: [Chocolate Brownies | c1], [Banana Bread | b1], [Beef Stew | s1]";

#[tokio::test]
async fn test_egg_free_brownies_falls_back_to_catalog() {
    let engine = offline_engine(MockGenerator::replying("Use whatever the pantry has."));

    let synthesis = engine
        .synthesize("Egg-free substitute for brownies?", &kitchen())
        .await
        .unwrap();

    assert_eq!(synthesis.answer, format!("{EGG_FALLBACK}\n\n{ALL_SOURCES}"));
    assert_eq!(synthesis.outcome.kind(), "catalog_fallback");
    assert!(!synthesis.outcome.is_generated());

    let prompt = engine.generation().generator().last_prompt().unwrap();
    assert!(prompt.ends_with("Answer (bullets only):"));
    assert!(prompt.contains("Question: Egg-free substitute for brownies?"));
    assert!(prompt.contains("Context:\n[Chocolate Brownies | c1]\nIngredients: cocoa, butter, sugar, eggs"));
}

#[tokio::test]
async fn test_unmapped_ingredient_is_refused() {
    let engine = offline_engine(MockGenerator::new());

    let synthesis = engine
        .synthesize("substitute for dragonfruit in cake", &kitchen())
        .await
        .unwrap();

    assert_eq!(synthesis.outcome, AnswerOutcome::SubstitutionRefused);
    assert!(synthesis.answer.starts_with(UNMAPPED_TARGET_MESSAGE));
    assert!(synthesis.answer.contains("\n\nSources: "));
    assert_eq!(engine.generation().generator().calls(), 1);
}

#[tokio::test]
async fn test_unmapped_refusal_across_phrasings() {
    let queries = [
        "Can I replace saffron in paella?",
        "What is an alternative to tahini",
        "I have an allergy to sesame",
        "swap the quinoa for something",
    ];

    for query in queries {
        let engine = offline_engine(MockGenerator::replying("Just leave it out."));
        let synthesis = engine.synthesize(query, &kitchen()).await.unwrap();
        assert_eq!(
            synthesis.outcome,
            AnswerOutcome::SubstitutionRefused,
            "query: {query}"
        );
    }
}

#[tokio::test]
async fn test_general_question_uses_extractive_fallback() {
    let engine = offline_engine(MockGenerator::replying("I love baking this with my grandmother."));

    let synthesis = engine
        .synthesize("How do I make banana bread?", &kitchen())
        .await
        .unwrap();

    assert_eq!(
        synthesis.answer,
        "Banana Bread: Ingredients include ripe bananas, flour, sugar, eggs. \
         Method (brief): Mash the bananas. Mix with flour and sugar. Bake for 60 minutes.\n\n\
         Sources: [Banana Bread | b1], [Beef Stew | s1], [Chocolate Brownies | c1]"
    );
    assert_eq!(synthesis.outcome.kind(), "extractive_fallback");

    let prompt = engine.generation().generator().last_prompt().unwrap();
    assert!(prompt.ends_with("\n\nAnswer:"));
    assert!(prompt.contains("Keep the answer under 120 words."));
}

#[tokio::test]
async fn test_missing_target_asks_for_clarification() {
    let engine = offline_engine(MockGenerator::replying("- never used"));

    let synthesis = engine
        .synthesize("What can I substitute?", &kitchen())
        .await
        .unwrap();

    assert_eq!(synthesis.outcome, AnswerOutcome::Clarification);
    assert!(synthesis.answer.starts_with(CLARIFICATION_MESSAGE));
    assert_eq!(engine.generation().generator().calls(), 0);
}

#[tokio::test]
async fn test_accepted_substitution_keeps_four_bullets() {
    let reply = "Here are options:\n\
                 - Equal oil keeps the crumb moist [Chocolate Brownies | c1]\n\
                 • Margarine works one to one\n\
                 - Coconut oil adds a light coconut note\n\
                 - Applesauce lowers the fat\n\
                 - Yogurt adds tang";
    let engine = offline_engine(MockGenerator::replying(reply));

    let synthesis = engine
        .synthesize("Can I replace butter in brownies?", &kitchen())
        .await
        .unwrap();

    let AnswerOutcome::SubstitutionAccepted { bullets } = &synthesis.outcome else {
        panic!("expected accepted bullets, got {:?}", synthesis.outcome);
    };
    assert_eq!(bullets.len(), 4);
    assert_eq!(bullets[1], "- Margarine works one to one");
    assert!(synthesis.answer.starts_with("- Equal oil keeps the crumb moist"));
    assert!(!synthesis.answer.contains("Yogurt"));
}

#[tokio::test]
async fn test_accepted_general_answer_is_verbatim() {
    let reply = "Banana Bread [Banana Bread | b1] is baked for 60 minutes after mashing the bananas.";
    let engine = offline_engine(MockGenerator::replying(reply));

    let synthesis = engine
        .synthesize("How long does banana bread bake?", &kitchen())
        .await
        .unwrap();

    assert_eq!(synthesis.outcome.kind(), "general_accepted");
    assert!(synthesis.answer.starts_with(reply));
}

#[tokio::test]
async fn test_no_candidates_is_a_total_refusal() {
    let engine = offline_engine(MockGenerator::new());

    let synthesis = engine.synthesize("How do I make scones?", &[]).await.unwrap();

    assert_eq!(
        synthesis.answer,
        format!("{TOTAL_REFUSAL_MESSAGE}\n\nSources: (none)")
    );
}

#[tokio::test]
async fn test_citations_cover_three_rendered_records() {
    let mut candidates = kitchen();
    candidates.push(CandidateDocument::new("p1", "Pancakes", "flour, milk", "Whisk. Fry."));
    candidates.push(CandidateDocument::new("m1", "Muffins", "flour, sugar", "Mix. Bake."));
    let engine = offline_engine(MockGenerator::new());

    let synthesis = engine
        .synthesize("How do I make banana bread?", &candidates)
        .await
        .unwrap();

    let line = synthesis.answer.lines().last().unwrap();
    assert_eq!(line.matches('[').count(), 3);
    assert!(line.starts_with("Sources: [Banana Bread | b1]"));
}

#[tokio::test]
async fn test_synthesis_is_deterministic() {
    let engine = offline_engine(MockGenerator::replying("Too short."));
    let candidates = kitchen();

    let first = engine.synthesize("Milk alternative for pancakes", &candidates).await.unwrap();
    let second = engine.synthesize("Milk alternative for pancakes", &candidates).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_answer_retrieves_and_caps_sources() {
    let encoder = encoder();
    let mut docs = kitchen();
    for i in 0..4 {
        docs.push(CandidateDocument::new(
            format!("x{i}"),
            format!("Sugar Cookies {i}"),
            "flour, sugar, butter",
            "Cream butter and sugar. Bake for 12 minutes.",
        ));
    }
    let index = seeded_index(&encoder, &docs);
    let engine = engine_with(index, MockGenerator::replying("Nope."));

    let response = engine.answer("  How do I make banana bread?  ", 20, false).await.unwrap();

    assert_eq!(response.sources.len(), 5);
    for source in &response.sources {
        assert!(docs.iter().any(|d| d.id == source.id && d.ingredients == source.ingredients));
    }
    assert!(response.answer.contains("\n\nSources: ["));

    let prompt = engine.generation().generator().last_prompt().unwrap();
    assert!(prompt.contains("Question: How do I make banana bread?\n"));
}

#[tokio::test]
async fn test_answer_with_reranker_enabled() {
    let encoder = encoder();
    let index = seeded_index(&encoder, &[banana_bread(), brownies()]);
    let engine = engine_with(index, MockGenerator::new());

    let response = engine.answer("banana bread", 5, true).await.unwrap();

    assert_eq!(response.sources.len(), 2);
    assert_eq!(response.sources[0].id, "b1");
    assert!(engine.gateway().reranker_loaded());
}

#[tokio::test]
async fn test_unavailable_index_is_a_retrieval_error() {
    let encoder = encoder();
    let index = seeded_index(&encoder, &kitchen());
    index.set_unavailable(true);
    let engine = engine_with(index, MockGenerator::new());

    let err = engine.answer("banana bread", 5, false).await.unwrap_err();

    assert!(matches!(err, AnswerError::Retrieval(_)));
    assert_eq!(engine.generation().generator().calls(), 0);
}

#[tokio::test]
async fn test_missing_collection_is_a_retrieval_error() {
    let engine = engine_with(MockVectorDbClient::new(), MockGenerator::new());

    assert!(engine.gateway().ensure_ready().await.is_err());
    let err = engine.answer("banana bread", 5, false).await.unwrap_err();
    assert!(matches!(err, AnswerError::Retrieval(_)));
}

#[tokio::test]
async fn test_generator_failure_is_a_generation_error() {
    let engine = offline_engine(MockGenerator::new().then_fail("model crashed"));

    let err = engine
        .synthesize("How do I make banana bread?", &kitchen())
        .await
        .unwrap_err();

    assert!(matches!(err, AnswerError::Generation(_)));
}

#[tokio::test]
async fn test_slow_generator_falls_back_after_timeout() {
    let encoder = encoder();
    let index = MockVectorDbClient::new();
    index.create_collection(COLLECTION, common::DIM);
    let gateway = RetrievalGateway::new(encoder, index, COLLECTION, RerankerConfig::stub());
    let generator = MockGenerator::replying(
        "Banana Bread is baked for about an hour once the batter is mixed.",
    )
    .with_delay(Duration::from_millis(500));
    let engine = AnswerEngine::new(
        gateway,
        GenerationAdapter::new(generator).with_timeout(Duration::from_millis(20)),
    );

    let synthesis = engine
        .synthesize("How do I make banana bread?", &kitchen())
        .await
        .unwrap();

    assert_eq!(synthesis.outcome.kind(), "extractive_fallback");
    assert!(synthesis.answer.starts_with("Banana Bread: Ingredients include"));
}
