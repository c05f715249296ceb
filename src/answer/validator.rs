//! Acceptance checks on raw generations and the fallbacks that replace them.
//!
//! Each branch is a small state machine that ends in exactly one
//! [`AnswerOutcome`]; rendering appends the citation line.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{FALLBACK_STEPS_CHARS, MAX_BULLETS, MIN_ANSWER_CHARS, MIN_BULLETS};
use crate::retrieval::CandidateDocument;

use super::catalog::{self, CatalogEntry};

pub const CLARIFICATION_MESSAGE: &str = "I couldn’t identify which ingredient you want to replace. \
     Please specify (e.g., “substitute for milk in pancakes?”).";

pub const UNMAPPED_TARGET_MESSAGE: &str =
    "I need the ingredient to replace (e.g., egg, milk, butter). Please rephrase your question.";

pub const TOTAL_REFUSAL_MESSAGE: &str = "I couldn't find enough context to answer confidently.";

/// First-person and off-topic markers that disqualify a general answer.
const LEAKAGE_MARKERS: [&str; 7] = [" i ", "i'", "i’m", "i am", "my ", "when i", "pizza"];

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("pattern is valid"));

/// Terminal state of one answer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Substitution asked for, no target found. The generator is never called.
    Clarification,
    /// Model bullets accepted (at most four kept).
    SubstitutionAccepted { bullets: Vec<String> },
    /// Model bullets rejected, curated list used instead.
    CatalogFallback { entry: &'static CatalogEntry },
    /// Model bullets rejected and the ingredient is not in the catalog.
    SubstitutionRefused,
    /// Model answer accepted as is.
    GeneralAccepted { text: String },
    /// Model answer rejected, summary of the top-ranked record used instead.
    ExtractiveFallback { summary: String },
    /// Model answer rejected and nothing was retrieved.
    TotalRefusal,
}

impl AnswerOutcome {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerOutcome::Clarification => "clarification",
            AnswerOutcome::SubstitutionAccepted { .. } => "substitution_accepted",
            AnswerOutcome::CatalogFallback { .. } => "catalog_fallback",
            AnswerOutcome::SubstitutionRefused => "substitution_refused",
            AnswerOutcome::GeneralAccepted { .. } => "general_accepted",
            AnswerOutcome::ExtractiveFallback { .. } => "extractive_fallback",
            AnswerOutcome::TotalRefusal => "total_refusal",
        }
    }

    /// Whether the model's own text made it into the answer.
    pub fn is_generated(&self) -> bool {
        matches!(
            self,
            AnswerOutcome::SubstitutionAccepted { .. } | AnswerOutcome::GeneralAccepted { .. }
        )
    }

    /// Final answer text: body, blank line, citation line.
    pub fn render(&self, citation_line: &str) -> String {
        let body = match self {
            AnswerOutcome::Clarification => CLARIFICATION_MESSAGE.to_string(),
            AnswerOutcome::SubstitutionAccepted { bullets } => bullets.join("\n"),
            AnswerOutcome::CatalogFallback { entry } => entry.render(),
            AnswerOutcome::SubstitutionRefused => UNMAPPED_TARGET_MESSAGE.to_string(),
            AnswerOutcome::GeneralAccepted { text } => text.clone(),
            AnswerOutcome::ExtractiveFallback { summary } => summary.clone(),
            AnswerOutcome::TotalRefusal => TOTAL_REFUSAL_MESSAGE.to_string(),
        };
        format!("{body}\n\n{citation_line}")
    }
}

fn echoes_prompt(lowered: &str) -> bool {
    lowered.contains("question:") || lowered.contains("context:")
}

/// Trimmed non-empty lines that start with `-` or `•`.
pub fn extract_bullets(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.starts_with('-') || line.starts_with('•'))
        .map(str::to_string)
        .collect()
}

/// Substitution branch, entered only with a resolved target.
pub fn resolve_substitution(generated: &str, target: &str, query_lower: &str) -> AnswerOutcome {
    let bullets = extract_bullets(generated);
    let lowered = generated.to_lowercase();

    if bullets.len() >= MIN_BULLETS && !echoes_prompt(&lowered) {
        return AnswerOutcome::SubstitutionAccepted {
            bullets: bullets.into_iter().take(MAX_BULLETS).collect(),
        };
    }

    match catalog::lookup(Some(target), query_lower) {
        Some(entry) => AnswerOutcome::CatalogFallback { entry },
        None => AnswerOutcome::SubstitutionRefused,
    }
}

/// Reason a general answer was rejected, if any.
pub fn general_rejection(generated: &str) -> Option<&'static str> {
    let lowered = generated.to_lowercase();

    if LEAKAGE_MARKERS.iter().any(|m| lowered.contains(m)) {
        Some("off_topic")
    } else if generated.chars().count() < MIN_ANSWER_CHARS {
        Some("too_short")
    } else if echoes_prompt(&lowered) {
        Some("echo")
    } else {
        None
    }
}

/// General branch. `top_record` is the head of the lexical re-sort.
pub fn resolve_general(generated: &str, top_record: Option<&CandidateDocument>) -> AnswerOutcome {
    if general_rejection(generated).is_none() {
        return AnswerOutcome::GeneralAccepted {
            text: generated.to_string(),
        };
    }

    match top_record {
        Some(doc) => AnswerOutcome::ExtractiveFallback {
            summary: extractive_summary(doc),
        },
        None => AnswerOutcome::TotalRefusal,
    }
}

/// `<Title>: Ingredients include <ingredients>. Method (brief): <steps>.`
///
/// Steps are flattened to one line, runs of whitespace collapsed, clipped to
/// 280 characters, and trailing periods dropped before the closing one.
pub fn extractive_summary(doc: &CandidateDocument) -> String {
    let flattened = doc.steps.trim().replace('\n', " ");
    let collapsed = MULTI_SPACE.replace_all(&flattened, " ");
    let clipped: String = collapsed.chars().take(FALLBACK_STEPS_CHARS).collect();

    format!(
        "{}: Ingredients include {}. Method (brief): {}.",
        doc.title.trim(),
        doc.ingredients.trim(),
        clipped.trim_end_matches('.')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn banana_bread() -> CandidateDocument {
        CandidateDocument::new(
            "bb-1",
            "Banana Bread",
            "bananas, flour, sugar",
            "Mash bananas.\nFold in   flour.\n\nBake 60 min.",
        )
    }

    #[test]
    fn test_bullets_accepted_and_capped() {
        let raw = "- a — one.\n- b — two.\n\n• c — three.\n- d — four.\n- e — five.\nnot a bullet";
        let outcome = resolve_substitution(raw, "egg", "replace egg");

        let AnswerOutcome::SubstitutionAccepted { bullets } = &outcome else {
            panic!("expected accepted bullets, got {outcome:?}");
        };
        assert_eq!(bullets.len(), 4);
        assert_eq!(bullets[2], "• c — three.");
        assert!(outcome.is_generated());
    }

    #[test]
    fn test_single_bullet_falls_back_to_catalog() {
        let outcome = resolve_substitution("- applesauce", "milk", "replace milk");
        assert!(matches!(
            outcome,
            AnswerOutcome::CatalogFallback { entry } if entry.ingredient == "milk"
        ));
    }

    #[test]
    fn test_echoed_prompt_rejected() {
        let raw = "- one\n- two\nQuestion: replace butter";
        let outcome = resolve_substitution(raw, "butter", "replace butter");
        assert_eq!(outcome.kind(), "catalog_fallback");
    }

    #[test]
    fn test_unmapped_target_refused() {
        let outcome = resolve_substitution("", "dragonfruit", "substitute for dragonfruit in cake");
        assert_eq!(outcome, AnswerOutcome::SubstitutionRefused);
        assert_eq!(
            outcome.render("Sources: (none)"),
            "I need the ingredient to replace (e.g., egg, milk, butter). Please rephrase your question.\n\nSources: (none)"
        );
    }

    #[test]
    fn test_general_rejections() {
        assert_eq!(
            general_rejection("When I was a kid my grandmother baked this every week."),
            Some("off_topic")
        );
        assert_eq!(general_rejection("Bake it."), Some("too_short"));
        assert_eq!(
            general_rejection("Context: Banana Bread uses ripe bananas and flour."),
            Some("echo")
        );
        assert_eq!(general_rejection("Pizza dough needs a long, slow proof."), Some("off_topic"));
        assert_eq!(
            general_rejection("Banana Bread is baked for sixty minutes after mashing."),
            None
        );
    }

    #[test]
    fn test_first_person_apostrophes_rejected() {
        for text in [
            "I'm sure the banana bread turns out moist and tender.",
            "I’m sure the banana bread turns out moist and tender.",
            "Honestly I've baked banana bread like this many times.",
        ] {
            assert_eq!(general_rejection(text), Some("off_topic"), "text: {text}");
        }
        assert_eq!(LEAKAGE_MARKERS.len(), 7);
    }

    #[test]
    fn test_extractive_summary_format() {
        assert_eq!(
            extractive_summary(&banana_bread()),
            "Banana Bread: Ingredients include bananas, flour, sugar. Method (brief): Mash bananas. Fold in flour. Bake 60 min."
        );
    }

    #[test]
    fn test_extractive_summary_clips_steps() {
        let doc = CandidateDocument::new("x", "Long", "a", "word ".repeat(100));
        let summary = extractive_summary(&doc);
        let method = summary.split("Method (brief): ").nth(1).unwrap();

        assert!(method.chars().count() <= FALLBACK_STEPS_CHARS + 1);
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_general_fallback_chain() {
        let accepted = resolve_general(
            "Banana Bread is baked for sixty minutes after mashing.",
            Some(&banana_bread()),
        );
        assert!(matches!(accepted, AnswerOutcome::GeneralAccepted { .. }));

        let fallback = resolve_general("short", Some(&banana_bread()));
        assert_eq!(fallback.kind(), "extractive_fallback");

        let refusal = resolve_general("short", None);
        assert_eq!(refusal, AnswerOutcome::TotalRefusal);
        assert_eq!(
            refusal.render("Sources: (none)"),
            "I couldn't find enough context to answer confidently.\n\nSources: (none)"
        );
    }

    #[test]
    fn test_clarification_render() {
        let text = AnswerOutcome::Clarification.render("Sources: [A | 1]");
        assert!(text.starts_with("I couldn’t identify which ingredient"));
        assert!(text.contains("“substitute for milk in pancakes?”"));
        assert!(text.ends_with("\n\nSources: [A | 1]"));
    }
}
