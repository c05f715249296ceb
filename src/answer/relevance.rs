//! Token-overlap relevance used to order the context block.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::TARGET_BONUS;
use crate::retrieval::CandidateDocument;

static ALPHA_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]+").expect("token pattern is valid"));

/// Distinct lowercase alphabetic tokens of the query.
pub fn query_tokens(query: &str) -> HashSet<String> {
    let lowered = query.to_lowercase();
    ALPHA_TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercased `title ingredients steps`.
fn document_blob(doc: &CandidateDocument) -> String {
    format!("{} {} {}", doc.title, doc.ingredients, doc.steps).to_lowercase()
}

/// Query tokens found as substrings of the document, plus a bonus when the
/// (non-empty) target also appears.
pub fn score(doc: &CandidateDocument, tokens: &HashSet<String>, target: Option<&str>) -> usize {
    let blob = document_blob(doc);

    let overlap = tokens.iter().filter(|tok| blob.contains(tok.as_str())).count();
    let bonus = match target {
        Some(t) if !t.is_empty() && blob.contains(t) => TARGET_BONUS,
        _ => 0,
    };

    overlap + bonus
}

/// Stable descending sort by [`score`]; equal scores keep their incoming order.
pub fn rank(
    candidates: &[CandidateDocument],
    query: &str,
    target: Option<&str>,
) -> Vec<CandidateDocument> {
    let tokens = query_tokens(query);

    let mut scored: Vec<(usize, &CandidateDocument)> = candidates
        .iter()
        .map(|doc| (score(doc, &tokens, target), doc))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored.into_iter().map(|(_, doc)| doc.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str, ingredients: &str, steps: &str) -> CandidateDocument {
        CandidateDocument::new(id, title, ingredients, steps)
    }

    #[test]
    fn test_query_tokens_are_distinct_and_alphabetic() {
        let tokens = query_tokens("Banana bread, banana 2x BREAD!");
        let mut sorted: Vec<_> = tokens.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, vec!["banana", "bread", "x"]);
    }

    #[test]
    fn test_score_counts_substring_hits() {
        let d = doc("1", "Banana Bread", "bananas, flour", "Bake.");
        let tokens = query_tokens("banana bread muffins");
        assert_eq!(score(&d, &tokens, None), 2);
    }

    #[test]
    fn test_target_bonus() {
        let d = doc("1", "Pancakes", "milk, eggs, flour", "Whisk.");
        let tokens = query_tokens("pancakes");
        assert_eq!(score(&d, &tokens, Some("milk")), 1 + TARGET_BONUS);
        assert_eq!(score(&d, &tokens, Some("dragonfruit")), 1);
        assert_eq!(score(&d, &tokens, Some("")), 1);
    }

    #[test]
    fn test_rank_is_stable() {
        let docs = vec![
            doc("a", "Beef Stew", "beef", "simmer"),
            doc("b", "Banana Bread", "bananas", "bake"),
            doc("c", "Lamb Stew", "lamb", "simmer"),
            doc("d", "Banana Muffins", "bananas", "bake"),
        ];

        let ranked = rank(&docs, "banana bread", None);
        let ids: Vec<&str> = ranked.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }
}
