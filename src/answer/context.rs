//! Context selection: lexical re-sort, render the top records, build citations.

use crate::constants::{CONTEXT_STEPS_CHARS, MAX_CONTEXT_DOCS};
use crate::retrieval::CandidateDocument;

use super::relevance;

/// Output of [`select`], owned by one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSelection {
    /// Rendered blocks joined by a blank line. Empty when there were no candidates.
    pub context: String,
    /// `[Title | ID]` for each rendered block, in the same order.
    pub citations: Vec<String>,
    /// Every candidate after the lexical re-sort.
    pub ranked: Vec<CandidateDocument>,
}

impl ContextSelection {
    /// `Sources: [A | 1], [B | 2]` or `Sources: (none)`.
    pub fn citation_line(&self) -> String {
        if self.citations.is_empty() {
            "Sources: (none)".to_string()
        } else {
            format!("Sources: {}", self.citations.join(", "))
        }
    }

    /// Top of the lexical re-sort, used by the extractive fallback.
    pub fn top_record(&self) -> Option<&CandidateDocument> {
        self.ranked.first()
    }
}

pub fn select(
    query: &str,
    candidates: &[CandidateDocument],
    target: Option<&str>,
) -> ContextSelection {
    let ranked = relevance::rank(candidates, query, target);

    let (blocks, citations): (Vec<String>, Vec<String>) = ranked
        .iter()
        .take(MAX_CONTEXT_DOCS)
        .map(|doc| (render_block(doc), citation_tag(doc)))
        .unzip();

    ContextSelection {
        context: blocks.join("\n\n"),
        citations,
        ranked,
    }
}

fn citation_tag(doc: &CandidateDocument) -> String {
    format!("[{} | {}]", doc.title.trim(), doc.id.trim())
}

fn render_block(doc: &CandidateDocument) -> String {
    let steps: String = doc.steps.trim().chars().take(CONTEXT_STEPS_CHARS).collect();
    format!(
        "{}\nIngredients: {}\nSteps: {}",
        citation_tag(doc),
        doc.ingredients.trim(),
        steps
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str) -> CandidateDocument {
        CandidateDocument::new(id, title, "flour, sugar", "Mix. Bake.")
    }

    #[test]
    fn test_empty_candidates() {
        let selection = select("anything", &[], None);
        assert!(selection.context.is_empty());
        assert!(selection.citations.is_empty());
        assert!(selection.top_record().is_none());
        assert_eq!(selection.citation_line(), "Sources: (none)");
    }

    #[test]
    fn test_renders_at_most_three_blocks() {
        let docs: Vec<_> = (1..=5).map(|i| doc(&i.to_string(), &format!("Cake {i}"))).collect();
        let selection = select("cake", &docs, None);

        assert_eq!(selection.citations.len(), 3);
        assert_eq!(selection.ranked.len(), 5);
        assert_eq!(selection.context.split("\n\n").count(), 3);
        assert_eq!(
            selection.citation_line(),
            "Sources: [Cake 1 | 1], [Cake 2 | 2], [Cake 3 | 3]"
        );
    }

    #[test]
    fn test_block_layout_and_truncation() {
        let long_steps = "x".repeat(400);
        let d = CandidateDocument::new(" 42 ", " Crêpes ", " milk, eggs ", format!("  {long_steps}"));
        let selection = select("crepes", &[d], None);

        let expected = format!("[Crêpes | 42]\nIngredients: milk, eggs\nSteps: {}", "x".repeat(300));
        assert_eq!(selection.context, expected);
    }

    #[test]
    fn test_lexical_order_overrides_retrieval_order() {
        let docs = vec![
            doc("1", "Beef Stew"),
            doc("2", "Chocolate Brownies"),
            doc("3", "Fudgy Brownies"),
        ];
        let selection = select("brownies", &docs, None);

        assert_eq!(selection.citations[0], "[Chocolate Brownies | 2]");
        assert_eq!(selection.citations[1], "[Fudgy Brownies | 3]");
        assert_eq!(selection.citations[2], "[Beef Stew | 1]");
        assert_eq!(selection.top_record().map(|d| d.id.as_str()), Some("2"));
    }
}
