//! Prompt assembly for the two intent branches.

use super::intent::Intent;

pub const BASE_INSTRUCTION: &str = "You are a grounded recipe assistant. Use ONLY the Context. \
     Cite sources as [Title | ID]. Write in third person. Avoid anecdotes.";

const SUBSTITUTION_INSTRUCTION: &str = " Return 2–4 bullet points with safe substitutions for the \
     requested ingredient, each with a short reason and quantities if possible.";

const SUBSTITUTION_EXAMPLE: &str = "Example:\n\
     - 1/4 cup applesauce — adds moisture + binding.\n\
     - 1 tbsp ground flax + 3 tbsp water — forms a gel (\"flax egg\").\n";

const GENERAL_INSTRUCTION: &str =
    " Keep the answer under 120 words. If steps exist, summarize them briefly.";

/// What the pipeline should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPlan {
    /// Substitution asked for without a target; no prompt is built.
    NeedsClarification,
    Substitution(String),
    General(String),
}

impl PromptPlan {
    pub fn prompt(&self) -> Option<&str> {
        match self {
            PromptPlan::NeedsClarification => None,
            PromptPlan::Substitution(p) | PromptPlan::General(p) => Some(p),
        }
    }
}

/// Builds the prompt for `query` (already trimmed, original casing).
pub fn build(query: &str, intent: &Intent, context: &str) -> PromptPlan {
    if !intent.is_substitution {
        return PromptPlan::General(format!(
            "{BASE_INSTRUCTION}{GENERAL_INSTRUCTION}\n\nQuestion: {query}\n\nContext:\n{context}\n\nAnswer:"
        ));
    }

    if intent.target.is_none() {
        return PromptPlan::NeedsClarification;
    }

    PromptPlan::Substitution(format!(
        "{BASE_INSTRUCTION}{SUBSTITUTION_INSTRUCTION}\n\n{SUBSTITUTION_EXAMPLE}\nQuestion: {query}\n\nContext:\n{context}\n\nAnswer (bullets only):"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(is_substitution: bool, target: Option<&str>) -> Intent {
        Intent {
            is_substitution,
            target: target.map(str::to_string),
        }
    }

    #[test]
    fn test_base_instruction_text() {
        assert_eq!(
            BASE_INSTRUCTION,
            "You are a grounded recipe assistant. Use ONLY the Context. Cite sources as [Title | ID]. Write in third person. Avoid anecdotes."
        );
    }

    #[test]
    fn test_general_prompt_layout() {
        let plan = build("How long to bake?", &intent(false, None), "[A | 1]\nIngredients: x\nSteps: y");
        let PromptPlan::General(prompt) = plan else {
            panic!("expected general prompt");
        };

        assert!(prompt.starts_with(BASE_INSTRUCTION));
        assert!(prompt.contains("Keep the answer under 120 words. If steps exist, summarize them briefly.\n\nQuestion: How long to bake?\n\nContext:\n[A | 1]"));
        assert!(prompt.ends_with("Steps: y\n\nAnswer:"));
    }

    #[test]
    fn test_substitution_prompt_layout() {
        let plan = build("replace egg in cake", &intent(true, Some("egg")), "CTX");
        let prompt = plan.prompt().unwrap();

        assert!(prompt.contains("Return 2–4 bullet points"));
        assert!(prompt.contains(
            "quantities if possible.\n\nExample:\n- 1/4 cup applesauce — adds moisture + binding.\n- 1 tbsp ground flax + 3 tbsp water — forms a gel (\"flax egg\").\n\nQuestion: replace egg in cake\n\nContext:\nCTX\n\nAnswer (bullets only):"
        ));
    }

    #[test]
    fn test_missing_target_needs_clarification() {
        let plan = build("what can I substitute?", &intent(true, None), "CTX");
        assert_eq!(plan, PromptPlan::NeedsClarification);
        assert!(plan.prompt().is_none());
    }

    #[test]
    fn test_empty_context_still_builds() {
        let plan = build("hello", &intent(false, None), "");
        assert!(plan.prompt().unwrap().ends_with("Context:\n\n\nAnswer:"));
    }
}
