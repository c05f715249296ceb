//! Substitution-intent detection and target extraction.
//!
//! Rules run over the lowercased query in a fixed priority order; the first
//! target pattern that matches wins.

use std::sync::LazyLock;

use regex::Regex;

/// Any match marks the query as a substitution request.
static SUBSTITUTION_TRIGGERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\breplace\b",
        r"\bsubstitute\b",
        r"\bswap\b",
        r"\balternative(?:\s+to)?\b",
        r"\binstead of\b",
        r"\bwithout\b",
        r"\ballergy to\b",
        r"\bcan['’]?t use\b",
        r"\bcant use\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("trigger pattern is valid"))
    .collect()
});

/// Target patterns in priority order. Group 1 is the ingredient.
static TARGET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?:replace|substitute|swap)\s+(?:the\s+)?([a-zA-Z\- ]+?)\s+(?:in|for)\b",
        r"(?:instead of|alternative(?:\s+to)?)\s+([a-zA-Z\- ]+)",
        r"(?:without|allergy to|can['’]?t use|cant use)\s+([a-zA-Z\- ]+)",
        // Trailing sentence punctuation is allowed after the ingredient.
        r"(?:replace|substitute|swap)\s+(?:the\s+)?([a-zA-Z\- ]+?)[?.!\s]*$",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("target pattern is valid"))
    .collect()
});

static LEADING_PREPOSITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:in|for|on|with)\b\s*").expect("pattern is valid"));

static TRAILING_CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:in|for|on|with)\b.*$").expect("pattern is valid"));

/// Classification of one query. Derived once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub is_substitution: bool,
    /// Normalized ingredient to replace, e.g. `egg`.
    pub target: Option<String>,
}

impl Intent {
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Substitution asked for, but nothing to substitute.
    pub fn needs_clarification(&self) -> bool {
        self.is_substitution && self.target.is_none()
    }
}

pub fn classify(query: &str) -> Intent {
    let lowered = query.trim().to_lowercase();

    Intent {
        is_substitution: is_substitution(&lowered),
        target: extract_target(&lowered),
    }
}

fn is_substitution(lowered: &str) -> bool {
    SUBSTITUTION_TRIGGERS.iter().any(|re| re.is_match(lowered))
}

/// Target extraction runs regardless of the trigger result; the caller decides
/// whether the target matters.
fn extract_target(lowered: &str) -> Option<String> {
    let captured = TARGET_PATTERNS
        .iter()
        .find_map(|re| re.captures(lowered))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())?;

    normalize_target(&captured)
}

/// Plural and "dairy milk" folding, then the leading preposition and any
/// trailing `in/for/on/with ...` clause are dropped.
pub fn normalize_target(raw: &str) -> Option<String> {
    let folded = raw.replace("eggs", "egg").replace("dairy milk", "milk");
    let folded = folded.trim();

    let without_lead = LEADING_PREPOSITION.replace(folded, "");
    let target = TRAILING_CLAUSE.replace(&without_lead, "");
    let target = target.trim();

    (!target.is_empty()).then(|| target.to_string())
}
