//! Curated substitutions, used when the model's bullets are rejected.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::MAX_BULLETS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub substitute: &'static str,
    pub rationale: &'static str,
}

const fn sub(substitute: &'static str, rationale: &'static str) -> Substitution {
    Substitution {
        substitute,
        rationale,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub ingredient: &'static str,
    pub substitutions: &'static [Substitution],
}

/// Checked in this order; the first key that matches wins.
pub static SUBSTITUTION_CATALOG: [CatalogEntry; 4] = [
    CatalogEntry {
        ingredient: "egg",
        substitutions: &[
            sub("1/4 cup applesauce", "adds moisture + binding"),
            sub("1/2 mashed ripe banana", "binds; slight banana taste"),
            sub("3 tbsp aquafaba", "whipped chickpea brine binds/aerates"),
            sub("1 tbsp ground flax + 3 tbsp water", "forms a gel (\"flax egg\")"),
        ],
    },
    CatalogEntry {
        ingredient: "milk",
        substitutions: &[
            sub("same amount oat/soy/almond milk", "similar liquid content"),
            sub("3 tbsp yogurt + splash water", "adds moisture + mild tang"),
            sub("water + 1 tsp oil per 1/2 cup", "keeps batter fluid"),
        ],
    },
    CatalogEntry {
        ingredient: "butter",
        substitutions: &[
            sub("equal oil", "neutral moisture/fat; crumb slightly different"),
            sub("margarine", "similar fat; check salt"),
            sub("coconut oil", "adds subtle coconut flavor"),
        ],
    },
    CatalogEntry {
        ingredient: "mayonnaise",
        substitutions: &[
            sub("3 tbsp aquafaba + 1 tsp mustard + 1 tsp lemon", "emulsifies like mayo"),
            sub("plain yogurt", "tangy binder; adjust salt"),
            sub("silken tofu (blended)", "neutral creamy binder"),
        ],
    },
];

/// `\b<key>s?\b` per entry, in catalog order.
static KEY_PATTERNS: LazyLock<Vec<(&'static CatalogEntry, Regex)>> = LazyLock::new(|| {
    SUBSTITUTION_CATALOG
        .iter()
        .map(|entry| {
            let pattern = format!(r"\b{}s?\b", regex::escape(entry.ingredient));
            (entry, Regex::new(&pattern).expect("catalog key pattern is valid"))
        })
        .collect()
});

fn match_key(text: &str) -> Option<&'static CatalogEntry> {
    KEY_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(entry, _)| *entry)
}

/// Looks the target up first, then the lowercased query.
pub fn lookup(target: Option<&str>, query_lower: &str) -> Option<&'static CatalogEntry> {
    target.and_then(match_key).or_else(|| match_key(query_lower))
}

impl CatalogEntry {
    /// `- substitute — rationale.` lines, at most four.
    pub fn render(&self) -> String {
        self.substitutions
            .iter()
            .take(MAX_BULLETS)
            .map(|s| format!("- {} — {}.", s.substitute, s.rationale))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
