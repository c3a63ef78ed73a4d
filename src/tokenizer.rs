//! Boundary tokenizer.
//!
//! Utterances reach the predictor as lowercase word tokens with literal
//! values lifted into numbered placeholders (`NUMBER_0`, …). When a request
//! carries its own entities, [`renumber_entities`] aligns the request-local
//! numbering with the numbering already used by the conversation context, so
//! the same value always maps to the same placeholder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type EntityMap = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tokenized {
    pub tokens: Vec<String>,
    #[serde(default)]
    pub entities: EntityMap,
}

/// Splits an utterance into predictor tokens, lifting numeric literals into
/// `NUMBER_n` placeholders. Pre-numbered placeholders pass through untouched.
pub fn tokenize(text: &str) -> Tokenized {
    let mut tokens = Vec::new();
    let mut entities = EntityMap::new();
    let mut next_number = 0usize;

    for raw in text.split_whitespace() {
        let word = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '.' && c != '_');
        if word.is_empty() {
            continue;
        }
        if is_placeholder(word) {
            tokens.push(word.to_string());
            continue;
        }
        if let Ok(number) = word.parse::<f64>() {
            let name = format!("NUMBER_{next_number}");
            entities.insert(name.clone(), serde_json::json!(number));
            tokens.push(name);
            next_number += 1;
            continue;
        }
        tokens.push(word.to_lowercase());
    }

    Tokenized { tokens, entities }
}

fn is_placeholder(word: &str) -> bool {
    split_placeholder(word).is_some()
}

/// `NUMBER_3` → `("NUMBER", 3)`.
fn split_placeholder(word: &str) -> Option<(&str, usize)> {
    let (family, index) = word.rsplit_once('_')?;
    if family.is_empty() || !family.chars().all(|c| c.is_ascii_uppercase() || c == '_') {
        return None;
    }
    Some((family, index.parse().ok()?))
}

/// Renumbers the placeholders of a freshly tokenized utterance against the
/// entities already present in the conversation context.
///
/// A value the context already knows keeps the context's placeholder; new
/// values are numbered after the highest index the context uses in that
/// family. The entity map is rewritten to match the new token names.
pub fn renumber_entities(tokenized: &mut Tokenized, context: &EntityMap) {
    let mut next_index: BTreeMap<String, usize> = BTreeMap::new();
    for name in context.keys() {
        if let Some((family, index)) = split_placeholder(name) {
            let next = next_index.entry(family.to_string()).or_insert(0);
            *next = (*next).max(index + 1);
        }
    }

    let mut renames: BTreeMap<String, String> = BTreeMap::new();
    let mut entities = context.clone();

    for (name, value) in &tokenized.entities {
        let Some((family, _)) = split_placeholder(name) else {
            continue;
        };
        let existing = context.iter().find_map(|(ctx_name, ctx_value)| {
            (split_placeholder(ctx_name).is_some_and(|(f, _)| f == family)
                && ctx_value == value)
                .then(|| ctx_name.clone())
        });
        let new_name = existing.unwrap_or_else(|| {
            let next = next_index.entry(family.to_string()).or_insert(0);
            let assigned = format!("{family}_{next}");
            *next += 1;
            assigned
        });
        entities.insert(new_name.clone(), value.clone());
        renames.insert(name.clone(), new_name);
    }

    for token in &mut tokenized.tokens {
        if let Some(new_name) = renames.get(token) {
            *token = new_name.clone();
        }
    }
    tokenized.entities = entities;
}
