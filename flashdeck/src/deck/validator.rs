//! Shape validation of provider output.

use serde_json::{Map, Value};

use super::{
    errors::{DeckError, DeckResult},
    models::{DraftCard, GeneratedDeckDraft},
};

/// Turns raw provider text into a [`GeneratedDeckDraft`]
///
/// Only the shape is checked: a JSON object with a non-empty string `title`, a string
/// `description` and an array `cards` whose entries carry non-empty `question` and
/// `answer` strings and an optional `explanation` string. Unknown fields are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeckValidator {
    min_cards: usize,
}

impl DeckValidator {
    /// Validator that accepts any number of cards, including none
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator that rejects drafts with fewer than `min_cards` cards
    pub fn with_min_cards(min_cards: usize) -> Self {
        Self { min_cards }
    }

    /// Parse and validate raw provider text
    ///
    /// # Errors
    ///
    /// - `DeckError::MalformedOutput` - Text is not JSON
    /// - `DeckError::SchemaViolation` - JSON does not have the deck shape; `field` is the
    ///   path of the first offending field, e.g. `cards[2].question`
    pub fn validate(&self, raw: &str) -> DeckResult<GeneratedDeckDraft> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| DeckError::MalformedOutput(e.to_string()))?;

        let root = value
            .as_object()
            .ok_or_else(|| DeckError::schema("$", "expected a JSON object"))?;

        let title = non_empty_string(root, "title", "title")?;
        let description = string(root, "description", "description")?;

        let entries = match root.get("cards") {
            Some(Value::Array(entries)) => entries,
            Some(_) => return Err(DeckError::schema("cards", "expected an array")),
            None => return Err(DeckError::schema("cards", "missing")),
        };

        let cards = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| card(index, entry))
            .collect::<DeckResult<Vec<_>>>()?;

        if cards.len() < self.min_cards {
            return Err(DeckError::schema(
                "cards",
                format!(
                    "expected at least {} cards, got {}",
                    self.min_cards,
                    cards.len()
                ),
            ));
        }

        Ok(GeneratedDeckDraft {
            title,
            description,
            cards,
        })
    }
}

fn card(index: usize, entry: &Value) -> DeckResult<DraftCard> {
    let path = format!("cards[{}]", index);
    let fields = entry
        .as_object()
        .ok_or_else(|| DeckError::schema(path.as_str(), "expected an object"))?;

    let question = non_empty_string(fields, "question", &format!("{path}.question"))?;
    let answer = non_empty_string(fields, "answer", &format!("{path}.answer"))?;
    let explanation = match fields.get("explanation") {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => {
            return Err(DeckError::schema(
                format!("{path}.explanation"),
                "expected a string",
            ));
        }
    };

    Ok(DraftCard {
        question,
        answer,
        explanation,
    })
}

fn string(fields: &Map<String, Value>, key: &str, path: &str) -> DeckResult<String> {
    match fields.get(key) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(DeckError::schema(path, "expected a string")),
        None => Err(DeckError::schema(path, "missing")),
    }
}

fn non_empty_string(fields: &Map<String, Value>, key: &str, path: &str) -> DeckResult<String> {
    let text = string(fields, key, path)?;
    if text.trim().is_empty() {
        return Err(DeckError::schema(path, "must not be empty"));
    }
    Ok(text)
}
