use crate::domain::id::CardId;
use serde::{Deserialize, Serialize};

/// A unit of work on the board. Column membership lives on the column, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub details: String,
}

impl Card {
    /// Shown when a card is created or edited without details
    pub const DETAILS_PLACEHOLDER: &'static str = "No details yet.";

    /// Creates a card, substituting the placeholder for empty details
    pub fn new(id: CardId, title: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            details: Self::details_or_placeholder(details.into()),
        }
    }

    pub(crate) fn details_or_placeholder(details: String) -> String {
        if details.is_empty() {
            Self::DETAILS_PLACEHOLDER.to_string()
        } else {
            details
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let card = Card::new(CardId::new("card-1"), "Write spec", "Outline modules");
        assert_eq!(card.id.as_str(), "card-1");
        assert_eq!(card.title, "Write spec");
        assert_eq!(card.details, "Outline modules");
    }

    #[test]
    fn test_empty_details_use_placeholder() {
        let card = Card::new(CardId::new("card-1"), "Write spec", "");
        assert_eq!(card.details, "No details yet.");
    }

    #[test]
    fn test_whitespace_details_are_kept() {
        let card = Card::new(CardId::new("card-1"), "Write spec", " ");
        assert_eq!(card.details, " ");
    }

    #[test]
    fn test_missing_field_fails_deserialization() {
        let json = r#"{"id": "card-1", "title": "No details"}"#;
        assert!(serde_json::from_str::<Card>(json).is_err());
    }
}
