use crate::domain::{
    card::Card,
    id::{CardId, ColumnId},
};
use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A stage of the board holding an ordered list of card ids (top to bottom)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub card_ids: Vec<CardId>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            card_ids: Vec::new(),
        }
    }

    pub fn with_cards<I, C>(mut self, card_ids: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CardId>,
    {
        self.card_ids = card_ids.into_iter().map(Into::into).collect();
        self
    }

    /// Checks whether the column lists the given card
    pub fn contains(&self, card_id: &CardId) -> bool {
        self.card_ids.contains(card_id)
    }

    /// Position of the card in display order
    pub fn position_of(&self, card_id: &str) -> Option<usize> {
        self.card_ids.iter().position(|id| id.as_str() == card_id)
    }
}

/// Column layout used to build a fresh board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub columns: Vec<Column>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            columns: vec![
                Column::new("col-backlog", "Backlog"),
                Column::new("col-discovery", "Discovery"),
                Column::new("col-progress", "In Progress"),
                Column::new("col-review", "Review"),
                Column::new("col-done", "Done"),
            ],
        }
    }
}

/// Kanban board state: ordered columns plus every card keyed by id.
///
/// A board is treated as an immutable snapshot. Operations in
/// [`crate::domain::mutation`] and [`crate::domain::relocation`] return a new
/// value and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
    pub cards: BTreeMap<CardId, Card>,
}

impl Board {
    /// Creates an empty board with the configured columns
    pub fn new(config: BoardConfig) -> Self {
        let columns = config
            .columns
            .into_iter()
            .map(|col| Column::new(col.id, col.title))
            .collect();

        Self {
            columns,
            cards: BTreeMap::new(),
        }
    }

    /// The default layout populated with a handful of starter cards
    pub fn seed() -> Self {
        const CARDS: [(&str, &str, &str, &str); 8] = [
            (
                "col-backlog",
                "card-1",
                "Align roadmap themes",
                "Draft quarterly themes with impact statements and metrics.",
            ),
            (
                "col-backlog",
                "card-2",
                "Gather customer signals",
                "Review support tags, sales notes, and churn feedback.",
            ),
            (
                "col-discovery",
                "card-3",
                "Prototype analytics view",
                "Sketch initial dashboard layout and key drill-downs.",
            ),
            (
                "col-progress",
                "card-4",
                "Refine status language",
                "Standardize column labels and tone across the board.",
            ),
            (
                "col-progress",
                "card-5",
                "Design card layout",
                "Add hierarchy and spacing for scanning dense lists.",
            ),
            (
                "col-review",
                "card-6",
                "QA micro-interactions",
                "Verify hover, focus, and loading states.",
            ),
            (
                "col-done",
                "card-7",
                "Ship marketing page",
                "Final copy approved and asset pack delivered.",
            ),
            (
                "col-done",
                "card-8",
                "Close onboarding sprint",
                "Document release notes and share internally.",
            ),
        ];

        let mut board = Self::default();
        for (column_id, card_id, title, details) in CARDS {
            let id = CardId::new(card_id);
            if let Some(column) = board.columns.iter_mut().find(|c| c.id == *column_id) {
                column.card_ids.push(id.clone());
            }
            board.cards.insert(id.clone(), Card::new(id, title, details));
        }
        board
    }

    /// Parses a board supplied from outside (storage, assistant) and checks its invariants
    pub fn from_json(json: &str) -> Result<Self> {
        let board: Board = serde_json::from_str(json)?;
        board.validate()?;
        Ok(board)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks the referential invariants between columns and cards.
    ///
    /// - column ids are unique
    /// - every listed card id appears exactly once across all columns
    /// - every listed card id exists in `cards`
    /// - every card is listed by some column and stored under its own id
    pub fn validate(&self) -> Result<()> {
        let mut column_ids: HashSet<&ColumnId> = HashSet::new();
        let mut referenced: HashSet<&CardId> = HashSet::new();

        for column in &self.columns {
            if !column_ids.insert(&column.id) {
                return Err(BoardError::DuplicateColumn(column.id.to_string()));
            }

            for card_id in &column.card_ids {
                if !referenced.insert(card_id) {
                    return Err(BoardError::DuplicateCardReference(card_id.to_string()));
                }
                if !self.cards.contains_key(card_id) {
                    return Err(BoardError::DanglingCardReference {
                        column: column.id.to_string(),
                        card: card_id.to_string(),
                    });
                }
            }
        }

        for (key, card) in &self.cards {
            if key != &card.id {
                return Err(BoardError::CardKeyMismatch {
                    key: key.to_string(),
                    id: card.id.to_string(),
                });
            }
            if !referenced.contains(key) {
                return Err(BoardError::OrphanCard(key.to_string()));
            }
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// True when both boards have the same column ids in the same order
    pub fn has_same_layout(&self, other: &Board) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(&other.columns)
                .all(|(a, b)| a.id == b.id)
    }

    /// Like [`Board::has_same_layout`], reporting the difference as an error
    pub fn ensure_same_layout(&self, other: &Board) -> Result<()> {
        if self.has_same_layout(other) {
            return Ok(());
        }
        Err(BoardError::LayoutChanged {
            expected: self.layout_summary(),
            actual: other.layout_summary(),
        })
    }

    fn layout_summary(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn column(&self, column_id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == column_id)
    }

    pub fn card(&self, card_id: &CardId) -> Option<&Card> {
        self.cards.get(card_id)
    }

    /// Finds the column currently listing the card
    pub fn column_of(&self, card_id: &CardId) -> Option<&Column> {
        self.columns.iter().find(|c| c.contains(card_id))
    }

    /// Cards of a column in display order, skipping ids with no card
    pub fn cards_in(&self, column_id: &ColumnId) -> Vec<&Card> {
        self.column(column_id)
            .map(|col| {
                col.card_ids
                    .iter()
                    .filter_map(|id| self.cards.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of card ids listed across all columns
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.card_ids.len()).sum()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}
