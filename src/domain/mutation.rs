//! Board edits. Each operation returns a new [`Board`]; references to columns
//! or cards that no longer exist turn the operation into a no-op.

use crate::domain::{
    board::Board,
    card::Card,
    id::{CardId, ColumnId},
};

impl Board {
    /// Replaces the title of a column
    pub fn rename_column(&self, column_id: &ColumnId, title: impl Into<String>) -> Board {
        let mut next = self.clone();
        if let Some(column) = next.columns.iter_mut().find(|c| &c.id == column_id) {
            column.title = title.into();
        }
        next
    }

    /// Appends a new card to the end of a column.
    ///
    /// Returns the new board together with the generated id, or the unchanged
    /// board and `None` when the column does not exist.
    pub fn add_card(
        &self,
        column_id: &ColumnId,
        title: impl Into<String>,
        details: impl Into<String>,
    ) -> (Board, Option<CardId>) {
        if self.column(column_id).is_none() {
            return (self.clone(), None);
        }

        let card = Card::new(CardId::generate(), title, details);
        let id = card.id.clone();

        let mut next = self.clone();
        if let Some(column) = next.columns.iter_mut().find(|c| &c.id == column_id) {
            column.card_ids.push(id.clone());
        }
        next.cards.insert(id.clone(), card);
        (next, Some(id))
    }

    /// Removes a card from its column and from the card map.
    ///
    /// Nothing changes unless `column_id` actually lists the card, so calling
    /// this twice is the same as calling it once.
    pub fn delete_card(&self, column_id: &ColumnId, card_id: &CardId) -> Board {
        let holds_card = self
            .column(column_id)
            .map(|c| c.contains(card_id))
            .unwrap_or(false);
        if !holds_card {
            return self.clone();
        }

        let mut next = self.clone();
        if let Some(column) = next.columns.iter_mut().find(|c| &c.id == column_id) {
            column.card_ids.retain(|id| id != card_id);
        }
        next.cards.remove(card_id);
        next
    }

    /// Edits the title and details of an existing card
    pub fn update_card(
        &self,
        card_id: &CardId,
        title: impl Into<String>,
        details: impl Into<String>,
    ) -> Board {
        let mut next = self.clone();
        if let Some(card) = next.cards.get_mut(card_id) {
            card.title = title.into();
            card.details = Card::details_or_placeholder(details.into());
        }
        next
    }
}
