//! Drag relocation: computes the column arrangement after a card is dropped
//! onto another card or onto a column.

use crate::domain::{
    board::{Board, Column},
    id::CardId,
};

/// Where a drop landed, resolved against the current columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropTarget {
    /// Index of the column that was dropped on directly
    Column(usize),
    /// Column index and position of the card that was dropped on
    Card { column: usize, index: usize },
}

fn resolve_target(columns: &[Column], target_id: &str) -> Option<DropTarget> {
    if let Some(column) = columns.iter().position(|c| c.id == *target_id) {
        return Some(DropTarget::Column(column));
    }

    columns.iter().enumerate().find_map(|(column, col)| {
        col.position_of(target_id)
            .map(|index| DropTarget::Card { column, index })
    })
}

/// Moves `dragged` next to `target_id`, which names either a column or a card.
///
/// - dropped on a different column: appended to the end of that column
/// - dropped on its own column: unchanged
/// - dropped on a card in another column: inserted just before that card
/// - dropped on a card in its own column: takes that card's index, so the card
///   lands after the target when moving down and before it when moving up
///
/// Unknown ids, or a card dropped on itself, leave the columns unchanged. So
/// does a dragged card that is not listed exactly once across all columns.
pub fn move_card(columns: &[Column], dragged: &CardId, target_id: &str) -> Vec<Column> {
    if dragged == target_id {
        return columns.to_vec();
    }

    let listings = columns
        .iter()
        .flat_map(|col| &col.card_ids)
        .filter(|id| *id == dragged)
        .count();
    if listings != 1 {
        return columns.to_vec();
    }

    let Some((source, source_index)) = columns
        .iter()
        .enumerate()
        .find_map(|(i, col)| col.position_of(dragged.as_str()).map(|pos| (i, pos)))
    else {
        return columns.to_vec();
    };

    let Some(target) = resolve_target(columns, target_id) else {
        return columns.to_vec();
    };

    let mut next = columns.to_vec();
    match target {
        DropTarget::Column(column) if column == source => {}
        DropTarget::Column(column) => {
            let card = next[source].card_ids.remove(source_index);
            next[column].card_ids.push(card);
        }
        DropTarget::Card { column, index } => {
            // Same column: removal shifts the target up when it sits below the source.
            let card = next[source].card_ids.remove(source_index);
            next[column].card_ids.insert(index, card);
        }
    }
    next
}

impl Board {
    /// Board-level wrapper around [`move_card`]; cards are left as they are
    pub fn move_card(&self, dragged: &CardId, target_id: &str) -> Board {
        Board {
            columns: move_card(&self.columns, dragged, target_id),
            cards: self.cards.clone(),
        }
    }
}
