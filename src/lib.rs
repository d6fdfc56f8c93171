//! # Kanban Studio Core
//!
//! Board model, drag relocation and mutation logic for a single shared
//! kanban board.
//!
//! A [`Board`] is a value: ordered columns listing card ids, plus a map of the
//! cards themselves. Every edit returns a new board and keeps the
//! column/card invariants checked by [`Board::validate`]. Loading, saving and
//! the chat assistant sit behind the [`Storage`] and [`Assistant`] traits, and
//! [`BoardSession`] ties them together.

pub mod assistant;
pub mod domain;
pub mod error;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use assistant::{Assistant, AssistantReply, ChatMessage, ChatRole};
pub use domain::{
    board::{Board, BoardConfig, Column},
    card::Card,
    id::{create_id, CardId, ColumnId},
    relocation::move_card,
};
pub use error::{BoardError, Result};
pub use session::{BoardSession, LoadStatus};
pub use storage::Storage;
