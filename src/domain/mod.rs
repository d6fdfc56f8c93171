pub mod board;
pub mod card;
pub mod id;
pub mod mutation;
pub mod relocation;

pub use board::{Board, BoardConfig, Column};
pub use card::Card;
pub use id::{create_id, CardId, ColumnId};
pub use relocation::move_card;
