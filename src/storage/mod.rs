use crate::{domain::Board, error::Result};
use async_trait::async_trait;

pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_storage;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

#[cfg(feature = "sqlite-storage")]
pub use sqlite_storage::SqliteStorage;

/// Storage trait for loading and persisting the single shared board
#[async_trait]
pub trait Storage: Send + Sync {
    /// Prepares the backend, seeding the starter board if none exists yet
    async fn initialize(&self) -> Result<()>;

    /// Replaces the stored board with the given value
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads the stored board, rejecting values that break the board invariants
    async fn load_board(&self) -> Result<Board>;

    /// Checks if a board has been stored
    async fn is_initialized(&self) -> bool;
}
