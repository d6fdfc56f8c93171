use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Duplicate column id: {0}")]
    DuplicateColumn(String),

    #[error("Card {0} is referenced more than once")]
    DuplicateCardReference(String),

    #[error("Column {column} references unknown card {card}")]
    DanglingCardReference { column: String, card: String },

    #[error("Card {0} is not referenced by any column")]
    OrphanCard(String),

    #[error("Card stored under key {key} has id {id}")]
    CardKeyMismatch { key: String, id: String },

    #[error("Column layout changed: expected [{expected}], got [{actual}]")]
    LayoutChanged { expected: String, actual: String },

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Assistant error: {0}")]
    AssistantError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[cfg(feature = "sqlite-storage")]
impl From<rusqlite::Error> for BoardError {
    fn from(e: rusqlite::Error) -> Self {
        Self::StorageError(format!("sqlite: {}", e))
    }
}

impl BoardError {
    /// True for the variants produced by [`crate::Board::validate`]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::DuplicateColumn(_)
                | Self::DuplicateCardReference(_)
                | Self::DanglingCardReference { .. }
                | Self::OrphanCard(_)
                | Self::CardKeyMismatch { .. }
                | Self::LayoutChanged { .. }
        )
    }
}
