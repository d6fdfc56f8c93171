use crate::{
    domain::Board,
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex,
};

/// In-memory storage, useful for tests and for running without a backend.
///
/// Saves can be made to fail on demand to exercise error reporting.
#[derive(Default)]
pub struct MemoryStorage {
    board: Mutex<Option<Board>>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the given board already stored
    pub fn with_board(board: Board) -> Self {
        Self {
            board: Mutex::new(Some(board)),
            ..Self::default()
        }
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The board as last saved, if any
    pub fn stored(&self) -> Option<Board> {
        self.board.lock().ok().and_then(|guard| guard.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Board>>> {
        self.board
            .lock()
            .map_err(|_| BoardError::StorageError("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        let mut guard = self.lock()?;
        if guard.is_none() {
            *guard = Some(Board::seed());
        }
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(BoardError::StorageError("save rejected".to_string()));
        }
        *self.lock()? = Some(board.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(BoardError::StorageError("load rejected".to_string()));
        }
        let board = self.lock()?.clone().ok_or(BoardError::BoardNotInitialized)?;
        board.validate()?;
        Ok(board)
    }

    async fn is_initialized(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }
}
