use crate::{
    domain::Board,
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File-based storage keeping the board as pretty-printed JSON
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    const DATA_DIR: &'static str = ".kanban-studio";
    const BOARD_FILE: &'static str = "board.json";
    const ROOT_ENV: &'static str = "KANBAN_STUDIO_DIR";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
        }
    }

    /// Uses `KANBAN_STUDIO_DIR` as the project root, falling back to the current directory
    pub fn from_env() -> Result<Self> {
        let root = match std::env::var_os(Self::ROOT_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        debug!(root = %root.display(), "FileStorage root resolved");
        Ok(Self::new(root))
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        if !self.board_file().exists() {
            info!(path = %self.board_file().display(), "Seeding new board");
            self.save_board(&Board::seed()).await?;
        }

        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = board.to_json_pretty()?;
        // board.json is only ever replaced whole
        let tmp = self.root_path.join(format!("{}.tmp", Self::BOARD_FILE));
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, self.board_file()).await?;

        debug!(cards = board.cards.len(), "Board saved");
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(BoardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let board = Board::from_json(&contents)?;

        debug!(cards = board.cards.len(), "Board loaded");
        Ok(board)
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }
}
