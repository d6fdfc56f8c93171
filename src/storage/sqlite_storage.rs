use crate::{
    domain::Board,
    error::{BoardError, Result},
    storage::Storage,
};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::{path::Path, sync::Mutex};
use tracing::{debug, info};

/// SQLite-based storage holding the board as a JSON document owned by a user row
pub struct SqliteStorage {
    connection: Mutex<Connection>,
    username: String,
}

impl SqliteStorage {
    const DEFAULT_USER: &'static str = "user";

    const SCHEMA: &'static str = "
        CREATE TABLE IF NOT EXISTS users (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            username   TEXT    NOT NULL UNIQUE,
            created_at TEXT    NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS boards (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            data       TEXT    NOT NULL,
            updated_at TEXT    NOT NULL DEFAULT (datetime('now'))
        );
    ";

    /// Opens (or creates) the database file at `database_path`
    pub fn open(database_path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open(database_path)?;
        Self::with_connection(connection)
    }

    /// Opens a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        connection.execute_batch(Self::SCHEMA)?;
        Ok(Self {
            connection: Mutex::new(connection),
            username: Self::DEFAULT_USER.to_string(),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| BoardError::StorageError("sqlite connection lock poisoned".to_string()))
    }

    fn stored_json(&self) -> Result<Option<String>> {
        let conn = self.conn()?;
        let data = conn
            .query_row(
                "SELECT b.data FROM boards b
                 JOIN users u ON u.id = b.user_id
                 WHERE u.username = ?1
                 ORDER BY b.id
                 LIMIT 1",
                params![self.username],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(data)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn initialize(&self) -> Result<()> {
        let seed = Board::seed().to_json_pretty()?;
        let conn = self.conn()?;

        conn.execute(
            "INSERT OR IGNORE INTO users (username) VALUES (?1)",
            params![self.username],
        )?;
        let user_id: i64 = conn.query_row(
            "SELECT id FROM users WHERE username = ?1",
            params![self.username],
            |row| row.get(0),
        )?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM boards WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_none() {
            info!(user = %self.username, "Seeding new board");
            conn.execute(
                "INSERT INTO boards (user_id, data) VALUES (?1, ?2)",
                params![user_id, seed],
            )?;
        }

        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        let json = serde_json::to_string(board)?;
        let conn = self.conn()?;

        let updated = conn.execute(
            "UPDATE boards SET data = ?1, updated_at = datetime('now')
             WHERE user_id = (SELECT id FROM users WHERE username = ?2)",
            params![json, self.username],
        )?;

        if updated == 0 {
            return Err(BoardError::BoardNotInitialized);
        }

        debug!(cards = board.cards.len(), "Board saved");
        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let json = self.stored_json()?.ok_or(BoardError::BoardNotInitialized)?;
        Board::from_json(&json)
    }

    async fn is_initialized(&self) -> bool {
        matches!(self.stored_json(), Ok(Some(_)))
    }
}
