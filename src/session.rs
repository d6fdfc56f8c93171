//! The live board of one user session.
//!
//! [`BoardSession`] holds the current [`Board`] and funnels every change
//! through [`BoardSession::commit`]: the new value becomes current first, then
//! it is handed to storage. A failed save raises [`BoardSession::save_error`]
//! but never rolls the board back, so the most recent local edit always wins.

use crate::{
    assistant::{Assistant, AssistantReply, ChatMessage, FALLBACK_REPLY},
    domain::{Board, CardId, ColumnId},
    error::Result,
    storage::Storage,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Progress of the initial board load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Error,
}

pub struct BoardSession<S: Storage> {
    storage: S,
    board: Board,
    status: LoadStatus,
    save_error: bool,
    last_saved_at: Option<DateTime<Utc>>,
    transcript: Vec<ChatMessage>,
}

impl<S: Storage> BoardSession<S> {
    /// Creates a session with an empty board; call [`BoardSession::load`] next
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            board: Board {
                columns: Vec::new(),
                cards: BTreeMap::new(),
            },
            status: LoadStatus::Loading,
            save_error: false,
            last_saved_at: None,
            transcript: Vec::new(),
        }
    }

    /// Loads the board from storage, moving to `Ready` or `Error`
    pub async fn load(&mut self) -> Result<()> {
        match self.storage.load_board().await {
            Ok(board) => {
                info!(
                    columns = board.columns.len(),
                    cards = board.cards.len(),
                    "Board loaded"
                );
                self.board = board;
                self.status = LoadStatus::Ready;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load board");
                self.status = LoadStatus::Error;
                Err(e)
            }
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// True when the most recent save failed
    pub fn save_error(&self) -> bool {
        self.save_error
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    /// Chat transcript with the assistant, oldest first
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Makes `next` the current board, then persists it.
    ///
    /// An unchanged board is not saved again, unless the previous save failed,
    /// in which case the save is retried.
    pub async fn commit(&mut self, next: Board) {
        if next == self.board && !self.save_error {
            debug!("Board unchanged, skipping save");
            return;
        }

        self.board = next;
        self.save_error = false;

        match self.storage.save_board(&self.board).await {
            Ok(()) => {
                self.last_saved_at = Some(Utc::now());
            }
            Err(e) => {
                warn!(error = %e, "Changes could not be saved");
                self.save_error = true;
            }
        }
    }

    /// Drops a card onto another card or a column
    pub async fn move_card(&mut self, dragged: &CardId, target_id: &str) {
        debug!(card = %dragged, target = %target_id, "Moving card");
        let next = self.board.move_card(dragged, target_id);
        self.commit(next).await;
    }

    pub async fn rename_column(&mut self, column_id: &ColumnId, title: &str) {
        debug!(column = %column_id, title = %title, "Renaming column");
        let next = self.board.rename_column(column_id, title);
        self.commit(next).await;
    }

    /// Adds a card to the end of a column, returning its id when the column exists
    pub async fn add_card(
        &mut self,
        column_id: &ColumnId,
        title: &str,
        details: &str,
    ) -> Option<CardId> {
        let (next, id) = self.board.add_card(column_id, title, details);
        debug!(column = %column_id, card = ?id, "Adding card");
        self.commit(next).await;
        id
    }

    pub async fn delete_card(&mut self, column_id: &ColumnId, card_id: &CardId) {
        debug!(column = %column_id, card = %card_id, "Deleting card");
        let next = self.board.delete_card(column_id, card_id);
        self.commit(next).await;
    }

    pub async fn update_card(&mut self, card_id: &CardId, title: &str, details: &str) {
        debug!(card = %card_id, "Updating card");
        let next = self.board.update_card(card_id, title, details);
        self.commit(next).await;
    }

    /// Accepts a whole replacement board from outside, e.g. from the assistant.
    ///
    /// The replacement must satisfy the board invariants and keep the current
    /// column ids in order; otherwise it is rejected and the board is untouched.
    pub async fn replace_board(&mut self, next: Board) -> Result<()> {
        let checked = next
            .validate()
            .and_then(|()| self.board.ensure_same_layout(&next));
        if let Err(e) = checked {
            warn!(error = %e, "Rejected replacement board");
            return Err(e);
        }

        info!(cards = next.cards.len(), "Applying replacement board");
        self.commit(next).await;
        Ok(())
    }

    /// Sends one message to the assistant and applies any board it returns.
    ///
    /// Blank messages are ignored. The user message and the reply are added
    /// to the transcript; if the assistant fails, a fallback reply is recorded
    /// instead and the error is returned. A returned board that fails
    /// [`BoardSession::replace_board`] is reported as an error after the reply
    /// has been recorded.
    pub async fn ask<A>(&mut self, assistant: &A, message: &str) -> Result<Option<AssistantReply>>
    where
        A: Assistant + ?Sized,
    {
        let text = message.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let history = self.transcript.clone();
        self.transcript.push(ChatMessage::user(text));

        let reply = match assistant.chat(&self.board, text, &history).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Assistant request failed");
                self.transcript.push(ChatMessage::assistant(FALLBACK_REPLY));
                return Err(e);
            }
        };

        self.transcript
            .push(ChatMessage::assistant(reply.response.clone()));

        if let Some(board) = reply.board.clone() {
            self.replace_board(board).await?;
        }

        Ok(Some(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assistant::{build_messages, ChatRole},
        error::BoardError,
        storage::MemoryStorage,
    };
    use async_trait::async_trait;
    use std::{collections::VecDeque, sync::Mutex};

    /// Replays canned replies and records the prompts it was given
    struct ScriptedAssistant {
        replies: Mutex<VecDeque<Result<AssistantReply>>>,
        prompts: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedAssistant {
        fn new(replies: Vec<Result<AssistantReply>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Assistant for ScriptedAssistant {
        async fn chat(
            &self,
            board: &Board,
            message: &str,
            history: &[ChatMessage],
        ) -> Result<AssistantReply> {
            let prompt = build_messages(board, message, history)?;
            self.prompts.lock().unwrap().push(prompt);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BoardError::AssistantError("no reply".to_string())))
        }
    }

    async fn ready_session() -> BoardSession<MemoryStorage> {
        let mut session = BoardSession::new(MemoryStorage::with_board(Board::seed()));
        session.load().await.unwrap();
        session
    }

    fn col(id: &str) -> ColumnId {
        ColumnId::new(id)
    }

    #[tokio::test]
    async fn test_new_session_is_loading() {
        let session = BoardSession::new(MemoryStorage::new());
        assert_eq!(session.status(), LoadStatus::Loading);
        assert!(session.board().columns.is_empty());
    }

    #[tokio::test]
    async fn test_load_success() {
        let session = ready_session().await;
        assert_eq!(session.status(), LoadStatus::Ready);
        assert_eq!(session.board(), &Board::seed());
    }

    #[tokio::test]
    async fn test_load_failure() {
        let storage = MemoryStorage::with_board(Board::seed());
        storage.set_fail_loads(true);
        let mut session = BoardSession::new(storage);

        assert!(session.load().await.is_err());
        assert_eq!(session.status(), LoadStatus::Error);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let mut session = ready_session().await;

        let id = session
            .add_card(&col("col-backlog"), "Write spec", "")
            .await
            .unwrap();
        session.move_card(&id, "col-review").await;
        session.rename_column(&col("col-review"), "QA").await;

        let stored = session.storage().stored().unwrap();
        assert_eq!(&stored, session.board());
        assert_eq!(session.storage().save_count(), 3);
        assert!(session.last_saved_at().is_some());

        let review = stored.column(&col("col-review")).unwrap();
        assert_eq!(review.title, "QA");
        assert_eq!(review.card_ids.last(), Some(&id));
        assert!(stored.is_valid());
    }

    #[tokio::test]
    async fn test_noop_is_not_saved() {
        let mut session = ready_session().await;
        session.move_card(&CardId::new("card-1"), "card-1").await;
        session
            .delete_card(&col("col-done"), &CardId::new("card-1"))
            .await;
        assert_eq!(session.storage().save_count(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_local_state() {
        let mut session = ready_session().await;
        session.storage().set_fail_saves(true);

        session
            .delete_card(&col("col-backlog"), &CardId::new("card-1"))
            .await;

        assert!(session.save_error());
        assert!(session.board().card(&CardId::new("card-1")).is_none());
        assert_eq!(session.storage().stored(), Some(Board::seed()));

        // Next successful save clears the flag
        session.storage().set_fail_saves(false);
        session
            .update_card(&CardId::new("card-2"), "Gather signals", "Support tags")
            .await;
        assert!(!session.save_error());
        assert_eq!(session.storage().stored().as_ref(), Some(session.board()));
    }

    #[tokio::test]
    async fn test_noop_retries_failed_save() {
        let mut session = ready_session().await;
        session.storage().set_fail_saves(true);
        session
            .rename_column(&col("col-backlog"), "Ideas")
            .await;
        assert!(session.save_error());

        session.storage().set_fail_saves(false);
        session.move_card(&CardId::new("card-1"), "card-1").await;

        assert!(!session.save_error());
        assert_eq!(session.storage().save_count(), 1);
        assert_eq!(session.storage().stored().as_ref(), Some(session.board()));
    }

    #[tokio::test]
    async fn test_replace_board_rejects_invalid() {
        let mut session = ready_session().await;

        let mut dangling = Board::seed();
        dangling.columns[0].card_ids.push(CardId::new("ghost"));
        let err = session.replace_board(dangling).await.unwrap_err();
        assert!(matches!(err, BoardError::DanglingCardReference { .. }));

        let mut relaid = Board::seed();
        relaid.columns.reverse();
        let err = session.replace_board(relaid).await.unwrap_err();
        assert!(matches!(err, BoardError::LayoutChanged { .. }));

        assert_eq!(session.board(), &Board::seed());
        assert_eq!(session.storage().save_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_applies_board() {
        let mut session = ready_session().await;
        let proposed = Board::seed().move_card(&CardId::new("card-6"), "col-done");
        let assistant = ScriptedAssistant::new(vec![Ok(AssistantReply::with_board(
            "Moved QA to Done.",
            proposed.clone(),
        ))]);

        let reply = session
            .ask(&assistant, "  move QA to done ")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(reply.response, "Moved QA to Done.");
        assert_eq!(session.board(), &proposed);
        assert_eq!(session.storage().stored(), Some(proposed));
        assert_eq!(
            session.transcript(),
            &[
                ChatMessage::user("move QA to done"),
                ChatMessage::assistant("Moved QA to Done."),
            ]
        );
    }

    #[tokio::test]
    async fn test_ask_passes_history() {
        let mut session = ready_session().await;
        let assistant = ScriptedAssistant::new(vec![
            Ok(AssistantReply::text("Eight.")),
            Ok(AssistantReply::text("Two.")),
        ]);

        session.ask(&assistant, "How many cards?").await.unwrap();
        session.ask(&assistant, "And in done?").await.unwrap();

        let prompts = assistant.prompts.lock().unwrap();
        assert_eq!(prompts[0].len(), 2);
        assert_eq!(prompts[1].len(), 4);
        assert_eq!(prompts[1][1], ChatMessage::user("How many cards?"));
        assert_eq!(prompts[1][2].role, ChatRole::Assistant);
        assert_eq!(session.storage().save_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_blank_message_is_ignored() {
        let mut session = ready_session().await;
        let assistant = ScriptedAssistant::new(vec![]);

        assert!(session.ask(&assistant, "   ").await.unwrap().is_none());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_ask_failure_records_fallback() {
        let mut session = ready_session().await;
        let assistant = ScriptedAssistant::new(vec![Err(BoardError::AssistantError(
            "timeout".to_string(),
        ))]);

        assert!(session.ask(&assistant, "hello").await.is_err());
        assert_eq!(
            session.transcript().last(),
            Some(&ChatMessage::assistant(FALLBACK_REPLY))
        );
        assert_eq!(session.board(), &Board::seed());
    }

    #[tokio::test]
    async fn test_ask_rejects_invalid_board() {
        let mut session = ready_session().await;
        let mut broken = Board::seed();
        broken.cards.remove("card-8");
        let assistant =
            ScriptedAssistant::new(vec![Ok(AssistantReply::with_board("Done!", broken))]);

        let err = session.ask(&assistant, "drop card 8").await.unwrap_err();
        assert!(err.is_invariant_violation());
        assert_eq!(session.board(), &Board::seed());
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_works_with_dyn_assistant() {
        let mut session = ready_session().await;
        let assistant: Box<dyn Assistant> =
            Box::new(ScriptedAssistant::new(vec![Ok(AssistantReply::text("Hi"))]));

        let reply = session.ask(assistant.as_ref(), "hi").await.unwrap();
        assert_eq!(reply.map(|r| r.response), Some("Hi".to_string()));
    }
}
