//! Read/write contract the engine requires from the item store.
//!
//! The store is an external transactional resource shared with the rest of
//! the application; the engine only issues point reads and writes and never
//! holds a transaction across a session.

mod sqlite;

pub use sqlite::SqliteItemStore;

use crate::error::StoreError;
use crate::models::{SessionProgress, StudyItem};

#[allow(async_fn_in_trait)]
pub trait ItemStore: Send + Sync {
    /// Items in the deck that are due at `now`, ordered by ascending
    /// `nextReviewTime` (most overdue first), capped at `limit`.
    async fn find_due_items(
        &self,
        deck_id: &str,
        now: i64,
        limit: u32,
    ) -> Result<Vec<StudyItem>, StoreError>;

    /// Random items from the deck, excluding the given ids.
    async fn find_random_items(
        &self,
        deck_id: &str,
        exclude_ids: &[String],
        count: u32,
    ) -> Result<Vec<StudyItem>, StoreError>;

    /// Random items drawn from every deck except `deck_id`.
    async fn find_random_items_other_decks(
        &self,
        deck_id: &str,
        count: u32,
    ) -> Result<Vec<StudyItem>, StoreError>;

    async fn get_item(&self, id: &str) -> Result<Option<StudyItem>, StoreError>;

    /// First-time learn: anchors `firstLearnDate` to `now` and enters the
    /// rotation. `correct` selects which monotone counter is bumped.
    async fn record_first_learn(
        &self,
        id: &str,
        now: i64,
        stage: i32,
        next_review_time: i64,
        correct: bool,
    ) -> Result<(), StoreError>;

    async fn record_remembered(
        &self,
        id: &str,
        stage: i32,
        next_review_time: i64,
        now: i64,
    ) -> Result<(), StoreError>;

    async fn record_forgotten(
        &self,
        id: &str,
        stage: i32,
        next_review_time: i64,
        now: i64,
    ) -> Result<(), StoreError>;

    /// Opens a progress record and returns its id.
    async fn create_session_progress(
        &self,
        deck_id: &str,
        planned_count: u32,
    ) -> Result<String, StoreError>;

    async fn update_session_progress(
        &self,
        session_id: &str,
        completed_count: u32,
        correct_count: u32,
    ) -> Result<(), StoreError>;

    async fn complete_session_progress(
        &self,
        session_id: &str,
        end_time: i64,
    ) -> Result<(), StoreError>;

    async fn get_session_progress(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionProgress>, StoreError>;
}
