//! Shared test fixtures: a deterministic in-memory item store and item
//! builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::RwLock;

use beici_engine::error::StoreError;
use beici_engine::models::{MasteryState, SessionProgress, StudyItem};
use beici_engine::srs;
use beici_engine::store::ItemStore;

pub const FIXED_NOW: i64 = 1_700_000_000_000;

/// In-memory `ItemStore`. "Random" queries return items in insertion order so
/// tests stay deterministic. Write failures can be injected to exercise the
/// optimistic-progress policy.
pub struct MemoryItemStore {
    items: RwLock<Vec<StudyItem>>,
    progress: RwLock<HashMap<String, SessionProgress>>,
    next_progress_id: AtomicU64,
    fail_writes: AtomicBool,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            progress: RwLock::new(HashMap::new()),
            next_progress_id: AtomicU64::new(1),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub async fn with_items(items: Vec<StudyItem>) -> Self {
        let store = Self::new();
        for item in items {
            store.insert(item).await;
        }
        store
    }

    pub async fn insert(&self, item: StudyItem) {
        self.items.write().await.push(item);
    }

    /// Makes every subsequent mastery / progress write fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    pub async fn progress_record(&self, id: &str) -> Option<SessionProgress> {
        self.progress.read().await.get(id).cloned()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Corrupt("injected write failure".to_string()));
        }
        Ok(())
    }

    async fn update_mastery<F>(&self, id: &str, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut MasteryState),
    {
        self.check_write()?;
        let mut items = self.items.write().await;
        if let Some(item) = items.iter_mut().find(|item| item.id() == id) {
            apply(item.mastery_mut());
        }
        Ok(())
    }
}

impl ItemStore for MemoryItemStore {
    async fn find_due_items(
        &self,
        deck_id: &str,
        now: i64,
        limit: u32,
    ) -> Result<Vec<StudyItem>, StoreError> {
        let items = self.items.read().await;
        let mut due: Vec<StudyItem> = items
            .iter()
            .filter(|item| {
                item.deck_id() == deck_id && srs::needs_review(item.mastery().next_review_time, now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|item| item.mastery().next_review_time);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn find_random_items(
        &self,
        deck_id: &str,
        exclude_ids: &[String],
        count: u32,
    ) -> Result<Vec<StudyItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| {
                item.deck_id() == deck_id && !exclude_ids.iter().any(|id| id == item.id())
            })
            .take(count as usize)
            .cloned()
            .collect())
    }

    async fn find_random_items_other_decks(
        &self,
        deck_id: &str,
        count: u32,
    ) -> Result<Vec<StudyItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.deck_id() != deck_id)
            .take(count as usize)
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: &str) -> Result<Option<StudyItem>, StoreError> {
        let items = self.items.read().await;
        Ok(items.iter().find(|item| item.id() == id).cloned())
    }

    async fn record_first_learn(
        &self,
        id: &str,
        now: i64,
        stage: i32,
        next_review_time: i64,
        correct: bool,
    ) -> Result<(), StoreError> {
        self.update_mastery(id, |mastery| {
            mastery.first_learn_date = now;
            mastery.last_review_time = now;
            mastery.review_stage = stage;
            mastery.next_review_time = next_review_time;
            if correct {
                mastery.correct_count += 1;
            } else {
                mastery.wrong_count += 1;
            }
        })
        .await
    }

    async fn record_remembered(
        &self,
        id: &str,
        stage: i32,
        next_review_time: i64,
        now: i64,
    ) -> Result<(), StoreError> {
        self.update_mastery(id, |mastery| {
            mastery.review_stage = stage;
            mastery.next_review_time = next_review_time;
            mastery.last_review_time = now;
            mastery.correct_count += 1;
        })
        .await
    }

    async fn record_forgotten(
        &self,
        id: &str,
        stage: i32,
        next_review_time: i64,
        now: i64,
    ) -> Result<(), StoreError> {
        self.update_mastery(id, |mastery| {
            mastery.review_stage = stage;
            mastery.next_review_time = next_review_time;
            mastery.last_review_time = now;
            mastery.wrong_count += 1;
        })
        .await
    }

    async fn create_session_progress(
        &self,
        deck_id: &str,
        planned_count: u32,
    ) -> Result<String, StoreError> {
        self.check_write()?;
        let id = format!("sp-{}", self.next_progress_id.fetch_add(1, Ordering::Relaxed));
        let record = SessionProgress {
            id: id.clone(),
            deck_id: deck_id.to_string(),
            planned_count,
            completed_count: 0,
            correct_count: 0,
            started_at: FIXED_NOW,
            ended_at: None,
        };
        self.progress.write().await.insert(id.clone(), record);
        Ok(id)
    }

    async fn update_session_progress(
        &self,
        session_id: &str,
        completed_count: u32,
        correct_count: u32,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut progress = self.progress.write().await;
        if let Some(record) = progress.get_mut(session_id) {
            record.completed_count = completed_count;
            record.correct_count = correct_count;
        }
        Ok(())
    }

    async fn complete_session_progress(
        &self,
        session_id: &str,
        end_time: i64,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut progress = self.progress.write().await;
        if let Some(record) = progress.get_mut(session_id) {
            record.ended_at = Some(end_time);
        }
        Ok(())
    }

    async fn get_session_progress(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionProgress>, StoreError> {
        Ok(self.progress.read().await.get(session_id).cloned())
    }
}

// ---------- item builders ----------

pub fn word(id: &str, deck_id: &str, text: &str, translation: &str) -> StudyItem {
    StudyItem::Word {
        id: id.to_string(),
        deck_id: deck_id.to_string(),
        text: text.to_string(),
        translation: translation.to_string(),
        phonetic: None,
        part_of_speech: Some("n.".to_string()),
        mastery: MasteryState::default(),
    }
}

pub fn phrase(id: &str, deck_id: &str, text: &str, translation: &str) -> StudyItem {
    StudyItem::Phrase {
        id: id.to_string(),
        deck_id: deck_id.to_string(),
        text: text.to_string(),
        translation: translation.to_string(),
        mastery: MasteryState::default(),
    }
}

pub fn question(id: &str, deck_id: &str, prompt: &str, answer: &str, wrong: [&str; 3]) -> StudyItem {
    StudyItem::Question {
        id: id.to_string(),
        deck_id: deck_id.to_string(),
        prompt: prompt.to_string(),
        answer: answer.to_string(),
        options: vec![
            answer.to_string(),
            wrong[0].to_string(),
            wrong[1].to_string(),
            wrong[2].to_string(),
        ],
        mastery: MasteryState::default(),
    }
}

/// A word already in rotation, due at `next_review_time`.
pub fn due_word(id: &str, deck_id: &str, stage: i32, next_review_time: i64) -> StudyItem {
    let mut item = word(id, deck_id, id, &format!("translation of {id}"));
    let mastery = item.mastery_mut();
    mastery.first_learn_date = FIXED_NOW - 30 * srs::MILLIS_PER_DAY;
    mastery.last_review_time = mastery.first_learn_date;
    mastery.review_stage = stage;
    mastery.next_review_time = next_review_time;
    item
}
