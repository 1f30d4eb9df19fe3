//! Practice session controller: the single-phase quiz variant.
//!
//! A restricted instantiation of [`StudySession`] with phase transitions
//! disabled. Answers update statistics exactly like a study session, but the
//! session completes after one pass through the working set, and only
//! choice-mode items are selected since the wrapper has no recognition
//! submission. Kept as a wrapper so both variants share one state-machine
//! implementation.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::EngineConfig;
use crate::engine::session::{Phase, SessionKind, StudySession};
use crate::error::EngineError;
use crate::events::SessionEvent;
use crate::models::{ChoiceOption, StudyState};
use crate::store::ItemStore;

pub struct PracticeSession<S: ItemStore> {
    inner: StudySession<S>,
}

impl<S: ItemStore> PracticeSession<S> {
    pub async fn start(
        store: Arc<S>,
        deck_id: &str,
        target_count: u32,
    ) -> Result<Self, EngineError> {
        Self::start_with(store, deck_id, target_count, &EngineConfig::default()).await
    }

    pub async fn start_with(
        store: Arc<S>,
        deck_id: &str,
        target_count: u32,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let inner =
            StudySession::start_with(store, deck_id, target_count, SessionKind::Practice, config)
                .await?;
        Ok(Self { inner })
    }

    pub fn phase(&self) -> Phase {
        self.inner.phase()
    }

    pub fn is_completed(&self) -> bool {
        self.inner.is_completed()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn progress_id(&self) -> &str {
        self.inner.progress_id()
    }

    pub fn answered_total(&self) -> u32 {
        self.inner.answered_total()
    }

    pub fn correct_total(&self) -> u32 {
        self.inner.correct_total()
    }

    pub fn current(&self) -> Option<&StudyState> {
        self.inner.current()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.subscribe()
    }

    pub async fn choices(&self) -> Result<Vec<ChoiceOption>, EngineError> {
        self.inner.choices().await
    }

    pub async fn submit_choice(
        &mut self,
        selected: &ChoiceOption,
    ) -> Result<Option<bool>, EngineError> {
        self.inner.submit_choice(selected).await
    }

    pub async fn move_next(&mut self) -> Result<Phase, EngineError> {
        self.inner.move_next().await
    }

    pub fn move_previous(&mut self) {
        self.inner.move_previous()
    }
}
