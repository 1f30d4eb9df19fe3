//! Study session state machine.
//!
//! A session owns an ordered working set and walks it through up to three
//! phases: main study, phrase review (unknown phrases, drained first because
//! a binary re-test is cheap), then wrong-word review. Phase presence is
//! re-evaluated every time the current list is exhausted, never scheduled in
//! advance. One session has one caller; access is single-writer by contract.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::choices::build_choices;
use crate::engine::selector::build_working_set;
use crate::error::EngineError;
use crate::events::{
    AnswerRecordedPayload, PhaseChangedPayload, SessionEndedPayload, SessionEvent, SessionEvents,
};
use crate::models::{ChoiceOption, InteractionMode, StudyItem, StudyState};
use crate::srs;
use crate::store::ItemStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    MainStudy,
    PhraseReview,
    WrongWordReview,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MainStudy => "MAIN_STUDY",
            Self::PhraseReview => "PHRASE_REVIEW",
            Self::WrongWordReview => "WRONG_WORD_REVIEW",
            Self::Completed => "COMPLETED",
        }
    }
}

/// Study sessions run the full phase ladder; practice sessions end after one
/// pass regardless of wrong answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Study,
    Practice,
}

pub struct StudySession<S: ItemStore> {
    store: Arc<S>,
    kind: SessionKind,
    deck_id: String,
    progress_id: String,
    phase: Phase,
    cursor: usize,
    states: Vec<StudyState>,
    wrong_items: Vec<StudyItem>,
    unknown_phrases: Vec<StudyItem>,
    reviewed_phrase_ids: HashSet<String>,
    answered_total: u32,
    correct_total: u32,
    choice_count: usize,
    events: SessionEvents,
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

impl<S: ItemStore> StudySession<S> {
    /// Starts a study session over `deck_id` with the default configuration.
    pub async fn start(
        store: Arc<S>,
        deck_id: &str,
        target_count: u32,
    ) -> Result<Self, EngineError> {
        Self::start_with(
            store,
            deck_id,
            target_count,
            SessionKind::Study,
            &EngineConfig::default(),
        )
        .await
    }

    pub async fn start_with(
        store: Arc<S>,
        deck_id: &str,
        target_count: u32,
        kind: SessionKind,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let mut working_set =
            build_working_set(store.as_ref(), deck_id, target_count, now_ms()).await?;
        // Practice sessions only expose choice submission; recognition-mode
        // items would be unanswerable and stall the cursor.
        if kind == SessionKind::Practice {
            working_set.retain(|item| item.interaction() == InteractionMode::Choice);
        }
        if working_set.is_empty() {
            return Err(EngineError::EmptyWorkingSet {
                deck_id: deck_id.to_string(),
            });
        }

        let planned = working_set.len() as u32;
        let progress_id = store.create_session_progress(deck_id, planned).await?;

        let session = Self {
            store,
            kind,
            deck_id: deck_id.to_string(),
            progress_id: progress_id.clone(),
            phase: Phase::MainStudy,
            cursor: 0,
            states: working_set.into_iter().map(StudyState::new).collect(),
            wrong_items: Vec::new(),
            unknown_phrases: Vec::new(),
            reviewed_phrase_ids: HashSet::new(),
            answered_total: 0,
            correct_total: 0,
            choice_count: config.choice_count.max(2),
            events: SessionEvents::new(),
        };

        info!(
            session_id = %progress_id,
            deck_id,
            planned_count = planned,
            "session started"
        );

        Ok(session)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_completed(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Items in the current phase's working set.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn progress_id(&self) -> &str {
        &self.progress_id
    }

    pub fn answered_total(&self) -> u32 {
        self.answered_total
    }

    pub fn correct_total(&self) -> u32 {
        self.correct_total
    }

    pub fn reviewed_phrase_count(&self) -> usize {
        self.reviewed_phrase_ids.len()
    }

    pub fn current(&self) -> Option<&StudyState> {
        if self.phase == Phase::Completed {
            return None;
        }
        self.states.get(self.cursor)
    }

    /// Change notifications for this session.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Choice set for the current item. Empty when the cursor is out of range.
    pub async fn choices(&self) -> Result<Vec<ChoiceOption>, EngineError> {
        let Some(state) = self.current() else {
            return Ok(Vec::new());
        };
        build_choices(self.store.as_ref(), &state.item, self.choice_count).await
    }

    /// Records a choice answer for the current item. Returns the correctness,
    /// or `None` when the call is a defensive no-op (no current item, already
    /// answered, or a recognition-mode item).
    pub async fn submit_choice(
        &mut self,
        selected: &ChoiceOption,
    ) -> Result<Option<bool>, EngineError> {
        let Some(state) = self.current() else {
            return Ok(None);
        };
        if state.answered || state.item.interaction() != InteractionMode::Choice {
            return Ok(None);
        }

        let correct = selected.correct;
        self.record_answer(correct).await;
        Ok(Some(correct))
    }

    /// Records a binary known / unknown judgment for the current phrase item.
    /// "Known" counts as a correct answer and marks the phrase reviewed;
    /// "unknown" counts as wrong and enqueues the phrase for phrase review.
    pub async fn submit_recognition(&mut self, known: bool) -> Result<Option<bool>, EngineError> {
        let Some(state) = self.current() else {
            return Ok(None);
        };
        if state.answered || state.item.interaction() != InteractionMode::Recognition {
            return Ok(None);
        }

        let item = state.item.clone();
        if known {
            self.reviewed_phrase_ids.insert(item.id().to_string());
        } else if !self.unknown_phrases.iter().any(|p| p.id() == item.id()) {
            self.unknown_phrases.push(item);
        }

        self.record_answer(known).await;
        Ok(Some(known))
    }

    /// Advances the cursor. A no-op while the current item is unanswered; at
    /// the end of a list the next phase is chosen: phrase review first, then
    /// wrong-word review, then completion.
    pub async fn move_next(&mut self) -> Result<Phase, EngineError> {
        if self.phase == Phase::Completed {
            return Ok(self.phase);
        }
        match self.states.get(self.cursor) {
            // Never advance over an unevaluated item.
            Some(state) if !state.answered => return Ok(self.phase),
            None => return Ok(self.phase),
            Some(_) => {}
        }

        if self.cursor + 1 < self.states.len() {
            self.cursor += 1;
            return Ok(self.phase);
        }

        if self.kind == SessionKind::Practice {
            self.complete().await;
            return Ok(self.phase);
        }

        if !self.unknown_phrases.is_empty() {
            let queue = std::mem::take(&mut self.unknown_phrases);
            self.enter_phase(Phase::PhraseReview, queue);
        } else if !self.wrong_items.is_empty() {
            let queue = std::mem::take(&mut self.wrong_items);
            self.enter_phase(Phase::WrongWordReview, queue);
        } else {
            self.complete().await;
        }
        Ok(self.phase)
    }

    /// Steps back within the current phase. Never crosses a phase boundary
    /// and never re-triggers persistence.
    pub fn move_previous(&mut self) {
        if self.phase != Phase::Completed && self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    fn enter_phase(&mut self, phase: Phase, queue: Vec<StudyItem>) {
        debug!(
            session_id = %self.progress_id,
            phase = phase.as_str(),
            item_count = queue.len(),
            "entering phase"
        );
        self.states = queue.into_iter().map(StudyState::new).collect();
        self.cursor = 0;
        self.phase = phase;
        self.events
            .publish(SessionEvent::PhaseChanged(PhaseChangedPayload {
                session_id: self.progress_id.clone(),
                phase: phase.as_str().to_string(),
                item_count: self.states.len(),
                timestamp: Utc::now(),
            }));
    }

    async fn complete(&mut self) {
        self.phase = Phase::Completed;
        let ended_at = now_ms();
        if let Err(err) = self
            .store
            .complete_session_progress(&self.progress_id, ended_at)
            .await
        {
            warn!(
                session_id = %self.progress_id,
                error = %err,
                "failed to close session progress record"
            );
        }
        info!(
            session_id = %self.progress_id,
            completed_count = self.answered_total,
            correct_count = self.correct_total,
            "session completed"
        );
        self.events.publish(SessionEvent::Ended(SessionEndedPayload {
            session_id: self.progress_id.clone(),
            completed_count: self.answered_total,
            correct_count: self.correct_total,
            timestamp: Utc::now(),
        }));
    }

    /// Applies one answer to the current item: mastery-state transition and
    /// store write first, then the in-memory session bookkeeping.
    async fn record_answer(&mut self, correct: bool) {
        let now = now_ms();
        let (item_id, update, first_learn) = {
            let state = &self.states[self.cursor];
            let mastery = state.item.mastery();
            if mastery.is_new() {
                (state.item.id().to_string(), srs::initialize_review(now), true)
            } else if correct {
                (
                    state.item.id().to_string(),
                    srs::on_remembered(mastery.first_learn_date, mastery.review_stage),
                    false,
                )
            } else {
                (
                    state.item.id().to_string(),
                    srs::on_forgotten(mastery.first_learn_date),
                    false,
                )
            }
        };

        let write = if first_learn {
            self.store
                .record_first_learn(&item_id, now, update.stage, update.next_review_time, correct)
                .await
        } else if correct {
            self.store
                .record_remembered(&item_id, update.stage, update.next_review_time, now)
                .await
        } else {
            self.store
                .record_forgotten(&item_id, update.stage, update.next_review_time, now)
                .await
        };
        if let Err(err) = write {
            // Optimistic local progress: the store may lag, the session moves on.
            warn!(
                session_id = %self.progress_id,
                item_id = %item_id,
                error = %err,
                "mastery write failed"
            );
        }

        let state = &mut self.states[self.cursor];
        state.attempts += 1;
        state.answered = true;
        state.correct = correct;

        let mastery = state.item.mastery_mut();
        if first_learn {
            mastery.first_learn_date = now;
        }
        mastery.last_review_time = now;
        mastery.review_stage = update.stage;
        mastery.next_review_time = update.next_review_time;
        if correct {
            mastery.correct_count += 1;
        } else {
            mastery.wrong_count += 1;
        }

        if !correct
            && state.item.interaction() == InteractionMode::Choice
            && !self.wrong_items.iter().any(|w| w.id() == item_id)
        {
            let requeued = self.states[self.cursor].item.clone();
            self.wrong_items.push(requeued);
        }

        self.answered_total += 1;
        if correct {
            self.correct_total += 1;
        }

        if let Err(err) = self
            .store
            .update_session_progress(&self.progress_id, self.answered_total, self.correct_total)
            .await
        {
            warn!(
                session_id = %self.progress_id,
                error = %err,
                "progress write failed"
            );
        }

        self.events
            .publish(SessionEvent::AnswerRecorded(AnswerRecordedPayload {
                session_id: self.progress_id.clone(),
                item_id,
                correct,
                completed_count: self.answered_total,
                correct_count: self.correct_total,
                timestamp: Utc::now(),
            }));
    }
}
