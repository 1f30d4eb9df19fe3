//! Session change notifications.
//!
//! Sessions publish their lifecycle through an explicit broadcast channel so
//! observers (UI surfaces, progress widgets) subscribe to exactly one session
//! instead of watching global mutable state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SessionEvent {
    #[serde(rename = "ANSWER_RECORDED")]
    AnswerRecorded(AnswerRecordedPayload),

    #[serde(rename = "PHASE_CHANGED")]
    PhaseChanged(PhaseChangedPayload),

    #[serde(rename = "SESSION_ENDED")]
    Ended(SessionEndedPayload),
}

impl SessionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::AnswerRecorded(_) => "ANSWER_RECORDED",
            SessionEvent::PhaseChanged(_) => "PHASE_CHANGED",
            SessionEvent::Ended(_) => "SESSION_ENDED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecordedPayload {
    pub session_id: String,
    pub item_id: String,
    pub correct: bool,
    pub completed_count: u32,
    pub correct_count: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseChangedPayload {
    pub session_id: String,
    pub phase: String,
    pub item_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndedPayload {
    pub session_id: String,
    pub completed_count: u32,
    pub correct_count: u32,
    pub timestamp: DateTime<Utc>,
}

/// Per-session broadcast handle. Lagging receivers drop the oldest events.
#[derive(Debug)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        let event_type = event.event_type();
        if self.sender.send(event).is_err() {
            debug!(event_type, "no subscribers for session event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
