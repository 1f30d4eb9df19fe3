use serde::{Deserialize, Serialize};

use crate::srs::{FULLY_MASTERED, NOT_LEARNED};

/// Persistent mastery state carried by every study item.
///
/// Counters only grow; `first_learn_date` stays 0 until the item enters the
/// review rotation for the first time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryState {
    pub correct_count: i32,
    pub wrong_count: i32,
    /// Epoch ms of the first-ever learn event; 0 = never learned.
    pub first_learn_date: i64,
    pub last_review_time: i64,
    /// Epoch ms, or `NOT_LEARNED` (0) / `FULLY_MASTERED` (-1).
    pub next_review_time: i64,
    /// 0 = not in rotation, 1..=5 active stages.
    pub review_stage: i32,
}

impl Default for MasteryState {
    fn default() -> Self {
        Self {
            correct_count: 0,
            wrong_count: 0,
            first_learn_date: 0,
            last_review_time: 0,
            next_review_time: NOT_LEARNED,
            review_stage: 0,
        }
    }
}

impl MasteryState {
    pub fn is_new(&self) -> bool {
        self.first_learn_date == 0
    }

    pub fn is_mastered(&self) -> bool {
        self.next_review_time == FULLY_MASTERED
    }
}

/// How the learner interacts with an item during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Four-option multiple choice.
    Choice,
    /// Binary known / unknown judgment.
    Recognition,
}

/// A unit of study. Word and question items are quizzed with a choice set;
/// phrase items use binary recognition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StudyItem {
    Word {
        id: String,
        deck_id: String,
        text: String,
        translation: String,
        phonetic: Option<String>,
        part_of_speech: Option<String>,
        mastery: MasteryState,
    },
    Phrase {
        id: String,
        deck_id: String,
        text: String,
        translation: String,
        mastery: MasteryState,
    },
    Question {
        id: String,
        deck_id: String,
        prompt: String,
        answer: String,
        options: Vec<String>,
        mastery: MasteryState,
    },
}

impl StudyItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Word { id, .. } | Self::Phrase { id, .. } | Self::Question { id, .. } => id,
        }
    }

    pub fn deck_id(&self) -> &str {
        match self {
            Self::Word { deck_id, .. }
            | Self::Phrase { deck_id, .. }
            | Self::Question { deck_id, .. } => deck_id,
        }
    }

    /// Text shown to the learner as the prompt.
    pub fn prompt(&self) -> &str {
        match self {
            Self::Word { text, .. } | Self::Phrase { text, .. } => text,
            Self::Question { prompt, .. } => prompt,
        }
    }

    /// Text of the correct answer (translation for words and phrases).
    pub fn answer_text(&self) -> &str {
        match self {
            Self::Word { translation, .. } | Self::Phrase { translation, .. } => translation,
            Self::Question { answer, .. } => answer,
        }
    }

    pub fn mastery(&self) -> &MasteryState {
        match self {
            Self::Word { mastery, .. }
            | Self::Phrase { mastery, .. }
            | Self::Question { mastery, .. } => mastery,
        }
    }

    pub fn mastery_mut(&mut self) -> &mut MasteryState {
        match self {
            Self::Word { mastery, .. }
            | Self::Phrase { mastery, .. }
            | Self::Question { mastery, .. } => mastery,
        }
    }

    pub fn interaction(&self) -> InteractionMode {
        match self {
            Self::Phrase { .. } => InteractionMode::Recognition,
            Self::Word { .. } | Self::Question { .. } => InteractionMode::Choice,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Self::Word { .. } => "WORD",
            Self::Phrase { .. } => "PHRASE",
            Self::Question { .. } => "QUESTION",
        }
    }
}

/// One candidate answer in a generated choice set. Exactly one option per set
/// carries `correct = true`. Never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub text: String,
    pub phonetic: Option<String>,
    pub part_of_speech: Option<String>,
    pub correct: bool,
}

/// Ephemeral per-item state inside a session. Only the derived mastery fields
/// ever reach the store.
#[derive(Debug, Clone)]
pub struct StudyState {
    pub item: StudyItem,
    pub answered: bool,
    pub correct: bool,
    pub attempts: u32,
}

impl StudyState {
    pub fn new(item: StudyItem) -> Self {
        Self {
            item,
            answered: false,
            correct: false,
            attempts: 0,
        }
    }
}

/// Persisted progress record for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub id: String,
    pub deck_id: String,
    pub planned_count: u32,
    pub completed_count: u32,
    pub correct_count: u32,
    pub started_at: i64,
    pub ended_at: Option<i64>,
}
