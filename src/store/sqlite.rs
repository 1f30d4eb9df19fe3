use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::ItemStore;
use crate::error::StoreError;
use crate::models::{MasteryState, SessionProgress, StudyItem};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "study_items" (
    "id" TEXT PRIMARY KEY,
    "deckId" TEXT NOT NULL,
    "kind" TEXT NOT NULL,
    "text" TEXT NOT NULL,
    "translation" TEXT,
    "phonetic" TEXT,
    "partOfSpeech" TEXT,
    "answer" TEXT,
    "options" TEXT,
    "correctCount" INTEGER NOT NULL DEFAULT 0,
    "wrongCount" INTEGER NOT NULL DEFAULT 0,
    "firstLearnDate" INTEGER NOT NULL DEFAULT 0,
    "lastReviewTime" INTEGER NOT NULL DEFAULT 0,
    "nextReviewTime" INTEGER NOT NULL DEFAULT 0,
    "reviewStage" INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS "idx_study_items_deck" ON "study_items" ("deckId");
CREATE INDEX IF NOT EXISTS "idx_study_items_due" ON "study_items" ("deckId", "nextReviewTime");
CREATE TABLE IF NOT EXISTS "session_progress" (
    "id" TEXT PRIMARY KEY,
    "deckId" TEXT NOT NULL,
    "plannedCount" INTEGER NOT NULL,
    "completedCount" INTEGER NOT NULL DEFAULT 0,
    "correctCount" INTEGER NOT NULL DEFAULT 0,
    "startedAt" INTEGER NOT NULL,
    "endedAt" INTEGER
);
"#;

const ITEM_COLUMNS: &str = r#""id", "deckId", "kind", "text", "translation", "phonetic",
    "partOfSpeech", "answer", "options", "correctCount", "wrongCount",
    "firstLearnDate", "lastReviewTime", "nextReviewTime", "reviewStage""#;

/// SQLite-backed item store. Point reads/writes only; no cross-call
/// transactions.
#[derive(Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    pub async fn connect(db_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        // Single connection so the in-memory database is shared.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Inserts or replaces an item. Host-side maintenance, not part of the
    /// engine contract.
    pub async fn insert_item(&self, item: &StudyItem) -> Result<(), StoreError> {
        let mastery = item.mastery();
        let (text, translation, phonetic, part_of_speech, answer, options) = match item {
            StudyItem::Word {
                text,
                translation,
                phonetic,
                part_of_speech,
                ..
            } => (
                text.as_str(),
                Some(translation.as_str()),
                phonetic.as_deref(),
                part_of_speech.as_deref(),
                None,
                None,
            ),
            StudyItem::Phrase {
                text, translation, ..
            } => (
                text.as_str(),
                Some(translation.as_str()),
                None,
                None,
                None,
                None,
            ),
            StudyItem::Question {
                prompt,
                answer,
                options,
                ..
            } => {
                let encoded = serde_json::to_string(options)
                    .map_err(|e| StoreError::Corrupt(format!("options encode: {e}")))?;
                (
                    prompt.as_str(),
                    None,
                    None,
                    None,
                    Some(answer.as_str()),
                    Some(encoded),
                )
            }
        };

        sqlx::query(
            r#"INSERT OR REPLACE INTO "study_items"
               ("id","deckId","kind","text","translation","phonetic","partOfSpeech","answer","options",
                "correctCount","wrongCount","firstLearnDate","lastReviewTime","nextReviewTime","reviewStage")
               VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)"#,
        )
        .bind(item.id())
        .bind(item.deck_id())
        .bind(item.kind_str())
        .bind(text)
        .bind(translation)
        .bind(phonetic)
        .bind(part_of_speech)
        .bind(answer)
        .bind(options)
        .bind(mastery.correct_count)
        .bind(mastery.wrong_count)
        .bind(mastery.first_learn_date)
        .bind(mastery.last_review_time)
        .bind(mastery.next_review_time)
        .bind(mastery.review_stage)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn count_items(&self, deck_id: &str) -> Result<i64, StoreError> {
        let row = sqlx::query(r#"SELECT COUNT(*) as total FROM "study_items" WHERE "deckId" = ?"#)
            .bind(deck_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total").unwrap_or(0))
    }
}

fn parse_item(row: &SqliteRow) -> Result<StudyItem, StoreError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| StoreError::Corrupt(format!("id: {e}")))?;
    let deck_id: String = row
        .try_get("deckId")
        .map_err(|e| StoreError::Corrupt(format!("deckId: {e}")))?;
    let kind: String = row
        .try_get("kind")
        .map_err(|e| StoreError::Corrupt(format!("kind: {e}")))?;
    let text: String = row.try_get("text").unwrap_or_default();

    let mastery = MasteryState {
        correct_count: row.try_get("correctCount").unwrap_or(0),
        wrong_count: row.try_get("wrongCount").unwrap_or(0),
        first_learn_date: row.try_get("firstLearnDate").unwrap_or(0),
        last_review_time: row.try_get("lastReviewTime").unwrap_or(0),
        next_review_time: row.try_get("nextReviewTime").unwrap_or(0),
        review_stage: row.try_get("reviewStage").unwrap_or(0),
    };

    match kind.as_str() {
        "WORD" => Ok(StudyItem::Word {
            id,
            deck_id,
            text,
            translation: row
                .try_get::<Option<String>, _>("translation")
                .ok()
                .flatten()
                .unwrap_or_default(),
            phonetic: row.try_get::<Option<String>, _>("phonetic").ok().flatten(),
            part_of_speech: row
                .try_get::<Option<String>, _>("partOfSpeech")
                .ok()
                .flatten(),
            mastery,
        }),
        "PHRASE" => Ok(StudyItem::Phrase {
            id,
            deck_id,
            text,
            translation: row
                .try_get::<Option<String>, _>("translation")
                .ok()
                .flatten()
                .unwrap_or_default(),
            mastery,
        }),
        "QUESTION" => {
            let options: Vec<String> = row
                .try_get::<Option<String>, _>("options")
                .ok()
                .flatten()
                .map(|raw| {
                    serde_json::from_str(&raw)
                        .map_err(|e| StoreError::Corrupt(format!("options decode: {e}")))
                })
                .transpose()?
                .unwrap_or_default();
            Ok(StudyItem::Question {
                id,
                deck_id,
                prompt: text,
                answer: row
                    .try_get::<Option<String>, _>("answer")
                    .ok()
                    .flatten()
                    .unwrap_or_default(),
                options,
                mastery,
            })
        }
        other => Err(StoreError::Corrupt(format!("unknown item kind: {other}"))),
    }
}

impl ItemStore for SqliteItemStore {
    async fn find_due_items(
        &self,
        deck_id: &str,
        now: i64,
        limit: u32,
    ) -> Result<Vec<StudyItem>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM "study_items"
               WHERE "deckId" = ? AND "nextReviewTime" > 0 AND "nextReviewTime" <= ?
               ORDER BY "nextReviewTime" ASC LIMIT ?"#
        ))
        .bind(deck_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_item).collect()
    }

    async fn find_random_items(
        &self,
        deck_id: &str,
        exclude_ids: &[String],
        count: u32,
    ) -> Result<Vec<StudyItem>, StoreError> {
        // Over-fetch by the exclusion size and filter client-side; keeps the
        // query static instead of building an IN clause per call.
        let fetch = count as i64 + exclude_ids.len() as i64;
        let rows = sqlx::query(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM "study_items"
               WHERE "deckId" = ? ORDER BY RANDOM() LIMIT ?"#
        ))
        .bind(deck_id)
        .bind(fetch)
        .fetch_all(&self.pool)
        .await?;

        let excluded: HashSet<&str> = exclude_ids.iter().map(String::as_str).collect();
        let mut items = Vec::with_capacity(count as usize);
        for row in rows.iter() {
            let item = parse_item(row)?;
            if excluded.contains(item.id()) {
                continue;
            }
            items.push(item);
            if items.len() == count as usize {
                break;
            }
        }
        Ok(items)
    }

    async fn find_random_items_other_decks(
        &self,
        deck_id: &str,
        count: u32,
    ) -> Result<Vec<StudyItem>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM "study_items"
               WHERE "deckId" != ? ORDER BY RANDOM() LIMIT ?"#
        ))
        .bind(deck_id)
        .bind(count)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(parse_item).collect()
    }

    async fn get_item(&self, id: &str) -> Result<Option<StudyItem>, StoreError> {
        let row = sqlx::query(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM "study_items" WHERE "id" = ?"#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(parse_item(&row)?))
    }

    async fn record_first_learn(
        &self,
        id: &str,
        now: i64,
        stage: i32,
        next_review_time: i64,
        correct: bool,
    ) -> Result<(), StoreError> {
        let (correct_inc, wrong_inc) = if correct { (1, 0) } else { (0, 1) };
        sqlx::query(
            r#"UPDATE "study_items" SET
               "firstLearnDate" = ?, "lastReviewTime" = ?, "reviewStage" = ?,
               "nextReviewTime" = ?,
               "correctCount" = "correctCount" + ?, "wrongCount" = "wrongCount" + ?
               WHERE "id" = ?"#,
        )
        .bind(now)
        .bind(now)
        .bind(stage)
        .bind(next_review_time)
        .bind(correct_inc)
        .bind(wrong_inc)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_remembered(
        &self,
        id: &str,
        stage: i32,
        next_review_time: i64,
        now: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE "study_items" SET
               "reviewStage" = ?, "nextReviewTime" = ?, "lastReviewTime" = ?,
               "correctCount" = "correctCount" + 1
               WHERE "id" = ?"#,
        )
        .bind(stage)
        .bind(next_review_time)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_forgotten(
        &self,
        id: &str,
        stage: i32,
        next_review_time: i64,
        now: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE "study_items" SET
               "reviewStage" = ?, "nextReviewTime" = ?, "lastReviewTime" = ?,
               "wrongCount" = "wrongCount" + 1
               WHERE "id" = ?"#,
        )
        .bind(stage)
        .bind(next_review_time)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_session_progress(
        &self,
        deck_id: &str,
        planned_count: u32,
    ) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();
        sqlx::query(
            r#"INSERT INTO "session_progress"
               ("id","deckId","plannedCount","completedCount","correctCount","startedAt")
               VALUES (?,?,?,0,0,?)"#,
        )
        .bind(&id)
        .bind(deck_id)
        .bind(planned_count)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_session_progress(
        &self,
        session_id: &str,
        completed_count: u32,
        correct_count: u32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"UPDATE "session_progress" SET "completedCount" = ?, "correctCount" = ?
               WHERE "id" = ?"#,
        )
        .bind(completed_count)
        .bind(correct_count)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn complete_session_progress(
        &self,
        session_id: &str,
        end_time: i64,
    ) -> Result<(), StoreError> {
        sqlx::query(r#"UPDATE "session_progress" SET "endedAt" = ? WHERE "id" = ?"#)
            .bind(end_time)
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_session_progress(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionProgress>, StoreError> {
        let row = sqlx::query(
            r#"SELECT "id","deckId","plannedCount","completedCount","correctCount","startedAt","endedAt"
               FROM "session_progress" WHERE "id" = ?"#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        Ok(Some(SessionProgress {
            id: row
                .try_get("id")
                .map_err(|e| StoreError::Corrupt(format!("id: {e}")))?,
            deck_id: row.try_get("deckId").unwrap_or_default(),
            planned_count: row.try_get::<i64, _>("plannedCount").unwrap_or(0) as u32,
            completed_count: row.try_get::<i64, _>("completedCount").unwrap_or(0) as u32,
            correct_count: row.try_get::<i64, _>("correctCount").unwrap_or(0) as u32,
            started_at: row.try_get("startedAt").unwrap_or(0),
            ended_at: row.try_get::<Option<i64>, _>("endedAt").ok().flatten(),
        }))
    }
}
