use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// The selector produced zero items; no session is created.
    #[error("no study items available in deck {deck_id}")]
    EmptyWorkingSet { deck_id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}
