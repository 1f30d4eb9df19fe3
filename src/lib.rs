pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod srs;
pub mod store;

pub use config::EngineConfig;
pub use engine::choices::{build_choices, CHOICE_COUNT};
pub use engine::practice::PracticeSession;
pub use engine::selector::build_working_set;
pub use engine::session::{Phase, SessionKind, StudySession};
pub use error::{EngineError, StoreError};
pub use events::{SessionEvent, SessionEvents};
pub use models::{
    ChoiceOption, InteractionMode, MasteryState, SessionProgress, StudyItem, StudyState,
};
pub use store::{ItemStore, SqliteItemStore};
