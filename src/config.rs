/// Engine tunables, read from the environment with sensible defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target working-set size for a study session.
    pub session_target_count: u32,
    /// Options per generated choice set (1 correct + distractors).
    pub choice_count: usize,
    pub log_level: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let session_target_count = std::env::var("SESSION_TARGET_COUNT")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|count| *count > 0)
            .unwrap_or(10);

        let choice_count = std::env::var("CHOICE_COUNT")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|count| *count >= 2)
            .unwrap_or(4);

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            session_target_count,
            choice_count,
            log_level,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_target_count: 10,
            choice_count: 4,
            log_level: "info".to_string(),
        }
    }
}
