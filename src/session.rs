use serde::Serialize;

/// Lifecycle shared by every game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Complete,
}

impl SessionStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, SessionStatus::Complete)
    }
}

/// Options a caller can pass when starting any session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub seed: Option<u64>,
    /// Total options per quiz question, correct one included
    pub quiz_options: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            quiz_options: 4,
        }
    }
}
