use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningErrorKind {
    InvalidAnchor,
    BrokenInvariant,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanningError {
    pub kind: PlanningErrorKind,
    pub message: String,
}

impl PlanningError {
    pub fn new(kind: PlanningErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PlanningError {}

pub fn invalid_anchor(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::InvalidAnchor, message)
}

pub fn broken_invariant(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::BrokenInvariant, message)
}

pub fn cancelled(message: impl Into<String>) -> PlanningError {
    PlanningError::new(PlanningErrorKind::Cancelled, message)
}
