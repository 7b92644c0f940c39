use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    IllegalStructure,
    IllegalAttribute,
    EmptyName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

impl ContractError {
    pub fn new(kind: ContractErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ContractError {}

pub fn illegal_structure(message: impl Into<String>) -> ContractError {
    ContractError::new(ContractErrorKind::IllegalStructure, message)
}

pub fn illegal_attribute(message: impl Into<String>) -> ContractError {
    ContractError::new(ContractErrorKind::IllegalAttribute, message)
}

pub fn empty_name(message: impl Into<String>) -> ContractError {
    ContractError::new(ContractErrorKind::EmptyName, message)
}
