//! Branch identifier value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 64;

/// Canonical branch identifier: trimmed, lowercased, non-empty.
///
/// Calendar settings and appointments key on this, so two spellings of the
/// same branch must normalize to one value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BranchNameError {
    #[error("branch name must not be empty")]
    Empty,
    #[error("branch name exceeds {MAX_LEN} characters")]
    TooLong,
}

impl BranchName {
    pub fn new(value: impl Into<String>) -> Result<Self, BranchNameError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() {
            return Err(BranchNameError::Empty);
        }
        if value.len() > MAX_LEN {
            return Err(BranchNameError::TooLong);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = BranchNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let b = BranchName::new("  Main Street ").unwrap();
        assert_eq!(b.as_str(), "main street");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(BranchName::new("   "), Err(BranchNameError::Empty));
    }

    #[test]
    fn rejects_overlong() {
        assert_eq!(BranchName::new("x".repeat(65)), Err(BranchNameError::TooLong));
    }
}
