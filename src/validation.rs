use thiserror::Error;

/// Rejected input. No state is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a {0}")]
    MissingField(&'static str),
    #[error("Please write something or select a mood")]
    EmptyJournalEntry,
}

/// Check that a required text field has content once trimmed
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_whitespace() {
        assert_eq!(
            require("task title", "   "),
            Err(ValidationError::MissingField("task title"))
        );
        assert!(require("task title", " Read ").is_ok());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::MissingField("task title").to_string(),
            "Please enter a task title"
        );
        assert_eq!(
            ValidationError::EmptyJournalEntry.to_string(),
            "Please write something or select a mood"
        );
    }
}
