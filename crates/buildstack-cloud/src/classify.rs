//! Classification of remote validation errors
//!
//! The orchestration service reports "nothing to update" and "stack does
//! not exist" only as human-readable validation messages. Every pattern
//! that depends on that wording lives here, so a wording change on the
//! service side is fixed in one place.

use regex::Regex;
use std::sync::LazyLock;

/// Phrase the service uses when an update would not change anything.
/// Full message: "No updates are to be performed."
const NO_UPDATES_PHRASE: &str = "No updates";

/// Example: "Stack with id demo-web does not exist"
static STACK_NOT_FOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)stack with .*does not exist").expect("valid regex"));

/// Which kind of remote call produced the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    /// create-or-update of a stack
    Submission,
    /// describe of a stack
    Lookup,
}

/// Outcome of classifying a validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedError {
    /// The submitted template matches what is deployed
    NoUpdatesNeeded,
    /// The stack is absent; only reported for lookups
    StackNotFound,
    /// Anything else, surfaced to the operator as-is
    Fatal(String),
}

/// Classify a raw validation message
pub fn classify(raw_message: &str, context: ErrorContext) -> ClassifiedError {
    if raw_message.contains(NO_UPDATES_PHRASE) {
        return ClassifiedError::NoUpdatesNeeded;
    }

    if context == ErrorContext::Lookup && STACK_NOT_FOUND.is_match(raw_message) {
        return ClassifiedError::StackNotFound;
    }

    ClassifiedError::Fatal(raw_message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_updates_in_any_context() {
        for context in [ErrorContext::Submission, ErrorContext::Lookup] {
            assert_eq!(
                classify("No updates are to be performed.", context),
                ClassifiedError::NoUpdatesNeeded
            );
        }
    }

    #[test]
    fn test_stack_not_found_on_lookup() {
        assert_eq!(
            classify("Stack with id demo-web does not exist", ErrorContext::Lookup),
            ClassifiedError::StackNotFound
        );
    }

    #[test]
    fn test_stack_not_found_is_fatal_on_submission() {
        let result = classify(
            "Stack with id demo-web does not exist",
            ErrorContext::Submission,
        );
        assert!(matches!(result, ClassifiedError::Fatal(_)));
    }

    #[test]
    fn test_other_message_is_fatal() {
        assert_eq!(
            classify("Some other validation problem", ErrorContext::Submission),
            ClassifiedError::Fatal("Some other validation problem".to_string())
        );
    }

    #[test]
    fn test_stack_with_needs_both_halves() {
        let result = classify("Stack with id demo-web is in a bad state", ErrorContext::Lookup);
        assert!(matches!(result, ClassifiedError::Fatal(_)));
    }
}
