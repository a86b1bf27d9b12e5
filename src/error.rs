//! Error types shared across parsing, building and evaluation.
//!
//! Only [`ParseError::Io`] is fatal to a batch. Every other variant is
//! scoped to a single line, definition or rule and is reported alongside
//! the results for the rest of the batch.

/// Failure to turn one input line into a [`RuleDefinition`](crate::parse::RuleDefinition).
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Line has fewer than three `:`-separated fields.
    #[error("line {line}: expected at least 3 ':'-separated fields, found {found}")]
    TooFewFields { line: usize, found: usize },

    /// Namespace or rule name is blank after trimming.
    #[error("line {line}: {field} must not be empty")]
    EmptyField { line: usize, field: &'static str },

    /// Line bytes are not valid UTF-8.
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 { line: usize },

    /// The input stream itself could not be read.
    #[error("failed to read rule text: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Whether this failure invalidates the whole batch rather than one line.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParseError::Io(_))
    }
}

/// No registered builder accepted a well-formed definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("line {line}: no rule builder accepts '{definition}'")]
    NoBuilder { line: usize, definition: String },
}

/// An attribute could not produce its current value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("{name} is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// An evaluator accepted an expression but could not decide it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("value '{value}' of {attribute} is not numeric")]
    NotNumeric { attribute: String, value: String },

    #[error(transparent)]
    Attribute(#[from] AttributeError),
}

/// Top-level error type for callers that want a single error to propagate.
#[derive(Debug, thiserror::Error)]
pub enum MuppetError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_is_the_only_fatal_parse_error() {
        let io = ParseError::Io(std::io::Error::other("boom"));
        assert!(io.is_fatal());
        assert!(!ParseError::TooFewFields { line: 1, found: 2 }.is_fatal());
        assert!(!ParseError::InvalidUtf8 { line: 2 }.is_fatal());
        assert!(
            !ParseError::EmptyField {
                line: 1,
                field: "namespace"
            }
            .is_fatal()
        );
    }

    #[test]
    fn messages_name_the_line() {
        let e = ParseError::TooFewFields { line: 7, found: 2 };
        assert_eq!(
            e.to_string(),
            "line 7: expected at least 3 ':'-separated fields, found 2"
        );
        let b = BuildError::NoBuilder {
            line: 3,
            definition: "test:constant:5".into(),
        };
        assert_eq!(b.to_string(), "line 3: no rule builder accepts 'test:constant:5'");
    }

    #[test]
    fn attribute_error_is_transparent() {
        let e: EvaluationError = AttributeError::Unavailable {
            name: "HOME".into(),
            reason: "not set".into(),
        }
        .into();
        assert_eq!(e.to_string(), "HOME is unavailable: not set");
    }
}
