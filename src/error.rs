use std::fmt;

/// Configuration-time failures. Collected into a list during `Router::new`
/// rather than raised — a bad regex or a mismatched domain entry should not
/// prevent the rest of the configuration from taking effect.
#[derive(Debug)]
pub enum BuildError {
    RegexCompileError {
        pattern: String,
        cause: regex::Error,
    },
    DomainMismatch {
        expected: String,
        got: String,
    },
    BadVariableNode {
        pattern: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::RegexCompileError { pattern, cause } => {
                write!(f, "regex compile error for pattern {pattern:?}: {cause}")
            }
            BuildError::DomainMismatch { expected, got } => {
                write!(f, "domain mismatch: expected {expected:?}, got {got:?}")
            }
            BuildError::BadVariableNode { pattern } => {
                write!(f, "conflicting variable node while inserting {pattern:?}")
            }
        }
    }
}

impl std::error::Error for BuildError {}
