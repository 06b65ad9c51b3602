//! Error types for building and evaluating specifications.

use thiserror::Error;

/// Errors raised while building or evaluating a specification.
///
/// Every variant is a contract violation detected eagerly, before any query
/// is composed. None of them are transient.
#[derive(Debug, Error)]
pub enum SpecificationError {
    /// A required argument was absent or empty.
    #[error("required argument `{0}` was not provided")]
    ArgumentNull(&'static str),

    /// More than one primary ordering (order_by / order_by_descending) was declared.
    #[error(
        "a specification may start only one ordering chain; \
         use then_by / then_by_descending for additional keys"
    )]
    DuplicateOrderChain,

    /// Skip was set more than once.
    #[error("skip is already set on this specification")]
    DuplicateSkip,

    /// Take was set more than once.
    #[error("take is already set on this specification")]
    DuplicateTake,

    /// A projecting evaluation was requested but no selector is configured.
    #[error("the specification has no selector; projection is impossible")]
    SelectorNotFound,

    /// A feature has no meaning for the chosen evaluation backend.
    #[error("{feature} is not supported by the in-memory evaluator")]
    NotSupported { feature: &'static str },

    /// An argument had an out-of-range or otherwise unusable value.
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    /// A search or regex pattern failed to compile.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Operator is not valid for the given value type.
    #[error("operator '{op}' is not valid for {value_type} values")]
    InvalidOperatorForType {
        op: &'static str,
        value_type: &'static str,
    },

    /// Evaluator configuration could not be parsed.
    #[error("invalid evaluator configuration: {0}")]
    Config(String),
}

impl SpecificationError {
    pub(crate) fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        SpecificationError::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}

/// Result type for specification operations.
pub type Result<T> = std::result::Result<T, SpecificationError>;
