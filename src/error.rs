//! Error type shared by every fallible operation of this crate.
use thiserror::Error;

/// Errors raised while loading data, fitting, scoring or (de)serializing
/// weak learners.
#[derive(Debug, Error)]
pub enum BoostError {
    /// The training set cannot be used for fitting
    /// (no examples, no features, bad weights, ...).
    #[error("invalid training set: {reason}")]
    InvalidTrainingSet {
        /// What is wrong with the training set.
        reason: String,
    },

    /// An index given by the caller is out of range.
    #[error("index {index} is out of range (length {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The valid length.
        len: usize,
    },

    /// A serialized payload does not match the expected layout.
    #[error("malformed state at <{tag}>: {reason}")]
    MalformedState {
        /// The tag being read when the failure occurred.
        tag: String,
        /// What went wrong.
        reason: String,
    },

    /// `copy_state_into` was called with a learner of another type.
    #[error("cannot copy the state of {expected} into {found}")]
    TypeMismatch {
        /// The source learner type.
        expected: String,
        /// The target learner type.
        found: String,
    },

    /// The registry has no learner under this name.
    #[error("no weak learner is registered as `{name}`")]
    UnknownLearner {
        /// The requested name.
        name: String,
    },

    /// A parameter is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value is rejected.
        reason: String,
    },

    /// An input file could not be parsed.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 1-indexed line number.
        line: usize,
        /// What could not be parsed.
        reason: String,
    },

    /// Reading an input file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A `polars` conversion failed.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    /// A JSON configuration or cluster file did not parse.
    #[error(transparent)]
    Config(#[from] serde_json::Error),
}


impl BoostError {
    pub(crate) fn invalid_training_set<S: ToString>(reason: S) -> Self {
        Self::InvalidTrainingSet { reason: reason.to_string() }
    }


    pub(crate) fn malformed<T, S>(tag: T, reason: S) -> Self
        where T: ToString,
              S: ToString,
    {
        Self::MalformedState {
            tag: tag.to_string(),
            reason: reason.to_string(),
        }
    }
}


/// Shorthand for `std::result::Result<T, BoostError>`.
pub type Result<T> = std::result::Result<T, BoostError>;
