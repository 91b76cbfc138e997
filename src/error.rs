use thiserror::Error;

use crate::locate::LocateError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("`{text}` is not a well-formed formula: expected {expected} at position {position}")]
    MalformedFormula {
        text: String,
        position: usize,
        expected: String,
    },
    #[error("`{formula}` is not in negation normal form")]
    NotInNegationNormalForm { formula: String },
    #[error("`{text}` is not a propositional constant")]
    InvalidPropCons { text: String },
    #[error("invalid propositional variable `{text}`: {reason}")]
    InvalidPropVar { text: String, reason: String },
    #[error("cannot combine computation strings of length {expected} and {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("`{text}` is not a computation string: {reason}")]
    MalformedComputationString { text: String, reason: String },
    #[error("cannot enumerate traces of {length} steps over {width} variables")]
    TooManyTraces { width: usize, length: usize },
    #[error(transparent)]
    Locate(#[from] LocateError),
}
