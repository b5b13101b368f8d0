//! Domain error types for calculator
//!
//! The evaluator reports [`EvaluatorError`]; everything that can go wrong
//! while running a whole evaluation is an [`EvaluationError`]. Transport
//! layers classify errors through [`ErrorKind`] and never inspect messages.

use std::convert::Infallible;

use super::stream::StreamState;

/// Broad classification used to pick a wire status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The stack ran out of room.
    ResourceExhausted,
    /// The caller sent something that cannot form a valid expression.
    InvalidArgument,
    /// The caller gave up before evaluation started.
    Cancelled,
    /// The caller's deadline passed before evaluation started.
    DeadlineExceeded,
    /// The server misused its own state.
    Internal,
}

/// Failure of a single evaluator operation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorError {
    #[error("stack full: at most {max_operands} operands may be resident")]
    StackFull { max_operands: usize },

    #[error("not enough operands: operator needs 2, stack holds {available}")]
    InsufficientOperands { available: usize },

    #[error("unimplemented operator: {0}")]
    UnsupportedOperator(i32),

    #[error("incomplete expression: {remaining} operands left in stack, expected exactly 1")]
    IncompleteExpression { remaining: usize },
}

impl EvaluatorError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StackFull { .. } => ErrorKind::ResourceExhausted,
            Self::InsufficientOperands { .. }
            | Self::UnsupportedOperator(_)
            | Self::IncompleteExpression { .. } => ErrorKind::InvalidArgument,
        }
    }
}

/// Failure of a whole streaming or batch evaluation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    #[error("token carries neither an operand nor an operator")]
    EmptyToken,

    #[error("call cancelled before evaluation started")]
    Cancelled,

    #[error("deadline exceeded before evaluation started")]
    DeadlineExceeded,

    #[error("stream evaluation is already {0}")]
    StreamTerminated(StreamState),
}

impl EvaluationError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Evaluator(e) => e.kind(),
            Self::EmptyToken => ErrorKind::InvalidArgument,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Self::StreamTerminated(_) => ErrorKind::Internal,
        }
    }
}

impl From<Infallible> for EvaluationError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Failure of a streaming evaluation.
///
/// `Transport` carries the inbound stream's own error untouched so the
/// caller can hand it back to its peer as is.
#[derive(thiserror::Error, Debug)]
pub enum StreamError<E> {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("failed to receive token: {0}")]
    Transport(E),
}
