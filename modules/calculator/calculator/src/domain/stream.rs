//! Per-call state of a streaming evaluation.

use std::fmt;

use super::error::EvaluationError;
use super::evaluator::{StackEvaluator, Token};

/// Lifecycle of a streaming evaluation.
///
/// `Receiving` accepts tokens; end of input moves to `Finalizing`, which
/// settles in `Done` or `Failed`. Any rejected token moves straight to
/// `Failed`. Both end states are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamState {
    #[default]
    Receiving,
    Finalizing,
    Done,
    Failed,
}

impl StreamState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Receiving => "receiving",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One streaming call: an evaluator plus the state it is in.
#[derive(Debug, Default)]
pub struct StreamEvaluation {
    evaluator: StackEvaluator,
    state: StreamState,
    accepted: usize,
}

impl StreamEvaluation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Tokens applied successfully so far.
    #[must_use]
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Apply the next token.
    ///
    /// # Errors
    /// The evaluator's error, after which the evaluation is `Failed`;
    /// `StreamTerminated` if the evaluation is no longer receiving.
    pub fn accept(&mut self, token: Token) -> Result<(), EvaluationError> {
        self.ensure_receiving()?;
        match self.evaluator.push(token) {
            Ok(()) => {
                self.accepted += 1;
                Ok(())
            }
            Err(e) => {
                self.state = StreamState::Failed;
                Err(e.into())
            }
        }
    }

    /// Mark the evaluation failed because of `err` and hand the error back.
    pub fn fail(&mut self, err: EvaluationError) -> EvaluationError {
        self.abort();
        err
    }

    /// Mark the evaluation failed without a result, e.g. when the inbound
    /// stream broke. No-op in a terminal state.
    pub fn abort(&mut self) {
        if !self.state.is_terminal() {
            self.state = StreamState::Failed;
        }
    }

    /// End of input: produce the result.
    ///
    /// # Errors
    /// `IncompleteExpression` unless exactly one operand is left;
    /// `StreamTerminated` if the evaluation is no longer receiving.
    pub fn finish(&mut self) -> Result<f64, EvaluationError> {
        self.ensure_receiving()?;
        self.state = StreamState::Finalizing;
        match self.evaluator.result() {
            Ok(value) => {
                self.state = StreamState::Done;
                Ok(value)
            }
            Err(e) => {
                self.state = StreamState::Failed;
                Err(e.into())
            }
        }
    }

    fn ensure_receiving(&self) -> Result<(), EvaluationError> {
        match self.state {
            StreamState::Receiving => Ok(()),
            other => Err(EvaluationError::StreamTerminated(other)),
        }
    }
}
