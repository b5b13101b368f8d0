//! Caller context consulted before evaluation starts.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::error::EvaluationError;

/// Cancellation and deadline of the call that owns an evaluation.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now. A timeout too large to represent means
    /// no deadline.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Ok while the caller is still waiting for an answer.
    ///
    /// # Errors
    /// `Cancelled` once the token fires, `DeadlineExceeded` once the
    /// deadline has passed. Cancellation wins when both hold.
    pub fn check(&self) -> Result<(), EvaluationError> {
        if self.cancel.is_cancelled() {
            return Err(EvaluationError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(EvaluationError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn fresh_context_is_live() {
        assert!(CallContext::new().check().is_ok());
    }

    #[test]
    fn cancelled_context_reports_cancelled() {
        let cancel = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(cancel.clone());
        cancel.cancel();
        assert_eq!(ctx.check().unwrap_err(), EvaluationError::Cancelled);
    }

    #[test]
    fn zero_timeout_is_already_expired() {
        let ctx = CallContext::new().with_timeout(Duration::ZERO);
        assert_eq!(ctx.check().unwrap_err(), EvaluationError::DeadlineExceeded);
    }

    #[test]
    fn generous_timeout_is_live() {
        let ctx = CallContext::new().with_timeout(Duration::from_secs(60));
        assert!(ctx.deadline().is_some());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn unrepresentable_timeout_means_no_deadline() {
        let ctx = CallContext::new().with_timeout(Duration::MAX);
        assert!(ctx.deadline().is_none());
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn cancellation_wins_over_deadline() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = CallContext::new()
            .with_cancellation(cancel)
            .with_timeout(Duration::ZERO);
        assert_eq!(ctx.check().unwrap_err(), EvaluationError::Cancelled);
    }
}
