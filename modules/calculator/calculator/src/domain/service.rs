//! Domain service for calculator
//!
//! Runs streaming and batch evaluations. Every call gets its own evaluator;
//! the service itself holds no per-call state and is shared freely.

use futures::{Stream, StreamExt};
use tracing::debug;

use super::context::CallContext;
use super::error::{EvaluationError, StreamError};
use super::evaluator::{STACK_CAPACITY, StackEvaluator, Token};
use super::stream::StreamEvaluation;

/// Domain service that evaluates RPN expressions.
#[derive(Debug, Clone, Default)]
pub struct Service;

impl Service {
    /// Create a new service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Apply tokens as they arrive and produce the result at end of input.
    ///
    /// Items convert into [`Token`] lazily, so a malformed item fails the
    /// evaluation only when it is reached. The first failure ends the call;
    /// nothing after it is read.
    ///
    /// # Errors
    /// `StreamError::Evaluation` for an expression error,
    /// `StreamError::Transport` when the inbound stream itself fails.
    #[allow(clippy::unused_self)] // Stateless today; callers hold the service behind Arc
    pub async fn evaluate_stream<S, T, E>(&self, mut tokens: S) -> Result<f64, StreamError<E>>
    where
        S: Stream<Item = Result<T, E>> + Unpin,
        T: TryInto<Token>,
        EvaluationError: From<T::Error>,
    {
        let mut evaluation = StreamEvaluation::new();

        while let Some(item) = tokens.next().await {
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    evaluation.abort();
                    debug!(
                        accepted = evaluation.accepted(),
                        "inbound token stream failed"
                    );
                    return Err(StreamError::Transport(e));
                }
            };

            let converted: Result<Token, _> = raw.try_into();
            let token = match converted {
                Ok(token) => token,
                Err(e) => return Err(evaluation.fail(e.into()).into()),
            };
            evaluation.accept(token)?;
        }

        let result = evaluation.finish()?;
        debug!(result, tokens = evaluation.accepted(), "stream evaluated");
        Ok(result)
    }

    /// Evaluate a complete token list.
    ///
    /// The caller context is checked once, before any token is touched.
    ///
    /// # Errors
    /// `Cancelled` or `DeadlineExceeded` from the context, otherwise the
    /// first expression error encountered.
    #[allow(clippy::unused_self)]
    pub fn evaluate_batch<I>(&self, ctx: &CallContext, tokens: I) -> Result<f64, EvaluationError>
    where
        I: IntoIterator,
        I::Item: TryInto<Token>,
        EvaluationError: From<<I::Item as TryInto<Token>>::Error>,
    {
        ctx.check()?;

        let mut evaluator = StackEvaluator::<STACK_CAPACITY>::new();
        for raw in tokens {
            let token: Token = raw.try_into()?;
            evaluator.push(token)?;
        }

        let result = evaluator.result()?;
        debug!(result, "batch evaluated");
        Ok(result)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::float_cmp)]

    use std::convert::Infallible;
    use std::time::Duration;

    use futures::stream;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::domain::error::EvaluatorError;
    use crate::domain::evaluator::Operator;

    fn scenario_a() -> Vec<Token> {
        vec![
            Token::Operand(5.0),
            Token::Operand(8.0),
            Token::Operator(Operator::Add),
        ]
    }

    fn ok_stream(tokens: Vec<Token>) -> impl Stream<Item = Result<Token, Infallible>> + Unpin {
        stream::iter(tokens.into_iter().map(Ok))
    }

    #[test]
    fn batch_evaluates_expression() {
        let service = Service::new();
        let result = service
            .evaluate_batch(&CallContext::new(), scenario_a())
            .unwrap();
        assert_eq!(result, 13.0);
    }

    #[test]
    fn batch_is_idempotent() {
        let service = Service::new();
        let ctx = CallContext::new();
        let first = service.evaluate_batch(&ctx, scenario_a()).unwrap();
        let second = service.evaluate_batch(&ctx, scenario_a()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn batch_rejects_empty_input() {
        let err = Service::new()
            .evaluate_batch(&CallContext::new(), Vec::<Token>::new())
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Evaluator(EvaluatorError::IncompleteExpression { remaining: 0 })
        );
    }

    #[test]
    fn batch_checks_context_before_tokens() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ctx = CallContext::new().with_cancellation(cancel);

        // The expression is invalid, but the context error wins.
        let err = Service::new()
            .evaluate_batch(&ctx, vec![Token::Operator(Operator::Add)])
            .unwrap_err();
        assert_eq!(err, EvaluationError::Cancelled);

        let ctx = CallContext::new().with_timeout(Duration::ZERO);
        let err = Service::new()
            .evaluate_batch(&ctx, scenario_a())
            .unwrap_err();
        assert_eq!(err, EvaluationError::DeadlineExceeded);
    }

    #[test]
    fn batch_stops_at_first_failure() {
        let mut tokens = vec![Token::Operand(1.0); 16];
        tokens.push(Token::Operator(Operator::Add));
        let err = Service::new()
            .evaluate_batch(&CallContext::new(), tokens)
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Evaluator(EvaluatorError::StackFull { max_operands: 15 })
        );
    }

    #[test]
    fn batch_surfaces_conversion_errors() {
        let items: Vec<Result<Token, EvaluationError>> = vec![
            Ok(Token::Operand(1.0)),
            Err(EvaluationError::EmptyToken),
        ];
        let err = Service::new()
            .evaluate_batch(&CallContext::new(), items.into_iter().map(Wrapped))
            .unwrap_err();
        assert_eq!(err, EvaluationError::EmptyToken);
    }

    #[tokio::test]
    async fn stream_evaluates_expression() {
        let result = Service::new()
            .evaluate_stream(ok_stream(scenario_a()))
            .await
            .unwrap();
        assert_eq!(result, 13.0);
    }

    #[tokio::test]
    async fn stream_rejects_early_operator() {
        let tokens = vec![Token::Operand(5.0), Token::Operator(Operator::Add)];
        let err = Service::new()
            .evaluate_stream(ok_stream(tokens))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StreamError::Evaluation(EvaluationError::Evaluator(
                EvaluatorError::InsufficientOperands { available: 1 }
            ))
        ));
    }

    #[tokio::test]
    async fn stream_stops_reading_after_failure() {
        let tokens = vec![
            Token::Operator(Operator::Add),
            Token::Operand(1.0),
            Token::Operand(2.0),
        ];
        let mut inbound = ok_stream(tokens);
        let err = Service::new()
            .evaluate_stream(&mut inbound)
            .await
            .unwrap_err();

        assert!(matches!(err, StreamError::Evaluation(_)));
        assert_eq!(inbound.count().await, 2, "tokens after the failure stay unread");
    }

    #[tokio::test]
    async fn stream_passes_transport_errors_through() {
        let inbound = stream::iter(vec![Ok(Token::Operand(1.0)), Err("connection reset")]);
        let err = Service::new().evaluate_stream(inbound).await.unwrap_err();
        assert!(matches!(err, StreamError::Transport("connection reset")));
    }

    #[tokio::test]
    async fn empty_stream_is_incomplete() {
        let err = Service::new()
            .evaluate_stream(ok_stream(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StreamError::Evaluation(EvaluationError::Evaluator(
                EvaluatorError::IncompleteExpression { remaining: 0 }
            ))
        ));
    }

    /// Item whose conversion into a token may fail.
    struct Wrapped(Result<Token, EvaluationError>);

    impl TryFrom<Wrapped> for Token {
        type Error = EvaluationError;

        fn try_from(value: Wrapped) -> Result<Self, Self::Error> {
            value.0
        }
    }
}
