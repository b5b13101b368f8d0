//! Conversions between wire messages and domain types.

use calculator_sdk::proto::{self, token};
use calculator_sdk::{EvaluateStreamRequest, Token as WireToken};
use rpn_transport_grpc::extract_timeout;
use tonic::Status;
use tonic::metadata::MetadataMap;

use crate::domain::{
    CallContext, ErrorKind, EvaluationError, EvaluatorError, Operator, StreamError, Token,
};

impl TryFrom<i32> for Operator {
    type Error = EvaluatorError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match proto::Operator::try_from(code) {
            Ok(proto::Operator::Add) => Ok(Self::Add),
            Ok(proto::Operator::Subtract) => Ok(Self::Subtract),
            Ok(proto::Operator::Multiply) => Ok(Self::Multiply),
            Ok(proto::Operator::Divide) => Ok(Self::Divide),
            Err(_) => Err(EvaluatorError::UnsupportedOperator(code)),
        }
    }
}

impl TryFrom<WireToken> for Token {
    type Error = EvaluationError;

    fn try_from(wire: WireToken) -> Result<Self, Self::Error> {
        match wire.token {
            Some(token::Token::Operand(operand)) => Ok(Self::Operand(operand.value)),
            Some(token::Token::Operator(code)) => Ok(Self::Operator(Operator::try_from(code)?)),
            None => Err(EvaluationError::EmptyToken),
        }
    }
}

impl TryFrom<EvaluateStreamRequest> for Token {
    type Error = EvaluationError;

    fn try_from(request: EvaluateStreamRequest) -> Result<Self, Self::Error> {
        request.token.ok_or(EvaluationError::EmptyToken)?.try_into()
    }
}

impl From<EvaluationError> for Status {
    fn from(err: EvaluationError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::ResourceExhausted => Status::resource_exhausted(message),
            ErrorKind::InvalidArgument => Status::invalid_argument(message),
            ErrorKind::Cancelled => Status::cancelled(message),
            ErrorKind::DeadlineExceeded => Status::deadline_exceeded(message),
            ErrorKind::Internal => Status::internal(message),
        }
    }
}

impl From<StreamError<Status>> for Status {
    fn from(err: StreamError<Status>) -> Self {
        match err {
            StreamError::Evaluation(e) => e.into(),
            StreamError::Transport(status) => status,
        }
    }
}

/// Build the domain call context from request metadata.
///
/// # Errors
/// `INVALID_ARGUMENT` when the `grpc-timeout` header is malformed.
pub fn call_context(meta: &MetadataMap) -> Result<CallContext, Status> {
    let ctx = CallContext::new();
    Ok(match extract_timeout(meta)? {
        Some(timeout) => ctx.with_timeout(timeout),
        None => ctx,
    })
}
