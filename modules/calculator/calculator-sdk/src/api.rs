//! Calculator API trait and types
//!
//! Contract trait and types for the calculator service.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::codec::CodecError;

/// Calculator API trait
///
/// Both methods accept free-form textual tokens; they are converted with
/// [`crate::parse_token`] before anything crosses the wire.
#[async_trait]
pub trait CalculatorClientV1: Send + Sync {
    /// Stream tokens as they arrive on `tokens` and return the result once
    /// the sender side is closed.
    async fn evaluate_stream(&self, tokens: mpsc::Receiver<String>)
    -> Result<f64, CalculatorError>;

    /// Evaluate a complete token list in one call.
    async fn evaluate_batch(&self, tokens: &[String]) -> Result<f64, CalculatorError>;
}

/// Error type for Calculator operations
#[derive(thiserror::Error, Debug)]
pub enum CalculatorError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("stack capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("gRPC call failed: {0}")]
    Rpc(tonic::Status),

    #[error("connection failed: {0}")]
    Connect(String),
}

impl CalculatorError {
    /// gRPC status code reported by the server, if the call reached it.
    #[must_use]
    pub fn code(&self) -> Option<tonic::Code> {
        match self {
            Self::InvalidExpression(_) => Some(tonic::Code::InvalidArgument),
            Self::CapacityExceeded(_) => Some(tonic::Code::ResourceExhausted),
            Self::Rpc(status) => Some(status.code()),
            Self::Codec(_) | Self::Connect(_) => None,
        }
    }
}

impl From<tonic::Status> for CalculatorError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::InvalidArgument => Self::InvalidExpression(status.message().to_owned()),
            tonic::Code::ResourceExhausted => Self::CapacityExceeded(status.message().to_owned()),
            _ => Self::Rpc(status),
        }
    }
}
