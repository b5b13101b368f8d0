//! Domain layer for calculator module
//!
//! Contains the RPN evaluator and the service that drives it per call.

pub mod context;
pub mod error;
pub mod evaluator;
pub mod service;
pub mod stream;

pub use context::CallContext;
pub use error::{ErrorKind, EvaluationError, EvaluatorError, StreamError};
pub use evaluator::{Operator, STACK_CAPACITY, StackEvaluator, Token};
pub use service::Service;
pub use stream::{StreamEvaluation, StreamState};
