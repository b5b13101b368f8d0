//! gRPC Server implementation for calculator
//!
//! The server implementation handles gRPC requests and delegates
//! to the domain Service for business logic.

use std::sync::Arc;

use futures::StreamExt;
use tonic::{Code, Request, Response, Status, Streaming};

use calculator_sdk::{
    Calculator, EvaluateBatchRequest, EvaluateBatchResponse, EvaluateStreamRequest,
    EvaluateStreamResponse,
};

use super::mapping::call_context;
use crate::domain::Service;
use crate::metrics::{EvaluationMetrics, Mode};

/// gRPC service implementation that wraps the domain Service.
#[derive(Clone)]
pub struct CalculatorServiceImpl {
    service: Arc<Service>,
    metrics: Arc<EvaluationMetrics>,
}

impl CalculatorServiceImpl {
    /// Create a new calculator service implementation.
    #[must_use]
    pub fn new(service: Arc<Service>, metrics: Arc<EvaluationMetrics>) -> Self {
        Self { service, metrics }
    }

    fn record(&self, mode: Mode, tokens: usize, outcome: &Result<f64, Status>) {
        let code = outcome.as_ref().map_or_else(Status::code, |_| Code::Ok);
        self.metrics.observe(mode, code, tokens);

        let mode = mode.as_str();
        match outcome {
            Ok(result) => tracing::debug!(mode, tokens, result, "evaluation succeeded"),
            Err(status) if matches!(code, Code::InvalidArgument | Code::ResourceExhausted) => {
                tracing::warn!(mode, tokens, ?code, message = status.message(), "expression rejected");
            }
            Err(status)
                if matches!(
                    code,
                    Code::Internal | Code::Unavailable | Code::Unknown | Code::DataLoss
                ) =>
            {
                tracing::error!(mode, tokens, ?code, message = status.message(), "evaluation failed");
            }
            Err(status) => {
                tracing::warn!(mode, tokens, ?code, message = status.message(), "evaluation aborted");
            }
        }
    }
}

#[tonic::async_trait]
impl Calculator for CalculatorServiceImpl {
    async fn evaluate_stream(
        &self,
        request: Request<Streaming<EvaluateStreamRequest>>,
    ) -> Result<Response<EvaluateStreamResponse>, Status> {
        let mut received = 0usize;
        let inbound = request.into_inner().map(|item| {
            received += 1;
            item
        });

        let outcome = self
            .service
            .evaluate_stream(inbound)
            .await
            .map_err(Status::from);
        self.record(Mode::Stream, received, &outcome);

        let result = outcome?;
        Ok(Response::new(EvaluateStreamResponse { result }))
    }

    async fn evaluate_batch(
        &self,
        request: Request<EvaluateBatchRequest>,
    ) -> Result<Response<EvaluateBatchResponse>, Status> {
        let ctx = call_context(request.metadata())?;
        let tokens = request.into_inner().tokens;
        let received = tokens.len();

        let outcome = self
            .service
            .evaluate_batch(&ctx, tokens)
            .map_err(Status::from);
        self.record(Mode::Batch, received, &outcome);

        let result = outcome?;
        Ok(Response::new(EvaluateBatchResponse { result }))
    }
}
