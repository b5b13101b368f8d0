//! gRPC client implementation of `CalculatorClientV1`

use std::time::Duration;

use async_trait::async_trait;
use rpn_transport_grpc::client::{GrpcClientConfig, connect_with_stack};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::Channel;

use crate::api::{CalculatorClientV1, CalculatorError};
use crate::codec::parse_token;
use crate::proto::calculator_client::CalculatorClient;
use crate::proto::{EvaluateBatchRequest, EvaluateStreamRequest};

/// gRPC client for the calculator service.
///
/// Cheap to clone; clones share the underlying HTTP/2 connection.
#[derive(Clone)]
pub struct CalculatorGrpcClient {
    inner: CalculatorClient<Channel>,
    batch_timeout: Option<Duration>,
}

impl CalculatorGrpcClient {
    /// Connect to the calculator service using the default transport configuration.
    ///
    /// # Errors
    /// Returns `CalculatorError::Connect` if the connection cannot be established.
    pub async fn connect(uri: impl Into<String>) -> Result<Self, CalculatorError> {
        Self::connect_with_config(uri, &GrpcClientConfig::new("calculator")).await
    }

    /// Connect to the calculator service with an explicit transport configuration.
    ///
    /// # Errors
    /// Returns `CalculatorError::Connect` if the connection cannot be established.
    pub async fn connect_with_config(
        uri: impl Into<String>,
        cfg: &GrpcClientConfig,
    ) -> Result<Self, CalculatorError> {
        let channel: Channel = connect_with_stack(uri, cfg)
            .await
            .map_err(|e| CalculatorError::Connect(format!("{e:#}")))?;
        Ok(Self::from_channel(channel))
    }

    /// Wrap an already established channel.
    #[must_use]
    pub fn from_channel(channel: Channel) -> Self {
        Self {
            inner: CalculatorClient::new(channel),
            batch_timeout: None,
        }
    }

    /// Attach a deadline to every batch call made through this client.
    #[must_use]
    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl CalculatorClientV1 for CalculatorGrpcClient {
    async fn evaluate_stream(
        &self,
        mut tokens: mpsc::Receiver<String>,
    ) -> Result<f64, CalculatorError> {
        let mut client = self.inner.clone();

        // Single-slot queue: the feeder waits until the transport has taken the previous token.
        let (tx, rx) = mpsc::channel::<EvaluateStreamRequest>(1);

        let call = client.evaluate_stream(ReceiverStream::new(rx));
        tokio::pin!(call);

        let feed = async move {
            while let Some(raw) = tokens.recv().await {
                let token = parse_token(&raw)?;
                if tx
                    .send(EvaluateStreamRequest { token: Some(token) })
                    .await
                    .is_err()
                {
                    // The server already ended the call; its verdict arrives on `call`.
                    break;
                }
            }
            // Dropping `tx` here signals end of input.
            Ok::<(), CalculatorError>(())
        };
        tokio::pin!(feed);

        // A codec failure returns early and drops `call`, which cancels the RPC.
        let response = tokio::select! {
            fed = &mut feed => {
                fed?;
                call.await?
            }
            response = &mut call => response?,
        };

        let result = response.into_inner().result;
        tracing::debug!(result, "streaming evaluation finished");
        Ok(result)
    }

    async fn evaluate_batch(&self, tokens: &[String]) -> Result<f64, CalculatorError> {
        let tokens = tokens
            .iter()
            .map(|raw| parse_token(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let mut request = tonic::Request::new(EvaluateBatchRequest { tokens });
        if let Some(timeout) = self.batch_timeout {
            request.set_timeout(timeout);
        }

        let mut client = self.inner.clone();
        let result = client.evaluate_batch(request).await?.into_inner().result;
        tracing::debug!(result, "batch evaluation finished");
        Ok(result)
    }
}
