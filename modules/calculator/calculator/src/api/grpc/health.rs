//! Standard `grpc.health.v1.Health` service backed by [`HealthRegistry`].

use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tonic::{Request, Response, Status};

use calculator_sdk::health_proto::health_check_response::ServingStatus as WireStatus;
use calculator_sdk::health_proto::health_server::Health;
use calculator_sdk::health_proto::{HealthCheckRequest, HealthCheckResponse};

use crate::health::{HealthRegistry, ServingStatus};

fn to_wire(status: Option<ServingStatus>) -> WireStatus {
    match status {
        Some(ServingStatus::Serving) => WireStatus::Serving,
        Some(ServingStatus::NotServing) => WireStatus::NotServing,
        None => WireStatus::ServiceUnknown,
    }
}

fn response(status: WireStatus) -> HealthCheckResponse {
    HealthCheckResponse {
        status: status.into(),
    }
}

#[derive(Clone)]
pub struct HealthServiceImpl {
    registry: Arc<HealthRegistry>,
}

impl HealthServiceImpl {
    #[must_use]
    pub fn new(registry: Arc<HealthRegistry>) -> Self {
        Self { registry }
    }
}

#[tonic::async_trait]
impl Health for HealthServiceImpl {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let service = request.into_inner().service;
        match self.registry.status(&service) {
            Some(status) => Ok(Response::new(response(to_wire(Some(status))))),
            None => Err(Status::not_found(format!("unknown service '{service}'"))),
        }
    }

    type WatchStream = Pin<Box<dyn Stream<Item = Result<HealthCheckResponse, Status>> + Send>>;

    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let service = request.into_inner().service;
        tracing::debug!(service, "health watch started");

        // Emits the current status first, then one item per distinct change.
        let mut last = None;
        let updates = WatchStream::new(self.registry.subscribe()).filter_map(move |statuses| {
            let status = to_wire(statuses.get(&service).copied());
            let emit = last != Some(status);
            last = Some(status);
            futures::future::ready(emit.then(|| Ok::<_, Status>(response(status))))
        });

        Ok(Response::new(Box::pin(updates)))
    }
}
