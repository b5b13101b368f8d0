//! Calculator module definition
//!
//! Owns the domain service and the process-wide health and metrics state,
//! and hands out the gRPC routes and HTTP router built on top of them.

use std::sync::Arc;

use anyhow::{Context, Result};
use tonic::service::{Routes, RoutesBuilder};

use calculator_sdk::health_proto::health_server::HealthServer;
use calculator_sdk::{CalculatorServer, FILE_DESCRIPTOR_SET, SERVICE_NAME};

use crate::api::grpc::{CalculatorServiceImpl, HealthServiceImpl};
use crate::api::rest::status_router;
use crate::domain::Service;
use crate::health::{HealthRegistry, OVERALL, ServingStatus};
use crate::metrics::EvaluationMetrics;

/// Calculator module.
#[derive(Clone)]
pub struct CalculatorModule {
    service: Arc<Service>,
    health: Arc<HealthRegistry>,
    metrics: Arc<EvaluationMetrics>,
}

impl CalculatorModule {
    /// # Errors
    /// Returns an error if the metrics cannot be registered.
    pub fn new() -> Result<Self> {
        tracing::info!("Initializing calculator module");
        Ok(Self {
            service: Arc::new(Service::new()),
            health: Arc::new(HealthRegistry::new()),
            metrics: Arc::new(EvaluationMetrics::new()?),
        })
    }

    #[must_use]
    pub fn health(&self) -> Arc<HealthRegistry> {
        self.health.clone()
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<EvaluationMetrics> {
        self.metrics.clone()
    }

    /// gRPC routes: the calculator service, `grpc.health.v1.Health` and
    /// server reflection.
    ///
    /// # Errors
    /// Returns an error if the embedded descriptor set cannot be decoded.
    pub fn grpc_routes(&self) -> Result<Routes> {
        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()
            .context("failed to build reflection service")?;

        let mut routes = RoutesBuilder::default();
        routes.add_service(CalculatorServer::new(CalculatorServiceImpl::new(
            self.service.clone(),
            self.metrics.clone(),
        )));
        routes.add_service(HealthServer::new(HealthServiceImpl::new(
            self.health.clone(),
        )));
        routes.add_service(reflection);
        Ok(routes.routes())
    }

    /// HTTP router for `/status` and `/metrics`.
    #[must_use]
    pub fn status_router(&self) -> axum::Router {
        status_router(self.health.clone(), self.metrics.clone())
    }

    /// Report the server and the calculator service as serving.
    pub fn mark_serving(&self) {
        self.health.set_status(OVERALL, ServingStatus::Serving);
        self.health.set_status(SERVICE_NAME, ServingStatus::Serving);
    }

    /// Report everything as not serving, e.g. once shutdown begins.
    pub fn mark_not_serving(&self) {
        self.health.set_all(ServingStatus::NotServing);
    }
}
