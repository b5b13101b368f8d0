//! Calculator SDK
//!
//! This crate provides everything needed to talk to the calculator service:
//! - API trait (`CalculatorClientV1`)
//! - Error types (`CalculatorError`, `CodecError`)
//! - Token codec (`parse_token`)
//! - gRPC client (`CalculatorGrpcClient`)
//! - Proto stubs for server implementation
//!
//! ## Usage
//!
//! ```ignore
//! use calculator_sdk::{CalculatorClientV1, CalculatorGrpcClient};
//!
//! let client = CalculatorGrpcClient::connect("http://localhost:8080").await?;
//! let result = client.evaluate_batch(&["5".into(), "8".into(), "+".into()]).await?;
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
pub use api::{CalculatorClientV1, CalculatorError};

// === TOKEN CODEC ===
mod codec;
pub use codec::{CodecError, parse_token};

// === GRPC CLIENT ===
mod client;
pub use client::CalculatorGrpcClient;

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for the Calculator service
pub mod proto {
    #![allow(clippy::pedantic)]
    tonic::include_proto!("calculator.v1");
}

/// Generated protobuf types for the standard gRPC health service
pub mod health_proto {
    #![allow(clippy::pedantic)]
    tonic::include_proto!("grpc.health.v1");
}

// Re-export proto types needed by server
pub use proto::calculator_server::{Calculator, CalculatorServer};
pub use proto::{
    EvaluateBatchRequest, EvaluateBatchResponse, EvaluateStreamRequest, EvaluateStreamResponse,
    Operand, Operator, Token,
};

/// Encoded descriptors of every proto in this crate, for server reflection
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("calculator_descriptor");

/// Fully qualified gRPC service name of the calculator
pub const SERVICE_NAME: &str = "calculator.v1.Calculator";
