#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Calculator Module
//!
//! Evaluates Reverse Polish Notation expressions over gRPC, either token by
//! token on a client stream or as a single batch.
//!
//! ## Architecture
//!
//! - `domain/` - evaluator, per-call stream state machine, service
//! - `api/grpc/` - calculator and health gRPC services
//! - `api/rest/` - `/status` and `/metrics`
//! - `health.rs`, `metrics.rs` - shared process state behind those endpoints
//! - `module.rs` - wiring of all of the above
//!
//! Clients should use the `calculator-sdk` crate.

// === MODULE DEFINITION ===
mod module;
pub use module::CalculatorModule;

// === INTERNAL MODULES ===
pub mod api;
pub mod domain;
pub mod health;
pub mod metrics;
