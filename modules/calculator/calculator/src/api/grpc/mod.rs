//! gRPC API layer for calculator module

mod health;
mod mapping;
mod server;

pub use health::HealthServiceImpl;
pub use mapping::call_context;
pub use server::CalculatorServiceImpl;
