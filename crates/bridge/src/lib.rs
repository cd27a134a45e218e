//! `mandi-bridge`
//!
//! **Responsibility:** boundary between the serving process and the external
//! prediction engine.
//!
//! The engine is an independently versioned executable. Every call spawns one
//! subprocess, writes the JSON request to its stdin, and decodes the **last
//! non-empty line** of its stdout as the result. Anything the engine prints
//! before that line (progress, warnings) is tolerated; stderr is diagnostic only.
//!
//! This crate does not interpret predictions. It guarantees a bounded runtime,
//! a reaped child, and a classified failure.

pub mod config;
pub mod process;
pub mod request;
pub mod result;

pub use config::BridgeConfig;
pub use process::ProcessBridge;
pub use request::{DemandForecastRequest, ModelRequest, PricingRequest};
pub use result::{BridgeError, BridgeResult, DemandForecast, PricingRecommendations};
