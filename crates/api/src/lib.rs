//! HTTP API: a thin caller of the identity cache and the forecasting service.

pub mod app;
pub mod middleware;
