//! HTTP API: configuration, routing, bearer authentication and error mapping.

pub mod app;
pub mod config;
pub mod middleware;
