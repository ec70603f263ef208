//! Library crate for port-scan-rs exposing reusable modules.
pub mod aggregate;
pub mod config;
pub mod gate;
pub mod limits;
pub mod logging;
pub mod ports;
pub mod probe;
pub mod report;
pub mod scanner;
pub mod types;
