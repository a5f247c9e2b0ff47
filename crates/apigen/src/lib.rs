//! The Haunted API code generator.
//!
//! [`api::haunted_registry`] declares every shared type and route;
//! [`generate::generate`] runs the emitters over it and writes the server,
//! client and OpenAPI outputs where [`config::ApigenConfig`] says.

pub mod api;
pub mod config;
pub mod generate;

pub use config::{ApigenConfig, ConfigError};
pub use generate::{GenerateError, GenerateReport, Mode, generate};
