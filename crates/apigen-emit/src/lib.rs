//! Code emitters for a built API registry.
//!
//! Every emitter reads the same [`Registry`](apigen_registry::Registry) and
//! walks the same resolved type set, so the server, client and description
//! outputs always agree on which types exist. Field rules are lowered once
//! into [`rules::Plan`]s that the server and client both render.
//!
//! # Architecture
//!
//! ```text
//! Registry ──> ResolvedTypes ──┬─> rules::Plan ──┬─> Django (schemas/*.py, viewmodels.py)
//!                              │                 └─> TypeScript (ApiService.ts)
//!                              └──────────────────> OpenAPI (openapi.json)
//! ```
//!
//! # Example
//!
//! ```
//! use apigen_emit::{EmitOptions, get_emitter};
//! use apigen_registry::{Endpoint, RegistryBuilder};
//! use apigen_schema::{Field, Schema};
//!
//! let mut schema = Schema::new();
//! schema.record("SuccessResponse", vec![("success", Field::boolean())]);
//! let mut builder = RegistryBuilder::new(schema);
//! builder
//!     .register("/api/v0/ping", "ping")
//!     .get(Endpoint::new("ping", "SuccessResponse"));
//! let registry = builder.build().unwrap();
//!
//! let client = get_emitter("typescript").unwrap();
//! let files = client.emit(&registry, &EmitOptions::default()).unwrap();
//! assert!(files[0].contents.contains("export async function ping(): Promise<ISuccessResponse>"));
//! ```
//!
//! # Feature Flags
//!
//! - `emitter-django` - Django dispatchers and dataclass validators
//! - `emitter-typescript` - TypeScript service module
//! - `emitter-openapi` - OpenAPI 3.0 description

mod literal;
pub mod registry;
pub mod rules;
pub mod traits;

#[cfg(feature = "emitter-typescript")]
pub mod client;
#[cfg(feature = "emitter-openapi")]
pub mod openapi;
#[cfg(feature = "emitter-django")]
pub mod server;

pub use registry::{emitter_names, emitters, emitters_for_target, get_emitter};
pub use rules::{Check, Plan, TypePlan, Violation, validate};
pub use traits::{EmitError, EmitOptions, Emitter, OutputFile, Target};

#[cfg(feature = "emitter-typescript")]
pub use client::TypeScriptEmitter;
#[cfg(feature = "emitter-openapi")]
pub use openapi::OpenApiEmitter;
#[cfg(feature = "emitter-django")]
pub use server::DjangoEmitter;

/// Run every emitter against one registry.
///
/// Fails on the first emitter error; nothing is returned for a partial run.
pub fn emit_all(
    registry: &apigen_registry::Registry,
    options: &EmitOptions,
) -> Result<Vec<(&'static dyn Emitter, Vec<OutputFile>)>, EmitError> {
    emitters()
        .into_iter()
        .map(|emitter| Ok((emitter, emitter.emit(registry, options)?)))
        .collect()
}
