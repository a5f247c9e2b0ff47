//! Endpoint registry for API code generation.
//!
//! Paths are declared with typed placeholders, each path carries one
//! [`Endpoint`] per HTTP method, and [`RegistryBuilder::build`] enforces the
//! registry-wide rules before any code is generated:
//!
//! - operation names are unique across the registry
//! - (path, method) pairs are unique
//! - placeholders are well formed and their names are distinct
//! - no identifier is a keyword of a target language or shadows a name the
//!   generated code uses
//! - body and response types name records in the schema
//!
//! ```
//! use apigen_registry::{Endpoint, RegistryBuilder};
//! use apigen_schema::{Field, Schema};
//!
//! let mut schema = Schema::new();
//! schema.record("SuccessResponse", vec![("success", Field::boolean())]);
//!
//! let mut builder = RegistryBuilder::new(schema);
//! builder
//!     .register("/api/v0/sessions/<str:sessionId>", "session")
//!     .delete(Endpoint::new("deleteSession", "SuccessResponse"));
//! let registry = builder.build().unwrap();
//! assert_eq!(registry.routes()[0].path.params()[0].name, "sessionId");
//! ```

pub mod endpoint;
pub mod error;
mod names;
pub mod path;
pub mod registry;

pub use endpoint::{Body, Endpoint, Method, Response};
pub use error::RegistryError;
pub use path::{ApiPath, ParamType, PathParam, extract_params};
pub use registry::{Registry, RegistryBuilder, Route, RouteBuilder};
