//! Registry build errors.
//!
//! All of these are fatal: code generation never starts from a registry that
//! failed to build.

use crate::endpoint::Method;
use apigen_schema::SchemaError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("operation {0} is registered more than once")]
    DuplicateOperation(String),
    #[error("{method} {path} is registered more than once")]
    DuplicateRoute { path: String, method: Method },
    #[error("path {0} has no endpoints")]
    NoEndpoints(String),
    #[error("path name {0} clashes with another path name")]
    DuplicatePathName(String),
    #[error("malformed path {path}: {reason}")]
    MalformedPath { path: String, reason: String },
    #[error("path parameter {param} appears more than once in {path}")]
    DuplicateParam { path: String, param: String },
    #[error("path parameter {param} in {path} clashes with {clashes_with}")]
    ReservedParam {
        path: String,
        param: String,
        clashes_with: &'static str,
    },
    #[error("{name} clashes with {clashes_with}")]
    ReservedName {
        name: String,
        clashes_with: &'static str,
    },
    #[error("{first} and {second} map to the same generated name")]
    NameCollision { first: String, second: String },
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("{operation}: {method} requests cannot carry a body")]
    BodyNotAllowed { operation: String, method: Method },
    #[error("{operation} references unknown type {ty}")]
    UnknownType { operation: String, ty: String },
    #[error("{operation}: {ty} is not a record")]
    NotARecord { operation: String, ty: String },
}
