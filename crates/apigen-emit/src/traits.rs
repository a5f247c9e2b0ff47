//! Traits for code generation emitters.

use apigen_registry::Registry;
use std::path::PathBuf;

/// Which consumer an emitter writes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Request dispatch and validation for the web server.
    Server,
    /// Typed call stubs for the browser client.
    Client,
    /// A machine-readable interface description.
    Description,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Server => "server",
            Target::Client => "client",
            Target::Description => "description",
        }
    }
}

/// Settings that change emitted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub title: String,
    pub version: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            title: "Haunted API".to_string(),
            version: "0".to_string(),
        }
    }
}

/// One generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// Relative to the target's output location.
    pub path: PathBuf,
    pub contents: String,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A code generation emitter.
///
/// Emitters read a built [`Registry`] and never mutate it, so they can run
/// in any order and produce the same documents.
pub trait Emitter: Send + Sync {
    /// Unique emitter identifier (e.g., "django", "typescript", "openapi").
    fn name(&self) -> &'static str;

    /// Target language or format (e.g., "python", "typescript", "json").
    fn language(&self) -> &'static str;

    fn target(&self) -> Target;

    /// Generate every document for this target.
    fn emit(&self, registry: &Registry, options: &EmitOptions) -> Result<Vec<OutputFile>, EmitError>;
}
