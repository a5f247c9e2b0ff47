//! Configuration for apigen.
//!
//! Loaded from `apigen.toml` at the project root. Every key is optional;
//! a missing file means the defaults below.
//!
//! Example apigen.toml:
//! ```toml
//! [output]
//! client = "frontend/src/components/ApiService.ts"
//! server_dir = "server/hsutils"
//! openapi = "server/hsutils/openapi/openapi.json"
//!
//! [openapi]
//! title = "Haunted API"
//! version = "0"
//! ```

use apigen_emit::{EmitOptions, OutputFile, Target};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "apigen.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where generated files land, relative to the project root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// The client service module.
    pub client: PathBuf,
    /// Directory receiving every server file.
    pub server_dir: PathBuf,
    /// The interface description document.
    pub openapi: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            client: PathBuf::from("frontend/src/components/ApiService.ts"),
            server_dir: PathBuf::from("server/hsutils"),
            openapi: PathBuf::from("server/hsutils/openapi/openapi.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OpenApiConfig {
    pub title: String,
    pub version: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        let defaults = EmitOptions::default();
        Self {
            title: defaults.title,
            version: defaults.version,
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct ApigenConfig {
    pub output: OutputConfig,
    pub openapi: OpenApiConfig,
}

impl ApigenConfig {
    /// Load configuration for a project.
    ///
    /// `explicit` overrides `<root>/apigen.toml` and must exist; the default
    /// location may be absent.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => root.join(CONFIG_FILE),
        };
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit.is_none() => {
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            title: self.openapi.title.clone(),
            version: self.openapi.version.clone(),
        }
    }

    /// Where one emitted file is written.
    ///
    /// Server files keep their names under `server_dir`. The client and
    /// description targets name their document directly; any further file
    /// from the same emitter lands next to it.
    pub fn destination(&self, root: &Path, target: Target, file: &OutputFile, primary: bool) -> PathBuf {
        let document = match target {
            Target::Server => return root.join(&self.output.server_dir).join(&file.path),
            Target::Client => root.join(&self.output.client),
            Target::Description => root.join(&self.output.openapi),
        };
        if primary {
            return document;
        }
        match document.parent() {
            Some(dir) => dir.join(&file.path),
            None => root.join(&file.path),
        }
    }
}
