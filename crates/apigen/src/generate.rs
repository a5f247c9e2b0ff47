//! Writing generated files to disk.

use crate::config::ApigenConfig;
use apigen_emit::{EmitError, emit_all};
use apigen_registry::Registry;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether generated files are written or only compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Write,
    Check,
}

/// What a generation run did to each destination.
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Files written this run.
    pub written: Vec<PathBuf>,
    /// Files already up to date.
    pub unchanged: Vec<PathBuf>,
    /// Files missing or out of date (check mode only).
    pub stale: Vec<PathBuf>,
}

impl GenerateReport {
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty()
    }
}

fn is_current(path: &Path, contents: &str) -> bool {
    std::fs::read_to_string(path).is_ok_and(|existing| existing == contents)
}

/// Run every emitter and write (or compare) its output under `root`.
pub fn generate(
    registry: &Registry,
    config: &ApigenConfig,
    root: &Path,
    mode: Mode,
) -> Result<GenerateReport, GenerateError> {
    let mut report = GenerateReport::default();

    for (emitter, files) in emit_all(registry, &config.emit_options())? {
        debug!(emitter = emitter.name(), files = files.len(), "emitted");
        for (i, file) in files.iter().enumerate() {
            let path = config.destination(root, emitter.target(), file, i == 0);
            if is_current(&path, &file.contents) {
                debug!(path = %path.display(), "unchanged");
                report.unchanged.push(path);
                continue;
            }
            match mode {
                Mode::Check => {
                    warn!(path = %path.display(), "out of date");
                    report.stale.push(path);
                }
                Mode::Write => {
                    if let Some(dir) = path.parent() {
                        std::fs::create_dir_all(dir).map_err(|source| GenerateError::Write {
                            path: dir.to_path_buf(),
                            source,
                        })?;
                    }
                    std::fs::write(&path, &file.contents).map_err(|source| GenerateError::Write {
                        path: path.clone(),
                        source,
                    })?;
                    info!(path = %path.display(), emitter = emitter.name(), "wrote");
                    report.written.push(path);
                }
            }
        }
    }

    Ok(report)
}
