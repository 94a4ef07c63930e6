/*!
 * Staleness checks for translated documents.
 *
 * Hash mode compares the SHA-256 of the source with the digest recorded in
 * `<target>.hash` at the last translation. CI checkouts reset modification
 * times, so mtime mode is only reliable on a developer machine.
 */

use anyhow::{Context, Result};
use log::warn;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::app_config::ChangeDetectionMode;
use crate::file_utils::FileManager;

/// Lowercase hex SHA-256 of a file's bytes
pub fn file_hash<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read file for hashing: {:?}", path))?;
    Ok(content_hash(&bytes))
}

/// Lowercase hex SHA-256 of `bytes`
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Decides whether a source needs (re)translation and records the marker
/// that makes the next decision
#[derive(Debug, Clone, Copy)]
pub struct ChangeDetector {
    mode: ChangeDetectionMode,
}

impl ChangeDetector {
    pub fn new(mode: ChangeDetectionMode) -> Self {
        Self { mode }
    }

    /// Whether `source` must be translated again into `target`.
    ///
    /// A missing target is always stale. Errors while checking are logged
    /// and treated as stale.
    pub fn needs_translation<P1: AsRef<Path>, P2: AsRef<Path>>(&self, source: P1, target: P2) -> bool {
        let source = source.as_ref();
        let target = target.as_ref();

        if !target.exists() {
            return true;
        }

        let result = match self.mode {
            ChangeDetectionMode::Hash => Self::hash_changed(source, target),
            ChangeDetectionMode::Mtime => Self::mtime_changed(source, target),
        };

        result.unwrap_or_else(|e| {
            warn!("Error checking {} for {:?}: {:#}", self.mode, source, e);
            true
        })
    }

    fn hash_changed(source: &Path, target: &Path) -> Result<bool> {
        let sidecar = FileManager::sidecar_path(target);
        if !sidecar.exists() {
            return Ok(true);
        }

        let source_hash = file_hash(source)?;
        let stored_hash = fs::read_to_string(&sidecar)
            .with_context(|| format!("Failed to read hash file: {:?}", sidecar))?;

        Ok(source_hash != stored_hash.trim())
    }

    fn mtime_changed(source: &Path, target: &Path) -> Result<bool> {
        let source_mtime = fs::metadata(source)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read mtime: {:?}", source))?;
        let target_mtime = fs::metadata(target)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read mtime: {:?}", target))?;

        Ok(source_mtime > target_mtime)
    }

    /// Record that `target` now holds a translation of `source`.
    ///
    /// Hash mode writes the sidecar file; mtime mode relies on the
    /// translation's own timestamp.
    pub fn record<P1: AsRef<Path>, P2: AsRef<Path>>(&self, source: P1, target: P2) -> Result<()> {
        match self.mode {
            ChangeDetectionMode::Hash => {
                let hash = file_hash(source)?;
                FileManager::write_to_file(FileManager::sidecar_path(target), &hash)
            }
            ChangeDetectionMode::Mtime => Ok(()),
        }
    }
}
