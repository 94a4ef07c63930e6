use anyhow::{Result, Context};
use log::warn;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::app_config::Mapping;

// @module: File and directory utilities

/// Extension of the sidecar file holding the source digest
pub const SIDECAR_EXTENSION: &str = "hash";

/// One source document and the path its translation is written to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub source: PathBuf,
    pub target: PathBuf,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Recursively find markdown files under `dir`, sorted by path.
    ///
    /// Hidden files and directories are skipped. Entries that cannot be read,
    /// such as dangling symlinks, are logged and skipped.
    pub fn find_markdown_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        let walker = WalkDir::new(dir.as_ref())
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !Self::is_hidden(e.file_name()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();

            if path.is_file() && Self::is_markdown(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    fn is_hidden(name: &OsStr) -> bool {
        name.to_string_lossy().starts_with('.')
    }

    // @checks: `.md` extension, case-insensitive
    pub fn is_markdown<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("md"))
    }

    /// Path under `target_root` mirroring `file`'s position under `source_root`
    pub fn mirror_path<P1, P2, P3>(source_root: P1, file: P2, target_root: P3) -> Result<PathBuf>
    where
        P1: AsRef<Path>,
        P2: AsRef<Path>,
        P3: AsRef<Path>,
    {
        let relative = file.as_ref()
            .strip_prefix(source_root.as_ref())
            .with_context(|| format!(
                "{:?} is not inside {:?}", file.as_ref(), source_root.as_ref()
            ))?;
        Ok(target_root.as_ref().join(relative))
    }

    /// `<target>.hash`, next to the translation
    pub fn sidecar_path<P: AsRef<Path>>(target: P) -> PathBuf {
        let mut name = OsString::from(target.as_ref().as_os_str());
        name.push(".");
        name.push(SIDECAR_EXTENSION);
        PathBuf::from(name)
    }

    /// Expand a mapping into translation jobs, resolving paths against `root`.
    ///
    /// A file maps to one job, a directory to one job per markdown file
    /// inside it. Missing sources are skipped with a warning.
    pub fn expand_mapping<P: AsRef<Path>>(root: P, mapping: &Mapping) -> Result<Vec<Job>> {
        let source = root.as_ref().join(&mapping.source);
        let target_root = root.as_ref().join(&mapping.target);

        if source.is_file() {
            return Ok(vec![Job { source, target: target_root }]);
        }

        if source.is_dir() {
            let files = Self::find_markdown_files(&source)?;
            return files.into_iter()
                .map(|file| -> Result<Job> {
                    let target = Self::mirror_path(&source, &file, &target_root)?;
                    Ok(Job { source: file, target })
                })
                .collect();
        }

        warn!("Source path not found, skipping: {:?}", source);
        Ok(Vec::new())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
