//! File-system collaborator for the build.
//!
//! Everything the pipeline reads or writes goes through the [`Store`] trait,
//! so the core can be driven from memory in tests.
//!
//! # Source layout
//!
//! ```text
//! <source>/
//! ├── blueprints/
//! │   ├── index.blueprint        → index.html
//! │   └── docs/intro.blueprint   → docs/intro.html
//! └── components/
//!     └── composite/card/        → component `composite.card`
//!         ├── card.html
//!         ├── card.css
//!         └── card.js
//! ```

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

/// Blueprint file extension
pub const BLUEPRINT_EXT: &str = "blueprint";

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Storage errors, always carrying the offending path.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error when reading `{0}`")]
    Read(PathBuf, #[source] io::Error),

    #[error("IO error when writing `{0}`")]
    Write(PathBuf, #[source] io::Error),

    #[error("cannot scan `{0}`")]
    Walk(PathBuf, #[source] walkdir::Error),

    #[error("no HTML template found in component `{0}`")]
    TemplateNotFound(PathBuf),

    #[error("multiple HTML templates found in component `{0}`")]
    AmbiguousTemplate(PathBuf),
}

pub type Result<T, E = StorageError> = std::result::Result<T, E>;

/// Storage operations consumed by the build pipeline.
///
/// Component directories are given relative to the components root,
/// blueprint paths relative to the blueprints root.
pub trait Store {
    /// Map each blueprint to its output base path (no extension).
    fn list_blueprints(&self) -> Result<BTreeMap<PathBuf, PathBuf>>;

    fn read_blueprint(&self, path: &Path) -> Result<Vec<u8>>;

    /// Files under `dir` (recursively) with extension `ext`, relative to
    /// `dir`, in file-name walk order.
    fn list_component_files(&self, dir: &Path, ext: &str) -> Result<Vec<String>>;

    fn read_component(&self, dir: &Path, file: &str) -> Result<Vec<u8>>;

    /// Write every file under the target root, creating directories.
    fn write_output(&self, files: &BTreeMap<PathBuf, Vec<u8>>) -> Result<()>;

    /// The single `.html` file of a component directory.
    fn find_template_file(&self, dir: &Path) -> Result<String> {
        let mut files = self.list_component_files(dir, "html")?;
        match files.len() {
            0 => Err(StorageError::TemplateNotFound(dir.to_path_buf())),
            1 => Ok(files.remove(0)),
            _ => Err(StorageError::AmbiguousTemplate(dir.to_path_buf())),
        }
    }
}

// ============================================================================
// File System Store
// ============================================================================

/// [`Store`] backed by a source tree and a target directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    source: PathBuf,
    target: PathBuf,
}

impl FsStore {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    fn blueprints_dir(&self) -> PathBuf {
        self.source.join("blueprints")
    }

    fn component_dir(&self, dir: &Path) -> PathBuf {
        self.source.join("components").join(dir)
    }
}

impl Store for FsStore {
    fn list_blueprints(&self) -> Result<BTreeMap<PathBuf, PathBuf>> {
        let root = self.blueprints_dir();

        let blueprints = collect_files(&root)?
            .into_iter()
            .filter(|path| path.extension().is_some_and(|ext| ext == BLUEPRINT_EXT))
            .filter_map(|path| {
                let rel = path.strip_prefix(&root).ok()?.to_path_buf();
                let output = rel.with_extension("");
                Some((rel, output))
            })
            .collect();
        Ok(blueprints)
    }

    fn read_blueprint(&self, path: &Path) -> Result<Vec<u8>> {
        let full = self.blueprints_dir().join(path);
        fs::read(&full).map_err(|err| StorageError::Read(full, err))
    }

    fn list_component_files(&self, dir: &Path, ext: &str) -> Result<Vec<String>> {
        let root = self.component_dir(dir);

        let files: Vec<String> = collect_files(&root)?
            .into_iter()
            .filter(|path| path.extension().is_some_and(|e| e == ext))
            .filter_map(|path| {
                path.strip_prefix(&root)
                    .ok()
                    .and_then(Path::to_str)
                    .map(str::to_owned)
            })
            .collect();
        Ok(files)
    }

    fn read_component(&self, dir: &Path, file: &str) -> Result<Vec<u8>> {
        let full = self.component_dir(dir).join(file);
        fs::read(&full).map_err(|err| StorageError::Read(full, err))
    }

    fn write_output(&self, files: &BTreeMap<PathBuf, Vec<u8>>) -> Result<()> {
        for (rel, content) in files {
            let full = self.target.join(rel);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)
                    .map_err(|err| StorageError::Write(parent.to_path_buf(), err))?;
            }
            fs::write(&full, content).map_err(|err| StorageError::Write(full, err))?;
        }
        Ok(())
    }
}

/// Collect all files under `dir` recursively.
///
/// A missing directory is an error, unreadable entries are not skipped.
fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|err| StorageError::Walk(dir.to_path_buf(), err))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_str().unwrap_or_default();
        if IGNORED_FILES.contains(&name) {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

// ============================================================================
// Tests
// ============================================================================
