//! Data-directory access: which files hold products and how they are read.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::CatalogError;

pub const PRODUCT_FILE_PREFIX: &str = "amazon_";
pub const PRODUCT_FILE_SUFFIX: &str = ".json";
pub const CATEGORIES_FILE: &str = "predefined-categories.json";
pub const FEATURED_FILE: &str = "featured.json";
pub const POSTS_FILE: &str = "posts.json";

/// One product source file in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub path: PathBuf,
}

/// A directory of pre-baked JSON snapshots.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lists `amazon_*.json` files, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the directory cannot be listed.
    pub fn product_files(&self) -> Result<Vec<SourceFile>, CatalogError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| io_error(&self.root, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&self.root, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !(name.starts_with(PRODUCT_FILE_PREFIX) && name.ends_with(PRODUCT_FILE_SUFFIX)) {
                continue;
            }
            let file_type = entry.file_type().map_err(|e| io_error(&entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }
            files.push(SourceFile {
                name,
                path: entry.path(),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Reads and deserializes a JSON file located in the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if the file cannot be read or
    /// [`CatalogError::Parse`] if its contents do not match `T`.
    pub fn read_json<T: DeserializeOwned>(&self, file_name: &str) -> Result<T, CatalogError> {
        read_json_file(&self.root.join(file_name))
    }

    /// Returns `Ok(())` if the directory can be listed.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] if it cannot.
    pub fn probe(&self) -> Result<(), CatalogError> {
        std::fs::read_dir(&self.root)
            .map(|_| ())
            .map_err(|e| io_error(&self.root, e))
    }
}

/// Reads and deserializes one JSON file.
///
/// # Errors
///
/// Returns [`CatalogError::Io`] or [`CatalogError::Parse`].
pub fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read catalog file");
    serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

fn io_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.display().to_string(),
        source,
    }
}
