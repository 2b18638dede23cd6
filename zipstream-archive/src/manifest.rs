//! Archive manifests.
//!
//! A manifest is the ordered list of `(name, size)` pairs describing the
//! files whose bytes the upstream source delivers back to back. Its JSON form
//! is `{"files":[{"name":"a.txt","size":5}]}`.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use zipstream_core::{Result, ZipStreamError};

/// One file in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Name stored in the archive.
    pub name: String,
    /// Declared size in bytes.
    pub size: u64,
}

impl ManifestEntry {
    /// Create a manifest entry.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Ordered list of files making up an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Files in archive order.
    pub files: Vec<ManifestEntry>,
}

impl Manifest {
    /// Create a manifest from entries.
    pub fn new(files: Vec<ManifestEntry>) -> Self {
        Self { files }
    }

    /// Parse the JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ZipStreamError::invalid_manifest(e.to_string()))
    }

    /// Parse the JSON form from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| ZipStreamError::invalid_manifest(e.to_string()))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ZipStreamError::invalid_manifest(e.to_string()))
    }

    /// Build a manifest from files on disk.
    ///
    /// Each entry is named after the path's final component and sized from
    /// its metadata. Directories are rejected.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let metadata = std::fs::metadata(path)?;
            if !metadata.is_file() {
                return Err(ZipStreamError::invalid_manifest(format!(
                    "{} is not a regular file",
                    path.display()
                )));
            }
            files.push(ManifestEntry::new(entry_name(path)?, metadata.len()));
        }
        Ok(Self { files })
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the manifest lists no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all declared sizes, i.e. how many bytes the source must deliver.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

impl FromIterator<ManifestEntry> for Manifest {
    fn from_iter<I: IntoIterator<Item = ManifestEntry>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

fn entry_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            ZipStreamError::invalid_manifest(format!(
                "{} has no UTF-8 file name",
                path.display()
            ))
        })
}
