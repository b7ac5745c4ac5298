// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Sources of raw [Gherkin] text.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use derive_more::with_trait::{Display, Error};

/// Error of a [`Provider`].
#[derive(Debug, Display, Error)]
pub enum SourceError {
    /// Requested root or document doesn't exist.
    ///
    /// Distinct from an existing document with empty content.
    #[display("`{}` is not found", _0.display())]
    NotFound(#[error(not(source))] PathBuf),

    /// Document exists, but cannot be read.
    #[display("failed to read `{}`: {source}", path.display())]
    Io {
        /// Path of the document.
        path: PathBuf,

        /// Underlying I/O error.
        source: io::Error,
    },

    /// Root cannot be walked.
    #[display("failed to walk `{}`: {source}", root.display())]
    Walk {
        /// Walked root.
        root: PathBuf,

        /// Underlying [`globwalk`] error.
        source: globwalk::GlobError,
    },
}

/// Source of raw document text.
pub trait Provider {
    /// Lists identifiers of all the documents under the given `root`,
    /// sorted.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] if the `root` doesn't exist.
    fn list(&self, root: &Path) -> Result<Vec<PathBuf>, SourceError>;

    /// Reads the raw text of the document with the given `id`.
    ///
    /// # Errors
    ///
    /// [`SourceError::NotFound`] if there is no such document.
    fn read(&self, id: &Path) -> Result<String, SourceError>;
}

/// [`Provider`] reading `*.feature` files from a file system.
///
/// As there is no async runtime-agnostic way to interact with io, this
/// [`Provider`] is blocking.
#[derive(Clone, Copy, Debug, Default)]
pub struct FsProvider;

impl Provider for FsProvider {
    fn list(&self, root: &Path) -> Result<Vec<PathBuf>, SourceError> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }
        if !root.is_dir() {
            return Err(SourceError::NotFound(root.to_path_buf()));
        }

        let walker = globwalk::GlobWalkerBuilder::new(root, "*.feature")
            .case_insensitive(true)
            .build()
            .map_err(|source| SourceError::Walk { root: root.to_path_buf(), source })?;
        let mut found = walker
            .filter_map(|entry| {
                entry
                    .map_err(|e| {
                        tracing::warn!(root = %root.display(), "skipping unwalkable entry: {e}");
                    })
                    .ok()
            })
            .map(|entry| entry.path().to_path_buf())
            .collect::<Vec<_>>();
        found.sort();
        Ok(found)
    }

    fn read(&self, id: &Path) -> Result<String, SourceError> {
        fs::read_to_string(id).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                SourceError::NotFound(id.to_path_buf())
            } else {
                SourceError::Io { path: id.to_path_buf(), source }
            }
        })
    }
}

/// In-memory [`Provider`], mostly useful for tests and embedded documents.
#[derive(Clone, Debug, Default)]
pub struct MemoryProvider {
    documents: BTreeMap<PathBuf, String>,
}

impl MemoryProvider {
    /// Creates an empty [`MemoryProvider`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document with the given `id` and `text`.
    #[must_use]
    pub fn with(mut self, id: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        _ = self.documents.insert(id.into(), text.into());
        self
    }
}

impl Provider for MemoryProvider {
    fn list(&self, root: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let prefix = root.strip_prefix(".").unwrap_or(root);
        let found = self
            .documents
            .keys()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect::<Vec<_>>();
        if found.is_empty() {
            return Err(SourceError::NotFound(root.to_path_buf()));
        }
        Ok(found)
    }

    fn read(&self, id: &Path) -> Result<String, SourceError> {
        self.documents
            .get(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(id.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_provider_distinguishes_missing_from_empty() {
        let provider = MemoryProvider::new()
            .with("features/b.feature", "")
            .with("features/a.feature", "Feature: A");

        assert_eq!(
            provider.list(Path::new("features")).unwrap(),
            [
                PathBuf::from("features/a.feature"),
                PathBuf::from("features/b.feature"),
            ],
        );
        assert_eq!(provider.read(Path::new("features/b.feature")).unwrap(), "");
        assert!(matches!(
            provider.read(Path::new("features/c.feature")),
            Err(SourceError::NotFound(_)),
        ));
        assert!(matches!(
            provider.list(Path::new("other")),
            Err(SourceError::NotFound(_)),
        ));
    }

    #[test]
    fn fs_provider_walks_sorted_feature_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.feature"), "Feature: B").unwrap();
        fs::write(dir.path().join("a.feature"), "Feature: A").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let found = FsProvider.list(dir.path()).unwrap();
        assert_eq!(
            found,
            [dir.path().join("a.feature"), dir.path().join("nested/b.feature")],
        );
        assert_eq!(FsProvider.read(&found[0]).unwrap(), "Feature: A");
        assert!(matches!(
            FsProvider.read(&dir.path().join("missing.feature")),
            Err(SourceError::NotFound(_)),
        ));
        assert!(matches!(
            FsProvider.list(&dir.path().join("missing")),
            Err(SourceError::NotFound(_)),
        ));
    }

    #[cfg(unix)]
    #[test]
    fn fs_provider_skips_unwalkable_directories() {
        use std::os::unix::fs::PermissionsExt as _;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.feature"), "Feature: H").unwrap();
        fs::write(dir.path().join("a.feature"), "Feature: A").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let found = FsProvider.list(dir.path());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let found = found.unwrap();
        assert!(found.contains(&dir.path().join("a.feature")));
        assert!(found.len() <= 2);
    }
}
