//! Where the import file comes from.

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::ImportError;

/// Supplies the text of the file the user picked.
pub trait FileSource {
    /// Returns the contents of a file matching `accept`, a comma-separated
    /// list of extensions such as `".json"`.
    ///
    /// Fails with [`ImportError::Aborted`] if the user picked nothing.
    fn acquire(&self, accept: &str) -> impl Future<Output = Result<String, ImportError>> + Send;
}

/// Reads a file chosen on the command line.
#[derive(Debug, Clone)]
pub struct PathSource {
    path: PathBuf,
}

impl PathSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileSource for PathSource {
    fn acquire(&self, accept: &str) -> impl Future<Output = Result<String, ImportError>> + Send {
        let path = self.path.clone();
        let accept = accept.to_owned();
        async move {
            if path.as_os_str().is_empty() {
                return Err(ImportError::Aborted);
            }
            if !matches_accept(&path, &accept) {
                return Err(ImportError::UnsupportedFile {
                    path: path.display().to_string(),
                    accept,
                });
            }

            tracing::debug!(path = %path.display(), "reading import file");
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| ImportError::Io {
                    path: path.display().to_string(),
                    source,
                })
        }
    }
}

/// Extension check in the style of an HTML `accept` attribute. Entries that
/// are not extensions (MIME types, `*`) are ignored; an accept list with no
/// extensions lets everything through.
fn matches_accept(path: &Path, accept: &str) -> bool {
    let extensions: Vec<String> = accept
        .split(',')
        .map(str::trim)
        .filter_map(|entry| entry.strip_prefix('.'))
        .map(str::to_ascii_lowercase)
        .collect();
    if extensions.is_empty() {
        return true;
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext.to_ascii_lowercase()))
}
