//! Folder selection: the file set a folder picker would hand to an upload form.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::SelectionError;

/// A picked file. `relative_path` starts with the picked folder's name and uses `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub relative_path: String,
    pub contents: Vec<u8>,
}

impl SelectedFile {
    pub fn new(relative_path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents: contents.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_files(files: impl IntoIterator<Item = SelectedFile>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// Reads every regular file below `folder`, in file-name order.
    pub fn from_folder(folder: &Path) -> Result<Self, SelectionError> {
        let root = fs::canonicalize(folder).map_err(|source| SelectionError::Io {
            path: folder.to_path_buf(),
            source,
        })?;
        if !root.is_dir() {
            return Err(SelectionError::NotAFolder {
                path: folder.to_path_buf(),
            });
        }

        let folder_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());

        let mut files = Vec::new();
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let contents = fs::read(path).map_err(|source| SelectionError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let relative_path = picker_path(folder_name.as_deref(), &root, path);
            files.push(SelectedFile::new(relative_path, contents));
        }

        debug!(folder = %root.display(), files = files.len(), "folder selection loaded");
        Ok(Self { files })
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn picker_path(folder_name: Option<&str>, root: &Path, path: &Path) -> String {
    let relative: PathBuf = path
        .strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf());

    let mut segments: Vec<String> = folder_name.map(str::to_string).into_iter().collect();
    segments.extend(
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned()),
    );
    segments.join("/")
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
