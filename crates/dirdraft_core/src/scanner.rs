//! Directory scanner: build a template from an existing directory.
//!
//! Used for the initial import and to re-derive the model after an
//! execution pass, so edits always operate on ground truth. Unreadable
//! subtrees are skipped with a warning; a scan never aborts halfway.

use std::path::Path;

use crate::error::{DirdraftError, Result};
use crate::fs::FileSystem;
use crate::node::{Node, NodeKind};
use crate::tree::Template;

/// Walks a real directory into a [`Template`] through the filesystem trait.
pub struct Scanner<FS: FileSystem> {
    fs: FS,
}

impl<FS: FileSystem> Scanner<FS> {
    /// Create a scanner over the given filesystem.
    pub fn new(fs: FS) -> Self {
        Self { fs }
    }

    /// Build a template mirroring the directory at `path`. Every node is
    /// tagged `generated`. Entries are visited in name order so scans are
    /// deterministic across platforms.
    pub fn scan(&self, path: &Path) -> Result<Template> {
        if !self.fs.is_dir(path) {
            return Err(DirdraftError::InvalidPath(path.to_path_buf()));
        }

        let root_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let root = Node::from_disk(root_name.clone(), path, NodeKind::Folder);
        let mut template = Template::with_root(root_name, root)?;

        let mut worklist = vec![(template.root(), path.to_path_buf())];
        while let Some((parent_id, dir)) = worklist.pop() {
            let mut entries = match self.fs.list_dir(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    log::warn!("skipping unreadable directory {}: {e}", dir.display());
                    continue;
                }
            };
            entries.sort();

            for entry in entries {
                let name = match entry.file_name() {
                    Some(name) => name.to_string_lossy().into_owned(),
                    None => continue,
                };
                let kind = if self.fs.is_dir(&entry) {
                    NodeKind::Folder
                } else {
                    NodeKind::File
                };
                let node = Node::from_disk(name, &entry, kind);
                let id = template.insert(node);
                if let Err(e) = template.attach(parent_id, id) {
                    log::warn!("skipping {}: {e}", entry.display());
                    continue;
                }
                if kind.is_folder() {
                    worklist.push((id, entry));
                }
            }
        }

        Ok(template)
    }
}
