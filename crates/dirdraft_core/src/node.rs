//! Node model: one file or folder entry in the abstract template tree.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{DirdraftError, Result};

/// Characters that are not allowed in node names.
pub const RESERVED_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Tag applied to nodes produced by the directory scanner.
pub const GENERATED_TAG: &str = "generated";

/// Whether a node is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A plain file; owns no children.
    File,
    /// A directory; owns an ordered list of children.
    Folder,
}

impl NodeKind {
    /// The tag string every node carries for its kind.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }

    /// True for [`NodeKind::Folder`].
    pub fn is_folder(&self) -> bool {
        matches!(self, NodeKind::Folder)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Validate a node (or template) name.
///
/// Names must be non-empty, not all-whitespace, and contain none of the
/// reserved characters `\ / : * ? " < > |`.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.contains(RESERVED_NAME_CHARS) {
        return Err(DirdraftError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Validate a node path: absolute paths and template-relative paths are fine,
/// but `..` components are not.
fn validate_path(path: &Path) -> Result<()> {
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(DirdraftError::InvalidPath(path.to_path_buf()));
    }
    Ok(())
}

/// One file or folder entry in a template.
///
/// Fields are private: a node is only mutated through [`Template`] operations
/// so the tree invariants (unique sibling names, derived paths) hold.
///
/// [`Template`]: crate::tree::Template
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    path: PathBuf,
    kind: NodeKind,
    tags: IndexSet<String>,
    is_root: bool,
    /// The path this node was last seen at on disk, if any. Set by the
    /// scanner and updated by the executor; drives rename/move detection.
    disk_path: Option<PathBuf>,
}

impl Node {
    /// Create a validated node. The kind tag is always part of the tag set.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: NodeKind) -> Result<Self> {
        let name = name.into();
        let path = path.into();
        validate_name(&name)?;
        validate_path(&path)?;

        let mut tags = IndexSet::new();
        tags.insert(kind.tag().to_string());

        Ok(Self {
            name,
            path,
            kind,
            tags,
            is_root: false,
            disk_path: None,
        })
    }

    /// Add extra tags at construction time.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_tags(tags);
        self
    }

    /// Build a node from a directory scan. Disk is ground truth, so names are
    /// taken as-is without reserved-character validation.
    pub(crate) fn from_disk(name: impl Into<String>, path: impl Into<PathBuf>, kind: NodeKind) -> Self {
        let path = path.into();
        let mut tags = IndexSet::new();
        tags.insert(kind.tag().to_string());
        tags.insert(GENERATED_TAG.to_string());

        Self {
            name: name.into(),
            path: path.clone(),
            kind,
            tags,
            is_root: false,
            disk_path: Some(path),
        }
    }

    /// The node's name (unique among its siblings).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's derived path: `parent.path / name` for non-root nodes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File or folder.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The node's tag set, in insertion order. Always contains the kind tag.
    pub fn tags(&self) -> &IndexSet<String> {
        &self.tags
    }

    /// True for the tree root.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Where this node was last seen on disk, if known.
    pub fn disk_path(&self) -> Option<&Path> {
        self.disk_path.as_deref()
    }

    /// True for nodes produced by the directory scanner.
    pub fn is_generated(&self) -> bool {
        self.tags.contains(GENERATED_TAG)
    }

    /// Insert tags, ignoring duplicates. The kind tag stays present.
    pub fn insert_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if self.tags.insert(tag.clone()) {
                log::info!("added tag '{}' to node '{}'", tag, self.name);
            }
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub(crate) fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub(crate) fn mark_root(&mut self) {
        self.is_root = true;
    }

    pub(crate) fn set_disk_path(&mut self, path: impl Into<PathBuf>) {
        self.disk_path = Some(path.into());
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node(name: {}, path: {}, kind: {}, tags: [{}], root: {})",
            self.name,
            self.path.display(),
            self.kind,
            self.tags.iter().cloned().collect::<Vec<_>>().join(", "),
            self.is_root,
        )
    }
}
