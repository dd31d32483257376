use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for dirdraft operations
#[derive(Debug, Error)]
pub enum DirdraftError {
    /// A node or template name was empty, all-whitespace, or contained a
    /// reserved character.
    #[error("invalid name '{0}': names must be non-empty and contain none of \\ / : * ? \" < > |")]
    InvalidName(String),

    /// A path was not usable for the requested operation.
    #[error("invalid path '{0}'")]
    InvalidPath(PathBuf),

    /// A sibling with the same name already exists under the parent.
    #[error("a node named '{name}' already exists under '{parent}'")]
    DuplicateName {
        /// Name of the parent folder.
        parent: String,
        /// The conflicting child name.
        name: String,
    },

    /// Attempted to attach a child to a file node.
    #[error("'{0}' is a file and cannot hold children")]
    NotAFolder(String),

    /// The target of a remove/move/rename was absent from its claimed parent
    /// or unknown to the tree.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Attaching here would place a node beneath its own subtree.
    #[error("cannot move '{0}' beneath its own subtree")]
    MoveIntoOwnSubtree(String),

    /// No template with the given name exists in the store.
    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    /// A session operation needed an open template.
    #[error("no template is open")]
    NoTemplateOpen,

    /// The persisted template document was malformed.
    #[error("malformed template document: {0}")]
    Serialization(String),

    /// A filesystem operation failed.
    #[error("filesystem error at '{path}': {source}")]
    Filesystem {
        /// Path the operation was working on.
        path: PathBuf,
        /// Underlying OS error.
        source: std::io::Error,
    },
}

impl DirdraftError {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DirdraftError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for DirdraftError {
    fn from(err: serde_json::Error) -> Self {
        DirdraftError::Serialization(err.to_string())
    }
}

/// Result type alias for dirdraft operations
pub type Result<T> = std::result::Result<T, DirdraftError>;
