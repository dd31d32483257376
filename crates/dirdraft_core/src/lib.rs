#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Reversible commands and the undo/redo log
pub mod command;

/// Error (common error types)
pub mod error;

/// Executor (reconcile a directory with a template)
pub mod executor;

/// Filesystem abstraction
pub mod fs;

/// Node model (one file or folder entry)
pub mod node;

/// Scanner (build a template from an existing directory)
pub mod scanner;

/// Session (one open template plus history and deletion queue)
pub mod session;

/// Store (JSON persistence for templates)
pub mod store;

/// Template tree
pub mod tree;
