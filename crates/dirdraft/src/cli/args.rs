//! Command-line argument structures and enums

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use dirdraft_core::node::NodeKind;

#[derive(Parser)]
#[command(name = "dirdraft")]
#[command(version)]
#[command(about = "Design directory templates and materialize them on disk", long_about = None)]
pub struct Cli {
    /// Workspace directory holding the template store (default: current directory)
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new empty template
    New {
        /// Template name
        name: String,
    },

    /// List stored templates
    #[command(alias = "ls")]
    List,

    /// Print a template's tree
    #[command(alias = "tree")]
    Show {
        /// Template name
        name: String,
    },

    /// Delete a stored template
    Delete {
        /// Template name
        name: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Build a template from an existing directory
    Import {
        /// Directory to scan
        directory: PathBuf,

        /// Template name (default: the directory's name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Add a file or folder node to a template
    Add {
        /// Template name
        template: String,

        /// Parent folder, as a root-relative path ("." for the root)
        parent: String,

        /// Name of the new node
        name: String,

        /// Node kind
        #[arg(short, long, value_enum, default_value_t = KindArg::File)]
        kind: KindArg,

        /// Tags to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Rename a node
    Rename {
        /// Template name
        template: String,

        /// Node, as a root-relative path (e.g. "src/main.py")
        path: String,

        /// New name
        new_name: String,
    },

    /// Remove a node from a template
    Rm {
        /// Template name
        template: String,

        /// Node, as a root-relative path
        path: String,
    },

    /// Move a node under a different folder
    Mv {
        /// Template name
        template: String,

        /// Node, as a root-relative path
        path: String,

        /// New parent folder, as a root-relative path ("." for the root)
        new_parent: String,
    },

    /// Add tags to a node
    Tag {
        /// Template name
        template: String,

        /// Node, as a root-relative path
        path: String,

        /// Tags to add
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Materialize a template into a target directory
    #[command(alias = "exec")]
    Execute {
        /// Template name
        template: String,

        /// Directory to reconcile with the template
        target: PathBuf,
    },

    /// Edit a template interactively (with undo/redo)
    Edit {
        /// Template name
        template: String,
    },
}

/// Node kind as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// A plain file
    File,
    /// A directory
    Folder,
}

impl From<KindArg> for NodeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::File => NodeKind::File,
            KindArg::Folder => NodeKind::Folder,
        }
    }
}
