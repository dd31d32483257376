//! Reversible mutations and the undo/redo log.
//!
//! Every edit to a template goes through a [`Command`], a closed enum whose
//! variants carry exactly the state needed to apply and invert themselves.
//! The [`CommandLog`] executes commands as they are pushed and keeps a linear
//! history: pushing after an undo discards the redoable tail. Standard
//! editor semantics, no branching history.

use std::path::PathBuf;

use crate::error::{DirdraftError, Result};
use crate::fs::FileSystem;
use crate::node::NodeKind;
use crate::tree::{NodeId, Template};

/// An atomic, reversible mutation on a template.
#[derive(Debug, Clone)]
pub enum Command {
    /// Attach a previously inserted node under a parent.
    Add {
        /// Parent folder.
        parent: NodeId,
        /// The node being attached.
        node: NodeId,
    },
    /// Detach a node from its parent (logical removal; the subtree survives
    /// in the arena so undo can resurrect it).
    Remove {
        /// Parent the node hangs under.
        parent: NodeId,
        /// The node being detached.
        node: NodeId,
        /// Position among the parent's children, restored on undo.
        position: usize,
    },
    /// Rename a node; self-inverse over old/new name.
    Rename {
        /// Target node.
        node: NodeId,
        /// Name before the rename.
        old_name: String,
        /// Name after the rename.
        new_name: String,
    },
    /// Re-parent a node; self-inverse over old/new parent.
    Move {
        /// Target node.
        node: NodeId,
        /// Parent before the move.
        old_parent: NodeId,
        /// Position under the old parent, restored on undo.
        old_position: usize,
        /// Parent after the move.
        new_parent: NodeId,
    },
    /// Remove an entry from the real filesystem. Carries the path and kind
    /// resolved when the command was issued. Undo recreates an *empty*
    /// placeholder only; original content is not recoverable.
    DeleteOnDisk {
        /// Absolute path at the time the deletion was queued.
        path: PathBuf,
        /// File or folder, for choosing unlink vs recursive remove.
        kind: NodeKind,
    },
}

impl Command {
    /// Run the forward action. Forward actions are idempotent: re-applying
    /// over an already-satisfied tree changes nothing.
    pub fn apply<FS: FileSystem>(&self, tree: &mut Template, fs: &FS) -> Result<()> {
        match self {
            Command::Add { parent, node } => tree.attach(*parent, *node),
            Command::Remove { parent, node, .. } => {
                tree.detach(*parent, *node);
                Ok(())
            }
            Command::Rename { node, new_name, .. } => tree.rename(*node, new_name.clone()),
            Command::Move { node, new_parent, .. } => tree.attach(*new_parent, *node),
            Command::DeleteOnDisk { path, kind } => {
                if !fs.exists(path) {
                    return Ok(());
                }
                let result = match kind {
                    NodeKind::File => fs.remove_file(path),
                    NodeKind::Folder => fs.remove_dir_all(path),
                };
                result.map_err(|e| DirdraftError::fs(path.clone(), e))?;
                log::info!("deleted {} on disk: {}", kind, path.display());
                Ok(())
            }
        }
    }

    /// Run the inverse action, restoring the pre-apply tree state exactly
    /// (name, attachment, position, derived paths).
    pub fn revert<FS: FileSystem>(&self, tree: &mut Template, fs: &FS) -> Result<()> {
        match self {
            Command::Add { parent, node } => {
                tree.detach(*parent, *node);
                Ok(())
            }
            Command::Remove {
                parent,
                node,
                position,
            } => tree.attach_at(*parent, *node, *position),
            Command::Rename { node, old_name, .. } => tree.rename(*node, old_name.clone()),
            Command::Move {
                node,
                old_parent,
                old_position,
                ..
            } => tree.attach_at(*old_parent, *node, *old_position),
            Command::DeleteOnDisk { path, kind } => {
                if fs.exists(path) {
                    return Ok(());
                }
                let result = match kind {
                    NodeKind::File => {
                        if let Some(parent) = path.parent()
                            && !parent.as_os_str().is_empty()
                            && !fs.exists(parent)
                        {
                            fs.create_dir_all(parent)
                                .map_err(|e| DirdraftError::fs(parent.to_path_buf(), e))?;
                        }
                        fs.create_new(path, "")
                    }
                    NodeKind::Folder => fs.create_dir_all(path),
                };
                result.map_err(|e| DirdraftError::fs(path.clone(), e))?;
                log::info!("restored empty {} on disk: {}", kind, path.display());
                Ok(())
            }
        }
    }

    /// Short description for log lines.
    fn describe(&self, tree: &Template) -> String {
        let name = |id: NodeId| {
            tree.node(id)
                .map(|n| n.name().to_string())
                .unwrap_or_else(|| "?".to_string())
        };
        match self {
            Command::Add { parent, node } => {
                format!("add '{}' under '{}'", name(*node), name(*parent))
            }
            Command::Remove { parent, node, .. } => {
                format!("remove '{}' from '{}'", name(*node), name(*parent))
            }
            Command::Rename {
                old_name, new_name, ..
            } => format!("rename '{}' to '{}'", old_name, new_name),
            Command::Move {
                node, new_parent, ..
            } => format!("move '{}' under '{}'", name(*node), name(*new_parent)),
            Command::DeleteOnDisk { path, kind } => {
                format!("delete {} '{}' on disk", kind, path.display())
            }
        }
    }
}

/// History may reference a node detached by a later, independent command;
/// that is a logged no-op during undo/redo, never fatal.
fn is_benign(err: &DirdraftError) -> bool {
    matches!(err, DirdraftError::NodeNotFound(_))
}

/// Linear stack of executed commands plus an at-most-one pending-redo slot.
#[derive(Debug, Default)]
pub struct CommandLog {
    stack: Vec<Command>,
    pending_redo: Option<Command>,
}

impl CommandLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command immediately and record it. Any previously undone
    /// command stops being redoable. On failure nothing is recorded and the
    /// tree is unchanged.
    pub fn push<FS: FileSystem>(
        &mut self,
        command: Command,
        tree: &mut Template,
        fs: &FS,
    ) -> Result<()> {
        command.apply(tree, fs)?;
        log::info!("executed command: {}", command.describe(tree));
        self.pending_redo = None;
        self.stack.push(command);
        Ok(())
    }

    /// Undo the most recent command. Returns `false` (with a log record)
    /// when there is nothing to undo.
    pub fn undo<FS: FileSystem>(&mut self, tree: &mut Template, fs: &FS) -> Result<bool> {
        let Some(command) = self.stack.pop() else {
            log::info!("command stack is empty, nothing to undo");
            return Ok(false);
        };
        log::info!("undoing command: {}", command.describe(tree));
        match command.revert(tree, fs) {
            Ok(()) => {}
            Err(e) if is_benign(&e) => {
                log::warn!("undo referenced a missing node, treating as no-op: {e}")
            }
            Err(e) => {
                self.stack.push(command);
                return Err(e);
            }
        }
        self.pending_redo = Some(command);
        Ok(true)
    }

    /// Replay the most recently undone command. Returns `false` (with a log
    /// record) when there is nothing to redo.
    pub fn redo<FS: FileSystem>(&mut self, tree: &mut Template, fs: &FS) -> Result<bool> {
        let Some(command) = self.pending_redo.take() else {
            log::info!("nothing to redo");
            return Ok(false);
        };
        log::info!("redoing command: {}", command.describe(tree));
        match command.apply(tree, fs) {
            Ok(()) => {}
            Err(e) if is_benign(&e) => {
                log::warn!("redo referenced a missing node, treating as no-op: {e}")
            }
            Err(e) => {
                self.pending_redo = Some(command);
                return Err(e);
            }
        }
        self.stack.push(command);
        Ok(true)
    }

    /// Number of commands in the history.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// True when no command has been recorded.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// True when a redo would replay something.
    pub fn can_redo(&self) -> bool {
        self.pending_redo.is_some()
    }

    /// Forget all history (used when the tree is rebuilt from disk).
    pub fn clear(&mut self) {
        self.stack.clear();
        self.pending_redo = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::InMemoryFileSystem;
    use crate::node::Node;
    use std::path::Path;

    fn fixture() -> (Template, InMemoryFileSystem, CommandLog) {
        (
            Template::new("proj").unwrap(),
            InMemoryFileSystem::new(),
            CommandLog::new(),
        )
    }

    fn snapshot(template: &Template) -> Vec<(String, String)> {
        let mut out = Vec::new();
        template.traverse(|n| {
            out.push((n.name().to_string(), n.path().display().to_string()));
        });
        out
    }

    #[test]
    fn test_add_then_undo_then_redo_roundtrip() {
        let (mut template, fs, mut log) = fixture();
        let node = template.insert(Node::new("src", "", NodeKind::Folder).unwrap());
        let root = template.root();

        log.push(Command::Add { parent: root, node }, &mut template, &fs)
            .unwrap();
        let applied = snapshot(&template);

        assert!(log.undo(&mut template, &fs).unwrap());
        assert!(!template.is_attached(node));

        assert!(log.redo(&mut template, &fs).unwrap());
        assert_eq!(snapshot(&template), applied);
    }

    #[test]
    fn test_remove_undo_restores_position() {
        let (mut template, fs, mut log) = fixture();
        let root = template.root();
        let a = template
            .add_node(root, Node::new("a", "", NodeKind::File).unwrap())
            .unwrap();
        let b = template
            .add_node(root, Node::new("b", "", NodeKind::File).unwrap())
            .unwrap();
        let c = template
            .add_node(root, Node::new("c", "", NodeKind::File).unwrap())
            .unwrap();
        let _ = (a, c);

        let position = template.position(root, b).unwrap();
        log.push(
            Command::Remove {
                parent: root,
                node: b,
                position,
            },
            &mut template,
            &fs,
        )
        .unwrap();
        assert!(!template.is_attached(b));

        log.undo(&mut template, &fs).unwrap();
        let mut names = Vec::new();
        template.traverse(|n| names.push(n.name().to_string()));
        assert_eq!(names, vec!["proj", "a", "b", "c"]);
    }

    #[test]
    fn test_rename_roundtrip_restores_paths() {
        let (mut template, fs, mut log) = fixture();
        let root = template.root();
        let src = template
            .add_node(root, Node::new("src", "", NodeKind::Folder).unwrap())
            .unwrap();
        template
            .add_node(src, Node::new("main.py", "", NodeKind::File).unwrap())
            .unwrap();
        let before = snapshot(&template);

        log.push(
            Command::Rename {
                node: src,
                old_name: "src".into(),
                new_name: "lib".into(),
            },
            &mut template,
            &fs,
        )
        .unwrap();
        let renamed = snapshot(&template);
        assert_ne!(before, renamed);
        assert_eq!(
            template.node(src).unwrap().path(),
            Path::new("proj/lib")
        );

        log.undo(&mut template, &fs).unwrap();
        assert_eq!(snapshot(&template), before);

        log.redo(&mut template, &fs).unwrap();
        assert_eq!(snapshot(&template), renamed);
    }

    #[test]
    fn test_move_roundtrip() {
        let (mut template, fs, mut log) = fixture();
        let root = template.root();
        let src = template
            .add_node(root, Node::new("src", "", NodeKind::Folder).unwrap())
            .unwrap();
        let docs = template
            .add_node(root, Node::new("docs", "", NodeKind::Folder).unwrap())
            .unwrap();
        let readme = template
            .add_node(src, Node::new("README.md", "", NodeKind::File).unwrap())
            .unwrap();
        let before = snapshot(&template);

        log.push(
            Command::Move {
                node: readme,
                old_parent: src,
                old_position: 0,
                new_parent: docs,
            },
            &mut template,
            &fs,
        )
        .unwrap();
        assert_eq!(
            template.node(readme).unwrap().path(),
            Path::new("proj/docs/README.md")
        );
        let moved = snapshot(&template);

        log.undo(&mut template, &fs).unwrap();
        assert_eq!(snapshot(&template), before);

        log.redo(&mut template, &fs).unwrap();
        assert_eq!(snapshot(&template), moved);
    }

    #[test]
    fn test_push_discards_redo_tail() {
        let (mut template, fs, mut log) = fixture();
        let root = template.root();
        let a = template.insert(Node::new("a", "", NodeKind::File).unwrap());
        let b = template.insert(Node::new("b", "", NodeKind::File).unwrap());

        log.push(Command::Add { parent: root, node: a }, &mut template, &fs)
            .unwrap();
        log.undo(&mut template, &fs).unwrap();
        assert!(log.can_redo());

        log.push(Command::Add { parent: root, node: b }, &mut template, &fs)
            .unwrap();
        assert!(!log.can_redo());
        assert!(!log.redo(&mut template, &fs).unwrap());
    }

    #[test]
    fn test_undo_on_empty_log_is_reported_noop() {
        let (mut template, fs, mut log) = fixture();
        assert!(!log.undo(&mut template, &fs).unwrap());
        assert!(!log.redo(&mut template, &fs).unwrap());
    }

    #[test]
    fn test_delete_on_disk_and_placeholder_restore() {
        let (mut template, fs, mut log) = fixture();
        fs.write_file(Path::new("/base/old.txt"), "precious contents").unwrap();

        let command = Command::DeleteOnDisk {
            path: "/base/old.txt".into(),
            kind: NodeKind::File,
        };
        log.push(command, &mut template, &fs).unwrap();
        assert!(!fs.exists(Path::new("/base/old.txt")));

        // Undo restores an empty placeholder, not the contents.
        log.undo(&mut template, &fs).unwrap();
        assert_eq!(fs.read_to_string(Path::new("/base/old.txt")).unwrap(), "");

        // Redo deletes it again; a second redo has nothing left to do.
        log.redo(&mut template, &fs).unwrap();
        assert!(!fs.exists(Path::new("/base/old.txt")));
    }

    #[test]
    fn test_delete_on_disk_folder_recursive() {
        let (mut template, fs, mut log) = fixture();
        fs.write_file(Path::new("/base/junk/deep/file.txt"), "x").unwrap();

        log.push(
            Command::DeleteOnDisk {
                path: "/base/junk".into(),
                kind: NodeKind::Folder,
            },
            &mut template,
            &fs,
        )
        .unwrap();
        assert!(!fs.exists(Path::new("/base/junk")));
        assert!(!fs.exists(Path::new("/base/junk/deep/file.txt")));

        log.undo(&mut template, &fs).unwrap();
        assert!(fs.is_dir(Path::new("/base/junk")));
        // Contents are gone for good.
        assert!(!fs.exists(Path::new("/base/junk/deep/file.txt")));
    }
}
