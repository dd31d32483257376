//! Executor: reconcile a real base directory with a template.
//!
//! One execution pass applies queued deletions, rebases the template onto
//! the base directory, orders nodes so every folder is handled before its
//! children, and materializes each node, reporting every action taken.
//! Individual filesystem failures are logged and skipped; the pass is
//! best-effort and always runs to completion. Re-running is safe because
//! already-satisfied paths are skipped.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::fs::FileSystem;
use crate::node::NodeKind;
use crate::tree::{NodeId, Template};

/// A node queued for on-disk deletion, with its path and kind resolved at
/// the time the deletion was requested.
#[derive(Debug, Clone)]
pub struct PendingDeletion {
    /// Path to remove.
    pub path: PathBuf,
    /// File (unlink) or folder (recursive remove).
    pub kind: NodeKind,
}

/// One filesystem action taken during an execution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A directory was created.
    CreatedDir(PathBuf),
    /// A zero-length file was created.
    CreatedFile(PathBuf),
    /// A directory was removed recursively.
    DeletedDir(PathBuf),
    /// A file was unlinked.
    DeletedFile(PathBuf),
    /// An existing on-disk entry was moved to the node's resolved path.
    Renamed {
        /// Previous on-disk path.
        from: PathBuf,
        /// New path.
        to: PathBuf,
        /// Entity kind.
        kind: NodeKind,
    },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::CreatedDir(p) => write!(f, "Created directory: {}", p.display()),
            Action::CreatedFile(p) => write!(f, "Created file: {}", p.display()),
            Action::DeletedDir(p) => write!(f, "Deleted directory: {}", p.display()),
            Action::DeletedFile(p) => write!(f, "Deleted file: {}", p.display()),
            Action::Renamed { from, to, kind } => {
                let noun = match kind {
                    NodeKind::File => "file",
                    NodeKind::Folder => "directory",
                };
                write!(f, "Renamed/moved {}: {} -> {}", noun, from.display(), to.display())
            }
        }
    }
}

/// Ordered record of everything one execution pass did. Replaced wholesale
/// on the next run.
#[derive(Debug, Default)]
pub struct ActionReport {
    actions: Vec<Action>,
}

impl ActionReport {
    /// The actions in the order they happened.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of recorded actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True when the pass found everything already satisfied.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn push(&mut self, action: Action) {
        log::info!("{action}");
        self.actions.push(action);
    }
}

impl fmt::Display for ActionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            writeln!(f, "{action}")?;
        }
        Ok(())
    }
}

/// Materializes templates against a base directory.
pub struct Executor<FS: FileSystem> {
    fs: FS,
}

impl<FS: FileSystem> Executor<FS> {
    /// Create an executor over the given filesystem.
    pub fn new(fs: FS) -> Self {
        Self { fs }
    }

    /// Make the filesystem under `base_dir` structurally match the template.
    ///
    /// Queued deletions run first and the queue is cleared unconditionally,
    /// whether or not each deletion succeeded. Existing entries at correct
    /// resolved paths are left untouched and unreported.
    pub fn execute(
        &self,
        template: &mut Template,
        base_dir: &Path,
        deletions: &mut Vec<PendingDeletion>,
    ) -> ActionReport {
        let mut report = ActionReport::default();

        self.apply_deletions(deletions, &mut report);

        // Remember where each node was last seen on disk before paths move.
        let order = topological_order(template);
        let known: HashMap<NodeId, Option<PathBuf>> = order
            .iter()
            .map(|id| {
                (
                    *id,
                    template
                        .node(*id)
                        .and_then(|n| n.disk_path().map(Path::to_path_buf)),
                )
            })
            .collect();

        template.rebase(base_dir);

        if !self.fs.exists(base_dir)
            && let Err(e) = self.fs.create_dir_all(base_dir)
        {
            log::warn!("failed to create base directory {}: {e}", base_dir.display());
            return report;
        }
        template.set_disk_path(template.root(), base_dir);

        for id in order {
            if id == template.root() {
                continue;
            }
            self.materialize(template, id, known.get(&id).cloned().flatten(), &mut report);
        }

        report
    }

    fn apply_deletions(&self, deletions: &mut Vec<PendingDeletion>, report: &mut ActionReport) {
        for deletion in deletions.drain(..) {
            if !self.fs.exists(&deletion.path) {
                // Tolerate entries deleted out from under us.
                continue;
            }
            let result = match deletion.kind {
                NodeKind::File => self.fs.remove_file(&deletion.path),
                NodeKind::Folder => self.fs.remove_dir_all(&deletion.path),
            };
            match (result, deletion.kind) {
                (Ok(()), NodeKind::File) => report.push(Action::DeletedFile(deletion.path)),
                (Ok(()), NodeKind::Folder) => report.push(Action::DeletedDir(deletion.path)),
                (Err(e), _) => {
                    log::warn!("failed to delete {}: {e}", deletion.path.display());
                }
            }
        }
    }

    fn materialize(
        &self,
        template: &mut Template,
        id: NodeId,
        known_path: Option<PathBuf>,
        report: &mut ActionReport,
    ) {
        let Some(node) = template.node(id) else {
            return;
        };
        let path = node.path().to_path_buf();
        let kind = node.kind();

        // The model knew this identity at a different path that still exists
        // on disk: carry the entry over instead of creating a fresh one.
        if let Some(old) = known_path
            && old != path
            && self.fs.exists(&old)
            && !self.fs.exists(&path)
        {
            match self.fs.rename(&old, &path) {
                Ok(()) => {
                    report.push(Action::Renamed {
                        from: old,
                        to: path.clone(),
                        kind,
                    });
                    template.set_disk_path(id, path);
                    return;
                }
                Err(e) => {
                    log::warn!(
                        "failed to move {} to {}: {e}",
                        old.display(),
                        path.display()
                    );
                }
            }
        }

        if self.fs.exists(&path) {
            // Already satisfied: no I/O, nothing recorded.
            template.set_disk_path(id, path);
            return;
        }

        match kind {
            NodeKind::Folder => match self.fs.create_dir_all(&path) {
                Ok(()) => {
                    report.push(Action::CreatedDir(path.clone()));
                    template.set_disk_path(id, path);
                }
                Err(e) => log::warn!("failed to create directory {}: {e}", path.display()),
            },
            NodeKind::File => {
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                    && !self.fs.exists(parent)
                    && let Err(e) = self.fs.create_dir_all(parent)
                {
                    log::warn!("failed to create directory {}: {e}", parent.display());
                    return;
                }
                match self.fs.create_new(&path, "") {
                    Ok(()) => {
                        report.push(Action::CreatedFile(path.clone()));
                        template.set_disk_path(id, path);
                    }
                    Err(e) => log::warn!("failed to create file {}: {e}", path.display()),
                }
            }
        }
    }
}

/// Order attached nodes so every folder comes before its children, using an
/// in-degree/queue pass rather than recursion so arbitrarily deep trees
/// cannot exhaust the stack.
fn topological_order(template: &Template) -> Vec<NodeId> {
    let ids = template.ids();
    let mut in_degree: HashMap<NodeId, usize> = ids.iter().map(|id| (*id, 0)).collect();
    for id in &ids {
        for child in template.children(*id) {
            *in_degree.entry(*child).or_insert(0) += 1;
        }
    }

    let mut queue: VecDeque<NodeId> = ids
        .iter()
        .filter(|id| in_degree[id] == 0)
        .copied()
        .collect();
    let mut order = Vec::with_capacity(ids.len());
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for child in template.children(id) {
            let degree = in_degree.get_mut(child).expect("child seen in ids");
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(*child);
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::fs::InMemoryFileSystem;
    use crate::node::Node;

    fn sample_template() -> Result<Template> {
        let mut template = Template::new("Proj")?;
        let src = template.add_node(template.root(), Node::new("src", "", NodeKind::Folder)?)?;
        template.add_node(src, Node::new("main.py", "", NodeKind::File)?)?;
        template.add_node(template.root(), Node::new("README.md", "", NodeKind::File)?)?;
        Ok(template)
    }

    #[test]
    fn test_execute_creates_structure_parent_before_child() {
        let fs = InMemoryFileSystem::new();
        let executor = Executor::new(fs.clone());
        let mut template = sample_template().unwrap();
        let mut deletions = Vec::new();

        let report = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);

        assert!(fs.is_dir(Path::new("/tmp/x/src")));
        assert!(fs.exists(Path::new("/tmp/x/src/main.py")));
        assert!(fs.exists(Path::new("/tmp/x/README.md")));

        assert_eq!(report.len(), 3);
        let src_pos = report
            .actions()
            .iter()
            .position(|a| *a == Action::CreatedDir("/tmp/x/src".into()))
            .unwrap();
        let main_pos = report
            .actions()
            .iter()
            .position(|a| *a == Action::CreatedFile("/tmp/x/src/main.py".into()))
            .unwrap();
        assert!(src_pos < main_pos, "parent before child in the report");
    }

    #[test]
    fn test_second_execute_is_silent() {
        let fs = InMemoryFileSystem::new();
        let executor = Executor::new(fs.clone());
        let mut template = sample_template().unwrap();
        let mut deletions = Vec::new();

        let first = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);
        assert!(!first.is_empty());

        let second = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);
        assert!(second.is_empty(), "unexpected actions: {second}");
    }

    #[test]
    fn test_existing_entries_left_untouched() {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/tmp/x/README.md"), "existing words").unwrap();
        let executor = Executor::new(fs.clone());
        let mut template = sample_template().unwrap();
        let mut deletions = Vec::new();

        let report = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);

        // README already satisfied: preserved and unreported.
        assert_eq!(
            fs.read_to_string(Path::new("/tmp/x/README.md")).unwrap(),
            "existing words"
        );
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_pending_deletion_reported_once() {
        let fs = InMemoryFileSystem::new();
        fs.write_file(Path::new("/tmp/x/old.txt"), "bye").unwrap();
        let executor = Executor::new(fs.clone());
        let mut template = Template::new("Proj").unwrap();
        let mut deletions = vec![PendingDeletion {
            path: "/tmp/x/old.txt".into(),
            kind: NodeKind::File,
        }];

        let report = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);
        assert!(!fs.exists(Path::new("/tmp/x/old.txt")));
        assert_eq!(
            report.actions(),
            &[Action::DeletedFile("/tmp/x/old.txt".into())]
        );
        assert!(deletions.is_empty(), "queue cleared after the pass");

        // Second run does not re-report the deletion.
        let report = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);
        assert!(report.is_empty());
    }

    #[test]
    fn test_deletion_of_missing_path_is_silent() {
        let fs = InMemoryFileSystem::new();
        let executor = Executor::new(fs.clone());
        let mut template = Template::new("Proj").unwrap();
        let mut deletions = vec![PendingDeletion {
            path: "/tmp/x/gone.txt".into(),
            kind: NodeKind::File,
        }];

        let report = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);
        assert!(report.is_empty());
        assert!(deletions.is_empty());
    }

    #[test]
    fn test_rename_detected_from_disk_identity() {
        let fs = InMemoryFileSystem::new();
        let executor = Executor::new(fs.clone());

        // First pass materializes "draft".
        let mut template = Template::new("Proj").unwrap();
        let draft = template
            .add_node(template.root(), Node::new("draft", "", NodeKind::Folder).unwrap())
            .unwrap();
        template
            .add_node(draft, Node::new("notes.txt", "", NodeKind::File).unwrap())
            .unwrap();
        let mut deletions = Vec::new();
        executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);
        assert!(fs.is_dir(Path::new("/tmp/x/draft")));

        // Rename in the model, then reconcile: the directory moves.
        template.rename(draft, "final").unwrap();
        let report = executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);

        assert!(!fs.exists(Path::new("/tmp/x/draft")));
        assert!(fs.is_dir(Path::new("/tmp/x/final")));
        assert!(fs.exists(Path::new("/tmp/x/final/notes.txt")));
        assert!(
            report
                .actions()
                .iter()
                .any(|a| matches!(a, Action::Renamed { .. })),
            "expected a rename action: {report}"
        );
    }

    #[test]
    fn test_rename_before_first_materialization_creates_new_name() {
        let fs = InMemoryFileSystem::new();
        let executor = Executor::new(fs.clone());
        let mut template = Template::new("Proj").unwrap();
        let draft = template
            .add_node(template.root(), Node::new("draft", "", NodeKind::Folder).unwrap())
            .unwrap();
        template.rename(draft, "final").unwrap();
        let mut deletions = Vec::new();

        executor.execute(&mut template, Path::new("/tmp/x"), &mut deletions);

        assert!(fs.is_dir(Path::new("/tmp/x/final")));
        assert!(!fs.exists(Path::new("/tmp/x/draft")));
    }

    #[test]
    fn test_topological_order_handles_deep_trees() {
        let mut template = Template::new("deep").unwrap();
        let mut parent = template.root();
        for i in 0..500 {
            parent = template
                .add_node(parent, Node::new(format!("d{i}"), "", NodeKind::Folder).unwrap())
                .unwrap();
        }

        let order = topological_order(&template);
        assert_eq!(order.len(), 501);
        // Every node appears after its parent.
        let index: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        for id in &order {
            if let Some(p) = template.find_parent(*id) {
                assert!(index[&p] < index[id]);
            }
        }
    }
}
