//! Session: one open template plus its history and deletion queue.
//!
//! The session is the validated entry point the CLI (or any other frontend)
//! talks to. Every structural edit resolves root-relative paths to node ids,
//! validates, and goes through the command log so it can be undone. Direct
//! tree mutation stays inside this crate.

use std::path::{Path, PathBuf};

use crate::command::{Command, CommandLog};
use crate::error::{DirdraftError, Result};
use crate::executor::{ActionReport, Executor, PendingDeletion};
use crate::fs::FileSystem;
use crate::node::{Node, NodeKind, validate_name};
use crate::scanner::Scanner;
use crate::store::TemplateStore;
use crate::tree::{NodeId, Template};

/// An editing session over one workspace directory.
///
/// Holds at most one open template, its undo/redo history, and the queue of
/// on-disk deletions to apply on the next execution pass.
pub struct Session<FS: FileSystem + Clone> {
    fs: FS,
    store: TemplateStore<FS>,
    template: Option<Template>,
    log: CommandLog,
    pending_deletions: Vec<PendingDeletion>,
    dirty: bool,
}

impl<FS: FileSystem + Clone> Session<FS> {
    /// Create a session rooted at the given workspace directory. Templates
    /// are stored under `<workspace>/templates/`.
    pub fn new(fs: FS, workspace_dir: impl Into<PathBuf>) -> Self {
        let store = TemplateStore::new(fs.clone(), workspace_dir);
        Self {
            fs,
            store,
            template: None,
            log: CommandLog::new(),
            pending_deletions: Vec::new(),
            dirty: false,
        }
    }

    /// The currently open template, if any.
    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// True when the open template has changes not yet saved to the store.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True when there is something to undo.
    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    /// True when there is something to redo.
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Deletions queued for the next execution pass.
    pub fn pending_deletions(&self) -> &[PendingDeletion] {
        &self.pending_deletions
    }

    fn open(&mut self, template: Template, dirty: bool) {
        self.template = Some(template);
        self.log.clear();
        self.pending_deletions.clear();
        self.dirty = dirty;
    }

    fn resolve(template: &Template, rel_path: &str) -> Result<NodeId> {
        template
            .node_at(rel_path)
            .ok_or_else(|| DirdraftError::NodeNotFound(rel_path.to_string()))
    }

    // --- template lifecycle -------------------------------------------------

    /// Start a fresh, unsaved template. Replaces the open one.
    pub fn create_template(&mut self, name: &str) -> Result<()> {
        let template = Template::new(name)?;
        self.open(template, true);
        Ok(())
    }

    /// Open a stored template by name. On failure the previously open
    /// template (if any) is left untouched.
    pub fn open_template(&mut self, name: &str) -> Result<()> {
        let template = self.store.load(name)?;
        self.open(template, false);
        Ok(())
    }

    /// Build a template from an existing directory and open it. The scan
    /// result is unsaved until [`Session::save_template`].
    pub fn import_directory(&mut self, dir: &Path, name: Option<&str>) -> Result<()> {
        let mut template = Scanner::new(self.fs.clone()).scan(dir)?;
        if let Some(name) = name {
            template.set_name(name)?;
        }
        self.open(template, true);
        Ok(())
    }

    /// Persist the open template to the store.
    pub fn save_template(&mut self) -> Result<PathBuf> {
        let template = self.template.as_ref().ok_or(DirdraftError::NoTemplateOpen)?;
        let path = self.store.save(template)?;
        self.dirty = false;
        Ok(path)
    }

    /// Close the open template, dropping its history and queued deletions.
    pub fn close_template(&mut self) {
        self.template = None;
        self.log.clear();
        self.pending_deletions.clear();
        self.dirty = false;
    }

    /// Names of all templates in the store, sorted.
    pub fn list_templates(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Load a stored template without opening it (for display).
    pub fn peek_template(&self, name: &str) -> Result<Template> {
        self.store.load(name)
    }

    /// Delete a template from the store. The open template is unaffected.
    pub fn delete_template(&mut self, name: &str) -> Result<()> {
        self.store.delete(name)
    }

    // --- structural edits ---------------------------------------------------

    /// Add a node under the folder at `parent_rel` (root-relative path;
    /// `""` or `"."` for the root).
    pub fn add_node<I, S>(
        &mut self,
        parent_rel: &str,
        name: &str,
        kind: NodeKind,
        tags: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let parent = Self::resolve(template, parent_rel)?;
        let node = Node::new(name, PathBuf::new(), kind)?.with_tags(tags);
        let id = template.insert(node);
        self.log
            .push(Command::Add { parent, node: id }, template, &self.fs)?;
        self.dirty = true;
        Ok(())
    }

    /// Rename the node at `rel_path`.
    pub fn rename_node(&mut self, rel_path: &str, new_name: &str) -> Result<()> {
        validate_name(new_name)?;
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let id = Self::resolve(template, rel_path)?;
        let old_name = template
            .node(id)
            .map(|n| n.name().to_string())
            .ok_or_else(|| DirdraftError::NodeNotFound(rel_path.to_string()))?;
        if old_name == new_name {
            return Ok(());
        }
        if let Some(parent) = template.find_parent(id)
            && parent != template.root()
            && template.has_child_named(parent, new_name)
        {
            let parent_name = template
                .node(parent)
                .map(|n| n.name().to_string())
                .unwrap_or_default();
            return Err(DirdraftError::DuplicateName {
                parent: parent_name,
                name: new_name.to_string(),
            });
        }
        self.log.push(
            Command::Rename {
                node: id,
                old_name,
                new_name: new_name.to_string(),
            },
            template,
            &self.fs,
        )?;
        self.dirty = true;
        Ok(())
    }

    /// Remove the node at `rel_path` from the template. If the node exists
    /// on disk it is also queued for deletion on the next execution pass;
    /// undoing the removal does not unqueue it.
    pub fn remove_node(&mut self, rel_path: &str) -> Result<()> {
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let id = Self::resolve(template, rel_path)?;
        // The root has no parent and cannot be removed.
        let parent = template
            .find_parent(id)
            .ok_or_else(|| DirdraftError::NodeNotFound(rel_path.to_string()))?;
        let position = template
            .position(parent, id)
            .ok_or_else(|| DirdraftError::NodeNotFound(rel_path.to_string()))?;

        let (path, kind) = {
            let node = template
                .node(id)
                .ok_or_else(|| DirdraftError::NodeNotFound(rel_path.to_string()))?;
            (node.path().to_path_buf(), node.kind())
        };

        self.log.push(
            Command::Remove {
                parent,
                node: id,
                position,
            },
            template,
            &self.fs,
        )?;

        if !path.as_os_str().is_empty() && self.fs.exists(&path) {
            log::info!("queueing on-disk deletion of {}", path.display());
            self.pending_deletions.push(PendingDeletion { path, kind });
        }
        self.dirty = true;
        Ok(())
    }

    /// Move the node at `rel_path` under the folder at `new_parent_rel`.
    pub fn move_node(&mut self, rel_path: &str, new_parent_rel: &str) -> Result<()> {
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let id = Self::resolve(template, rel_path)?;
        let new_parent = Self::resolve(template, new_parent_rel)?;
        let old_parent = template
            .find_parent(id)
            .ok_or_else(|| DirdraftError::NodeNotFound(rel_path.to_string()))?;
        if old_parent == new_parent {
            return Ok(());
        }
        let old_position = template
            .position(old_parent, id)
            .ok_or_else(|| DirdraftError::NodeNotFound(rel_path.to_string()))?;
        self.log.push(
            Command::Move {
                node: id,
                old_parent,
                old_position,
                new_parent,
            },
            template,
            &self.fs,
        )?;
        self.dirty = true;
        Ok(())
    }

    /// Add tags to the node at `rel_path`. Tagging is not part of the undo
    /// history.
    pub fn tag_node<I, S>(&mut self, rel_path: &str, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let id = Self::resolve(template, rel_path)?;
        if let Some(node) = template.node_mut(id) {
            node.insert_tags(tags);
        }
        self.dirty = true;
        Ok(())
    }

    // --- history ------------------------------------------------------------

    /// Undo the most recent edit. Returns `false` when the history is empty.
    pub fn undo(&mut self) -> Result<bool> {
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let undone = self.log.undo(template, &self.fs)?;
        if undone {
            self.dirty = true;
        }
        Ok(undone)
    }

    /// Replay the most recently undone edit. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let redone = self.log.redo(template, &self.fs)?;
        if redone {
            self.dirty = true;
        }
        Ok(redone)
    }

    // --- execution ----------------------------------------------------------

    /// Reconcile `base_dir` with the open template: apply queued deletions,
    /// create what is missing, move what was renamed. Afterwards the model
    /// is rebuilt from the directory so edits operate on ground truth, and
    /// the history is cleared.
    pub fn execute(&mut self, base_dir: &Path) -> Result<ActionReport> {
        let template = self.template.as_mut().ok_or(DirdraftError::NoTemplateOpen)?;
        let name = template.name().to_string();

        let executor = Executor::new(self.fs.clone());
        let report = executor.execute(template, base_dir, &mut self.pending_deletions);

        match Scanner::new(self.fs.clone()).scan(base_dir) {
            Ok(mut scanned) => {
                scanned.set_name(name)?;
                self.template = Some(scanned);
                self.log.clear();
            }
            Err(e) => {
                log::warn!("post-execution rescan of {} failed: {e}", base_dir.display());
            }
        }
        self.dirty = true;
        Ok(report)
    }
}
