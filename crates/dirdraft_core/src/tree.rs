//! Template tree: the composite structure rooted at one folder node.
//!
//! Nodes live in an arena indexed by [`NodeId`]. Each arena entry records its
//! parent id and ordered child ids, so there are no owning back-references
//! and a detached subtree stays intact (and reattachable) until the whole
//! template is dropped. Command history relies on this: removal is logical
//! detachment, not disposal.

use std::path::{Path, PathBuf};

use crate::error::{DirdraftError, Result};
use crate::node::{Node, NodeKind, validate_name};

/// Stable identity of a node within one template's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A template: a named tree of file/folder nodes rooted at one folder.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    root: NodeId,
    slots: Vec<Slot>,
}

impl Template {
    /// Create an empty template, synthesizing a folder root named after the
    /// template. The root path is a template-name placeholder until
    /// execution rebases it onto a real base directory.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let root = Node::new(name.clone(), PathBuf::from(&name), NodeKind::Folder)?;
        Self::with_root(name, root)
    }

    /// Create a template from a supplied root node, which must be a folder.
    pub fn with_root(name: impl Into<String>, mut root: Node) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DirdraftError::InvalidName(name));
        }
        if !root.kind().is_folder() {
            return Err(DirdraftError::NotAFolder(root.name().to_string()));
        }
        root.mark_root();
        Ok(Self {
            name,
            root: NodeId(0),
            slots: vec![Slot {
                node: root,
                parent: None,
                children: Vec::new(),
            }],
        })
    }

    /// The template's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the template (not the root node).
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DirdraftError::InvalidName(name));
        }
        self.name = name;
        Ok(())
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node by id. Returns `None` for ids foreign to this arena.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).map(|s| &s.node)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).map(|s| &mut s.node)
    }

    /// Ordered child ids of a node (empty for files and unknown ids).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots.get(id.0).map(|s| s.children.as_slice()).unwrap_or(&[])
    }

    /// The parent of a node; `None` for the root and for detached nodes.
    pub fn find_parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.0).and_then(|s| s.parent)
    }

    /// Position of `child` in `parent`'s child list.
    pub fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.slots
            .get(parent.0)
            .and_then(|s| s.children.iter().position(|c| *c == child))
    }

    /// True when the node can be reached from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.find_parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Add a node to the arena without attaching it anywhere.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            node,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Fails with [`DirdraftError::NotAFolder`] if the parent is a file and
    /// with [`DirdraftError::DuplicateName`] if a sibling already carries the
    /// child's name (the root is exempt from the duplicate check). Attaching
    /// a node to the parent it already hangs under is a no-op. A node already
    /// attached elsewhere is detached from its old parent first.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let position = self.children(parent).len();
        self.attach_at(parent, child, position)
    }

    /// Attach `child` under `parent` at a specific position.
    pub fn attach_at(&mut self, parent: NodeId, child: NodeId, position: usize) -> Result<()> {
        let parent_slot = self
            .slots
            .get(parent.0)
            .ok_or_else(|| DirdraftError::NodeNotFound(format!("node #{}", parent.0)))?;
        if !parent_slot.node.kind().is_folder() {
            return Err(DirdraftError::NotAFolder(parent_slot.node.name().to_string()));
        }
        let child_slot = self
            .slots
            .get(child.0)
            .ok_or_else(|| DirdraftError::NodeNotFound(format!("node #{}", child.0)))?;
        let child_name = child_slot.node.name().to_string();

        if child_slot.parent == Some(parent) {
            // Already in place: repeated redo of the same Add must be harmless.
            return Ok(());
        }

        // A node may never end up beneath its own subtree.
        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(DirdraftError::MoveIntoOwnSubtree(child_name));
            }
            cursor = self.slots[ancestor.0].parent;
        }

        // Sibling names are unique, except directly under the root.
        if parent != self.root {
            let duplicate = self.slots[parent.0]
                .children
                .iter()
                .any(|c| self.slots[c.0].node.name() == child_name);
            if duplicate {
                return Err(DirdraftError::DuplicateName {
                    parent: self.slots[parent.0].node.name().to_string(),
                    name: child_name,
                });
            }
        }

        if let Some(old_parent) = self.slots[child.0].parent {
            self.detach(old_parent, child);
        }

        let position = position.min(self.slots[parent.0].children.len());
        self.slots[parent.0].children.insert(position, child);
        self.slots[child.0].parent = Some(parent);
        self.refresh_paths(child);
        Ok(())
    }

    /// Detach `child` from `parent`, leaving the subtree intact in the arena.
    ///
    /// When the child is not actually under that parent this logs a warning
    /// and does nothing. Returns the position the child held, if any.
    pub fn detach(&mut self, parent: NodeId, child: NodeId) -> Option<usize> {
        let actual = self.slots.get(child.0).and_then(|s| s.parent);
        if actual != Some(parent) {
            log::warn!(
                "detach: node #{} is not a child of node #{}; ignoring",
                child.0,
                parent.0
            );
            return None;
        }
        let position = self.position(parent, child)?;
        self.slots[parent.0].children.remove(position);
        self.slots[child.0].parent = None;
        Some(position)
    }

    /// Low-level rename: updates the name and re-derives the subtree's paths.
    ///
    /// No duplicate-name validation happens here; validated entry points
    /// (session operations) check before issuing the command.
    pub fn rename(&mut self, id: NodeId, new_name: impl Into<String>) -> Result<()> {
        let slot = self
            .slots
            .get_mut(id.0)
            .ok_or_else(|| DirdraftError::NodeNotFound(format!("node #{}", id.0)))?;
        slot.node.set_name(new_name);
        self.refresh_paths(id);
        Ok(())
    }

    /// Re-derive `id`'s path from its parent, then every descendant's path,
    /// parent before child.
    pub(crate) fn refresh_paths(&mut self, id: NodeId) {
        if self.slots.get(id.0).is_none() {
            return;
        }
        if let Some(parent) = self.slots[id.0].parent {
            let derived = self.slots[parent.0]
                .node
                .path()
                .join(self.slots[id.0].node.name());
            self.slots[id.0].node.set_path(derived);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let base = self.slots[current.0].node.path().to_path_buf();
            let children = self.slots[current.0].children.clone();
            for child in children {
                let derived = base.join(self.slots[child.0].node.name());
                self.slots[child.0].node.set_path(derived);
                stack.push(child);
            }
        }
    }

    /// Point the root at a base directory and re-derive every attached
    /// node's path, parent before child.
    pub fn rebase(&mut self, base_dir: &Path) {
        self.slots[self.root.0].node.set_path(base_dir);
        self.refresh_paths(self.root);
    }

    /// Pre-order walk over every attached node, parent before children.
    /// Mutating the tree during traversal is not possible (shared borrow).
    pub fn traverse<F: FnMut(&Node)>(&self, mut visit: F) {
        self.visit(|node, _| visit(node));
    }

    /// Pre-order walk with the depth of each node (root = 0).
    pub fn visit<F: FnMut(&Node, usize)>(&self, mut visit: F) {
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            visit(&self.slots[id.0].node, depth);
            for child in self.slots[id.0].children.iter().rev() {
                stack.push((*child, depth + 1));
            }
        }
    }

    /// Attached node ids in pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            for child in self.slots[id.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    /// Number of attached nodes, root included.
    pub fn node_count(&self) -> usize {
        self.ids().len()
    }

    /// Resolve a root-relative path like `"src/main.py"` to a node id.
    /// Empty string and `"."` address the root.
    pub fn node_at(&self, rel_path: &str) -> Option<NodeId> {
        let mut current = self.root;
        for segment in rel_path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            let next = self.slots[current.0]
                .children
                .iter()
                .find(|c| self.slots[c.0].node.name() == segment)
                .copied()?;
            current = next;
        }
        Some(current)
    }

    pub(crate) fn set_disk_path(&mut self, id: NodeId, path: impl Into<PathBuf>) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.node.set_disk_path(path);
        }
    }

    /// Convenience used by validated entry points: check that no sibling of
    /// a prospective child under `parent` carries `name` (root exempt).
    pub fn has_child_named(&self, parent: NodeId, name: &str) -> bool {
        self.children(parent)
            .iter()
            .any(|c| self.slots[c.0].node.name() == name)
    }

    /// Add a validated node under a parent in one step.
    pub fn add_node(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        validate_name(node.name())?;
        let id = self.insert(node);
        self.attach(parent, id)?;
        Ok(id)
    }
}
