//! Template persistence: serde document types and the on-disk store.
//!
//! One JSON file per template lives under a `templates/` directory inside
//! the user-chosen workspace. Deserialization rebuilds the tree top-down
//! through `attach`, so the duplicate-name and kind invariants are
//! re-validated on every load.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DirdraftError, Result};
use crate::fs::FileSystem;
use crate::node::{Node, NodeKind};
use crate::tree::{NodeId, Template};

/// Subdirectory of the workspace that holds template files.
pub const TEMPLATE_DIR: &str = "templates";

/// Extension used for persisted templates.
pub const TEMPLATE_EXT: &str = "json";

/// Persisted form of a whole template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDoc {
    /// Template name.
    pub name: String,
    /// The root node and, recursively, everything under it.
    pub root_node: NodeDoc,
}

/// Persisted form of one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDoc {
    /// Node name.
    pub name: String,
    /// Path at save time. Informational: paths are re-derived on load and
    /// may legitimately differ once the base directory changes.
    pub path: PathBuf,
    /// `"file"` or `"folder"`.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Tag set in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Child nodes in display order.
    #[serde(default)]
    pub children: Vec<NodeDoc>,
}

/// Serialize a template into its persisted document form.
pub fn to_doc(template: &Template) -> TemplateDoc {
    TemplateDoc {
        name: template.name().to_string(),
        root_node: node_doc(template, template.root()),
    }
}

fn node_doc(template: &Template, id: NodeId) -> NodeDoc {
    let node = template.node(id).expect("id from this template");
    NodeDoc {
        name: node.name().to_string(),
        path: node.path().to_path_buf(),
        kind: node.kind(),
        tags: node.tags().iter().cloned().collect(),
        children: template
            .children(id)
            .iter()
            .map(|child| node_doc(template, *child))
            .collect(),
    }
}

/// Rebuild a template from its persisted document form, re-validating every
/// invariant on the way. Any violation aborts the load.
pub fn from_doc(doc: TemplateDoc) -> Result<Template> {
    if doc.root_node.kind != NodeKind::Folder {
        return Err(DirdraftError::Serialization(
            "root node must be a folder".to_string(),
        ));
    }
    let root = Node::new(doc.root_node.name.clone(), doc.root_node.path.clone(), NodeKind::Folder)?
        .with_tags(doc.root_node.tags.iter().cloned());
    let mut template = Template::with_root(doc.name, root)?;
    let root_id = template.root();
    add_children(&mut template, root_id, &doc.root_node.children)?;
    Ok(template)
}

fn add_children(template: &mut Template, parent: NodeId, docs: &[NodeDoc]) -> Result<()> {
    for doc in docs {
        let node = Node::new(doc.name.clone(), PathBuf::new(), doc.kind)?
            .with_tags(doc.tags.iter().cloned());
        let id = template.insert(node);
        template.attach(parent, id)?;
        add_children(template, id, &doc.children)?;
    }
    Ok(())
}

/// Saves and loads templates as JSON files under `<workspace>/templates/`.
pub struct TemplateStore<FS: FileSystem> {
    fs: FS,
    dir: PathBuf,
}

impl<FS: FileSystem> TemplateStore<FS> {
    /// Create a store rooted at the given workspace directory.
    pub fn new(fs: FS, workspace_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: workspace_dir.into().join(TEMPLATE_DIR),
        }
    }

    /// Where a template of the given name is (or would be) stored.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{TEMPLATE_EXT}"))
    }

    /// Persist a template, pretty-printed, creating the directory if needed.
    pub fn save(&self, template: &Template) -> Result<PathBuf> {
        self.fs
            .create_dir_all(&self.dir)
            .map_err(|e| DirdraftError::fs(self.dir.clone(), e))?;
        let path = self.path_for(template.name());
        let json = serde_json::to_string_pretty(&to_doc(template))?;
        self.fs
            .write_file(&path, &json)
            .map_err(|e| DirdraftError::fs(path.clone(), e))?;
        log::info!("saved template '{}' to {}", template.name(), path.display());
        Ok(path)
    }

    /// Load a template by name. A malformed document aborts the load; the
    /// caller's current template is untouched.
    pub fn load(&self, name: &str) -> Result<Template> {
        let path = self.path_for(name);
        if !self.fs.exists(&path) {
            return Err(DirdraftError::TemplateNotFound(name.to_string()));
        }
        let json = self
            .fs
            .read_to_string(&path)
            .map_err(|e| DirdraftError::fs(path.clone(), e))?;
        let doc: TemplateDoc = serde_json::from_str(&json)?;
        let template = from_doc(doc)?;
        log::info!("loaded template '{}' from {}", template.name(), path.display());
        Ok(template)
    }

    /// Names of all stored templates, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.fs.exists(&self.dir) {
            return Ok(Vec::new());
        }
        let entries = self
            .fs
            .list_dir(&self.dir)
            .map_err(|e| DirdraftError::fs(self.dir.clone(), e))?;
        let mut names: Vec<String> = entries
            .into_iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == TEMPLATE_EXT))
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Delete a stored template file.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if !self.fs.exists(&path) {
            return Err(DirdraftError::TemplateNotFound(name.to_string()));
        }
        self.fs
            .remove_file(&path)
            .map_err(|e| DirdraftError::fs(path, e))
    }
}
