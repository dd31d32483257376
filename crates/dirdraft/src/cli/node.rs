//! Node edit command handlers
//!
//! Each handler opens the named template, applies one edit, and saves.

use dirdraft_core::node::NodeKind;

use crate::cli::CliSession;
use crate::cli::util::render_tree;

fn with_open_template<F>(session: &mut CliSession, template: &str, edit: F) -> bool
where
    F: FnOnce(&mut CliSession) -> dirdraft_core::error::Result<()>,
{
    if let Err(e) = session.open_template(template) {
        eprintln!("✗ {}", e);
        return false;
    }
    if let Err(e) = edit(session) {
        eprintln!("✗ {}", e);
        return false;
    }
    if let Err(e) = session.save_template() {
        eprintln!("✗ {}", e);
        return false;
    }
    if let Some(t) = session.template() {
        print!("{}", render_tree(t));
    }
    true
}

/// Handle the 'add' command
pub fn handle_add(
    session: &mut CliSession,
    template: &str,
    parent: &str,
    name: &str,
    kind: NodeKind,
    tags: Vec<String>,
) -> bool {
    with_open_template(session, template, |s| s.add_node(parent, name, kind, tags))
}

/// Handle the 'rename' command
pub fn handle_rename(
    session: &mut CliSession,
    template: &str,
    path: &str,
    new_name: &str,
) -> bool {
    with_open_template(session, template, |s| s.rename_node(path, new_name))
}

/// Handle the 'rm' command
pub fn handle_rm(session: &mut CliSession, template: &str, path: &str) -> bool {
    with_open_template(session, template, |s| {
        s.remove_node(path)?;
        if !s.pending_deletions().is_empty() {
            println!(
                "Note: the on-disk entry still exists; it is only removed from the template."
            );
        }
        Ok(())
    })
}

/// Handle the 'mv' command
pub fn handle_mv(
    session: &mut CliSession,
    template: &str,
    path: &str,
    new_parent: &str,
) -> bool {
    with_open_template(session, template, |s| s.move_node(path, new_parent))
}

/// Handle the 'tag' command
pub fn handle_tag(
    session: &mut CliSession,
    template: &str,
    path: &str,
    tags: Vec<String>,
) -> bool {
    with_open_template(session, template, |s| s.tag_node(path, tags))
}
