//! Interactive editing loop
//!
//! A small line-based shell over one open template, with the full undo/redo
//! history and deletion queue of the session available across edits.

use std::io::{self, BufRead, Write};
use std::path::Path;

use dirdraft_core::node::NodeKind;

use crate::cli::CliSession;
use crate::cli::util::{confirm, render_tree};

const HELP: &str = "\
Commands:
  add <parent> <name> [file|folder]   add a node (default: file)
  rename <path> <new-name>            rename a node
  rm <path>                           remove a node (queues on-disk deletion)
  mv <path> <new-parent>              move a node
  tag <path> <tag>...                 add tags to a node
  undo / redo                         step through the edit history
  tree                                print the current tree
  execute <dir>                       materialize into a directory
  save                                save the template
  help                                show this help
  quit                                leave (prompts to save unsaved changes)";

/// Handle the 'edit' command
pub fn handle_edit(session: &mut CliSession, template: &str) -> bool {
    if let Err(e) = session.open_template(template) {
        eprintln!("✗ {}", e);
        return false;
    }
    println!("Editing template '{}'. Type 'help' for commands.", template);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("dirdraft> ");
        if io::stdout().flush().is_err() {
            break;
        }
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => break,
        };
        let words: Vec<&str> = line.split_whitespace().collect();
        let quit = match dispatch(session, &words) {
            Ok(quit) => quit,
            Err(e) => {
                eprintln!("✗ {}", e);
                false
            }
        };
        if quit {
            break;
        }
    }

    if session.is_dirty() && confirm("Save unsaved changes?") {
        if let Err(e) = session.save_template() {
            eprintln!("✗ {}", e);
            return false;
        }
        println!("Saved.");
    }
    true
}

/// Run one command line. Returns `Ok(true)` when the loop should end.
fn dispatch(session: &mut CliSession, words: &[&str]) -> dirdraft_core::error::Result<bool> {
    match words {
        [] => {}

        ["add", parent, name] => {
            session.add_node(parent, name, NodeKind::File, Vec::<String>::new())?;
        }
        ["add", parent, name, kind] => {
            let kind = match *kind {
                "folder" | "dir" => NodeKind::Folder,
                _ => NodeKind::File,
            };
            session.add_node(parent, name, kind, Vec::<String>::new())?;
        }

        ["rename", path, new_name] => session.rename_node(path, new_name)?,

        ["rm", path] => {
            session.remove_node(path)?;
            if !session.pending_deletions().is_empty() {
                println!(
                    "{} on-disk deletion(s) queued for the next execute.",
                    session.pending_deletions().len()
                );
            }
        }

        ["mv", path, new_parent] => session.move_node(path, new_parent)?,

        ["tag", path, tags @ ..] if !tags.is_empty() => {
            session.tag_node(path, tags.iter().copied())?;
        }

        ["undo"] => {
            if !session.undo()? {
                println!("Nothing to undo.");
            }
        }
        ["redo"] => {
            if !session.redo()? {
                println!("Nothing to redo.");
            }
        }

        ["tree"] => {
            if let Some(t) = session.template() {
                print!("{}", render_tree(t));
            }
        }

        ["execute", dir] => {
            let report = session.execute(Path::new(dir))?;
            if report.is_empty() {
                println!("Nothing to do.");
            } else {
                print!("{}", report);
            }
        }

        ["save"] => {
            let path = session.save_template()?;
            println!("Saved to {}.", path.display());
        }

        ["help"] => println!("{HELP}"),

        ["quit"] | ["exit"] | ["q"] => return Ok(true),

        _ => println!("Unknown command. Type 'help' for the command list."),
    }
    Ok(false)
}
