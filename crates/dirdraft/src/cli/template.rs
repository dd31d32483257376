//! Template lifecycle command handlers

use std::path::Path;

use crate::cli::CliSession;
use crate::cli::util::{confirm, render_tree};

/// Handle the 'new' command
pub fn handle_new(session: &mut CliSession, name: &str) -> bool {
    if let Err(e) = session.create_template(name) {
        eprintln!("✗ {}", e);
        return false;
    }
    match session.save_template() {
        Ok(path) => {
            println!("Created template '{}' at {}", name, path.display());
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}

/// Handle the 'list' command
pub fn handle_list(session: &CliSession) -> bool {
    let names = match session.list_templates() {
        Ok(names) => names,
        Err(e) => {
            eprintln!("✗ {}", e);
            return false;
        }
    };

    if names.is_empty() {
        println!("No templates found.");
        return true;
    }

    println!("Available templates:\n");
    for name in names {
        println!("  {}", name);
    }
    println!();
    println!("Use 'dirdraft show <name>' to view a template's tree.");
    true
}

/// Handle the 'show' command
pub fn handle_show(session: &CliSession, name: &str) -> bool {
    match session.peek_template(name) {
        Ok(template) => {
            println!("Template: {}\n", template.name());
            print!("{}", render_tree(&template));
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            eprintln!("  Use 'dirdraft list' to see available templates.");
            false
        }
    }
}

/// Handle the 'delete' command
pub fn handle_delete(session: &mut CliSession, name: &str, yes: bool) -> bool {
    if !yes && !confirm(&format!("Delete template '{}'?", name)) {
        println!("Cancelled.");
        return true;
    }
    match session.delete_template(name) {
        Ok(()) => {
            println!("Deleted template '{}'.", name);
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}

/// Handle the 'import' command
pub fn handle_import(session: &mut CliSession, directory: &Path, name: Option<&str>) -> bool {
    if let Err(e) = session.import_directory(directory, name) {
        eprintln!("✗ {}", e);
        return false;
    }
    match session.save_template() {
        Ok(path) => {
            let template = session.template().map(|t| t.name().to_string());
            println!(
                "Imported '{}' as template '{}' ({})",
                directory.display(),
                template.unwrap_or_default(),
                path.display()
            );
            true
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            false
        }
    }
}
