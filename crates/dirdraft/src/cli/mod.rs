//! Command-line interface for dirdraft.

/// Clap argument definitions
mod args;

/// Interactive editing loop
mod edit;

/// Node edit command handlers
mod node;

/// Execution command handler
mod run;

/// Template lifecycle command handlers
mod template;

/// Shared CLI utilities
mod util;

use clap::Parser;
use std::path::PathBuf;

use dirdraft_core::fs::RealFileSystem;
use dirdraft_core::session::Session;

pub use args::Cli;
use args::Commands;

/// Type alias for a session over the real filesystem.
pub type CliSession = Session<RealFileSystem>;

/// Main entry point for the CLI
pub fn run_cli() {
    env_logger::init();
    let cli = Cli::parse();

    let workspace = cli.workspace.unwrap_or_else(|| PathBuf::from("."));
    let mut session = Session::new(RealFileSystem, workspace);

    let success = match cli.command {
        Commands::New { name } => template::handle_new(&mut session, &name),

        Commands::List => template::handle_list(&session),

        Commands::Show { name } => template::handle_show(&session, &name),

        Commands::Delete { name, yes } => template::handle_delete(&mut session, &name, yes),

        Commands::Import { directory, name } => {
            template::handle_import(&mut session, &directory, name.as_deref())
        }

        Commands::Add {
            template,
            parent,
            name,
            kind,
            tags,
        } => node::handle_add(&mut session, &template, &parent, &name, kind.into(), tags),

        Commands::Rename {
            template,
            path,
            new_name,
        } => node::handle_rename(&mut session, &template, &path, &new_name),

        Commands::Rm { template, path } => node::handle_rm(&mut session, &template, &path),

        Commands::Mv {
            template,
            path,
            new_parent,
        } => node::handle_mv(&mut session, &template, &path, &new_parent),

        Commands::Tag {
            template,
            path,
            tags,
        } => node::handle_tag(&mut session, &template, &path, tags),

        Commands::Execute { template, target } => {
            run::handle_execute(&mut session, &template, &target)
        }

        Commands::Edit { template } => edit::handle_edit(&mut session, &template),
    };

    if !success {
        std::process::exit(1);
    }
}
