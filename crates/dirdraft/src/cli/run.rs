//! Execution command handler

use std::path::Path;

use crate::cli::CliSession;

/// Handle the 'execute' command: open the template, reconcile the target
/// directory with it, and report every action taken.
pub fn handle_execute(session: &mut CliSession, template: &str, target: &Path) -> bool {
    if let Err(e) = session.open_template(template) {
        eprintln!("✗ {}", e);
        return false;
    }
    let report = match session.execute(target) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ {}", e);
            return false;
        }
    };

    if report.is_empty() {
        println!("Nothing to do: {} already matches the template.", target.display());
    } else {
        print!("{}", report);
        println!(
            "Done: {} action(s) in {}.",
            report.len(),
            target.display()
        );
    }
    true
}
