/// CLI module - command-line interface for dirdraft
mod cli;

fn main() {
    cli::run_cli();
}
