//! schedwatch - dashboard for neglected scheduled GitHub Actions workflows
//!
//! Reads a YAML watch list, asks GitHub for each workflow's schedule state
//! and latest scheduled run, and prints one health row per workflow.

use clap::Parser;

mod commands;
mod report;

use commands::Cli;

fn main() {
    schedwatch_core::logging::init();
    let cli = Cli::parse();

    match cli.execute() {
        Ok(status) => std::process::exit(status.code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
