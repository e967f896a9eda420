//! kcdcli - Kubernetes cluster deployment CLI
//!
//! A command line tool that wraps terraform, ansible, and kubectl to
//! provision infrastructure, bootstrap a Kubernetes cluster through a
//! bastion host, and inspect the result across AWS, Azure, and GCP.

use clap::Parser;

mod ansible;
mod cli;
mod commands;
mod config;
mod discovery;
mod error;
mod inventory;
mod kubernetes;
mod operations;
mod probe;
mod process;
mod provider;
mod remote;
mod retry;
mod terraform;
mod ui;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Deploy(args) => commands::deploy::run(args, cli.verbose),
        Commands::Destroy(args) => commands::destroy::run(args, cli.verbose),
        Commands::Status(args) => commands::status::run(args, cli.verbose),
        Commands::Update(args) => commands::update::run(args, cli.verbose),
        Commands::Bootstrap(args) => commands::bootstrap::run(args, cli.verbose),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
