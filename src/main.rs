//! kubesupv - node package installer
//!
//! Applies unpacked package images to a host filesystem, keeps an install
//! record per package, and uses it to upgrade, describe and remove them.

use clap::Parser;

mod cli;
mod commands;
mod error;
mod hash;
mod hook;
mod installer;
mod logging;
mod manifest;
mod operations;
mod path_utils;
mod record;
mod temp;
mod template;
mod ui;
mod values;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let record_dir = cli.record_dir.as_path();
    let result = match &cli.command {
        Commands::Install(args) => commands::install::run(record_dir, args),
        Commands::Upgrade(args) => commands::upgrade::run(record_dir, args),
        Commands::Uninstall(args) => commands::uninstall::run(record_dir, args),
        Commands::List(args) => commands::list::run(record_dir, args),
        Commands::Show(args) => commands::show::run(record_dir, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
