//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - install: Install and upgrade command arguments
//! - uninstall: Uninstall command arguments
//! - list: List command arguments
//! - show: Show command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod install;
pub mod list;
pub mod show;
pub mod uninstall;

pub use completions::CompletionsArgs;
pub use install::InstallArgs;
pub use list::ListArgs;
pub use show::ShowArgs;
pub use uninstall::UninstallArgs;

/// Default location of install records
pub const DEFAULT_RECORD_DIR: &str = "/var/lib/kubesupv/packages";

/// kubesupv - node package installer
///
/// Install, upgrade and remove versioned packages on a host filesystem.
#[derive(Parser, Debug)]
#[command(
    name = "kubesupv",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Node package installer for Kubernetes hosts",
    long_about = "kubesupv applies unpacked package images (a manifest.yaml plus the files it \
                  references) to a host filesystem, records what it installed, and uses that \
                  record to upgrade or remove the package later.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  kubesupv install ./containerd              \x1b[90m# Install or upgrade a package\x1b[0m\n   \
                  kubesupv install ./kubelet --set a.b=1     \x1b[90m# Override a value\x1b[0m\n   \
                  kubesupv upgrade ./kubelet                 \x1b[90m# Upgrade an installed package\x1b[0m\n   \
                  kubesupv list                              \x1b[90m# List installed packages\x1b[0m\n   \
                  kubesupv show kubelet --verify             \x1b[90m# Describe and verify a package\x1b[0m\n   \
                  kubesupv uninstall kubelet                 \x1b[90m# Remove a package\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Directory holding install records
    #[arg(
        long,
        global = true,
        env = "KUBESUPV_RECORD_DIR",
        default_value = DEFAULT_RECORD_DIR
    )]
    pub record_dir: PathBuf,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a package, upgrading it when another version is installed
    Install(InstallArgs),

    /// Upgrade an installed package
    Upgrade(InstallArgs),

    /// Remove installed packages
    #[command(visible_alias = "remove")]
    Uninstall(UninstallArgs),

    /// List installed packages
    List(ListArgs),

    /// Show package information
    #[command(visible_alias = "describe")]
    Show(ShowArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_list() {
        let cli = Cli::try_parse_from(["kubesupv", "list", "--json"]).unwrap();
        match cli.command {
            Commands::List(args) => assert!(args.json),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_parsing_install() {
        let cli = Cli::try_parse_from([
            "kubesupv",
            "install",
            "./pkg",
            "--root",
            "/host",
            "--image",
            "registry.local/pkg:v1",
            "-f",
            "a.yaml",
            "-f",
            "b.yaml",
            "--set",
            "x=1",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.source, PathBuf::from("./pkg"));
                assert_eq!(args.root, PathBuf::from("/host"));
                assert_eq!(args.image.as_deref(), Some("registry.local/pkg:v1"));
                assert_eq!(
                    args.values_files,
                    [PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]
                );
                assert_eq!(args.set, ["x=1"]);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_install_defaults() {
        let cli = Cli::try_parse_from(["kubesupv", "upgrade", "./pkg"]).unwrap();
        match cli.command {
            Commands::Upgrade(args) => {
                assert_eq!(args.root, PathBuf::from("/"));
                assert!(args.image.is_none());
                assert!(args.values_files.is_empty());
            }
            _ => panic!("Expected Upgrade command"),
        }
    }

    #[test]
    fn test_cli_parsing_show_alias() {
        let cli = Cli::try_parse_from(["kubesupv", "describe", "kubelet", "--verify"]).unwrap();
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.name, "kubelet");
                assert!(args.verify);
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_cli_parsing_remove_alias_multiple() {
        let cli = Cli::try_parse_from(["kubesupv", "remove", "a", "b"]).unwrap();
        match cli.command {
            Commands::Uninstall(args) => assert_eq!(args.names, ["a", "b"]),
            _ => panic!("Expected Uninstall command"),
        }
    }

    #[test]
    fn test_cli_uninstall_requires_name() {
        assert!(Cli::try_parse_from(["kubesupv", "uninstall"]).is_err());
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["kubesupv", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_options() {
        let cli =
            Cli::try_parse_from(["kubesupv", "list", "-v", "--record-dir", "/tmp/records"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.record_dir, PathBuf::from("/tmp/records"));
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["kubesupv", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, clap_complete::Shell::Bash);
            }
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_completions_rejects_unknown_shell() {
        assert!(Cli::try_parse_from(["kubesupv", "completions", "tcsh"]).is_err());
    }
}
