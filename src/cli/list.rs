use clap::Parser;

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List all installed packages:\n    kubesupv list\n\n\
                  Print records as JSON:\n    kubesupv list --json")]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}
