use clap::Parser;

/// Arguments for the show command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show package information:\n    kubesupv show kubelet\n\n\
                  Check installed files against their recorded hashes:\n    kubesupv show kubelet --verify\n\n\
                  Print the full record as JSON:\n    kubesupv describe kubelet --json")]
pub struct ShowArgs {
    /// Package name
    pub name: String,

    /// Re-hash installed files and report changes
    #[arg(long)]
    pub verify: bool,

    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}
