//! Shell completions command

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::CompletionsArgs;
use crate::error::Result;

/// Generate shell completions
pub fn run(args: &CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut std::io::stdout().lock())
}

fn write_completions(shell: Shell, out: &mut impl Write) -> Result<()> {
    let mut cmd = <crate::cli::Cli as CommandFactory>::command();
    clap_complete::generate(shell, &mut cmd, "kubesupv", out);
    out.flush()?;
    Ok(())
}
