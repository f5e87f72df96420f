use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    kubesupv completions bash > /etc/bash_completion.d/kubesupv\n\n\
                  Generate zsh completions:\n    kubesupv completions zsh > ~/.zfunc/_kubesupv\n\n\
                  Generate fish completions:\n    kubesupv completions fish > ~/.config/fish/completions/kubesupv.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
