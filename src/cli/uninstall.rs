use clap::Parser;

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Uninstall a package:\n    kubesupv uninstall kubelet\n\n\
                  Uninstall several packages in order:\n    kubesupv remove kubelet containerd")]
pub struct UninstallArgs {
    /// Names of the packages to uninstall
    #[arg(required = true)]
    pub names: Vec<String>,
}
