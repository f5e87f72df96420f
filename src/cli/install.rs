use clap::Parser;
use std::path::PathBuf;

/// Arguments for the install and upgrade commands
#[derive(Parser, Debug, Clone)]
#[command(after_help = "EXAMPLES:\n  \
                  Install an unpacked package:\n    kubesupv install ./containerd\n\n\
                  Install into an alternate root:\n    kubesupv install ./containerd --root /mnt/sysroot\n\n\
                  Override values:\n    kubesupv install ./kubelet -f node.yaml --set kubelet.maxPods=110\n\n\
                  Record where the package came from:\n    kubesupv install ./kubelet --image registry.local/kubelet:v1.28.2")]
pub struct InstallArgs {
    /// Package source directory containing manifest.yaml
    pub source: PathBuf,

    /// Destination root the package files are installed under
    #[arg(long, env = "KUBESUPV_INSTALL_ROOT", default_value = "/")]
    pub root: PathBuf,

    /// Image reference recorded as the package provenance
    #[arg(long)]
    pub image: Option<String>,

    /// YAML values file; may be repeated, later files win
    #[arg(long = "values", short = 'f', value_name = "FILE")]
    pub values_files: Vec<PathBuf>,

    /// Set a value (key.path=value); may be repeated, applied after files
    #[arg(long, value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}
