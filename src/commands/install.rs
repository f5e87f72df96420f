//! Install command CLI wrapper
//!
//! Delegates to operations/install.rs and prints a one-line summary.

use std::path::Path;

use console::Style;

use crate::cli::InstallArgs;
use crate::error::Result;
use crate::installer::InstallerRegistry;
use crate::operations::{InstallAction, InstallOperation, InstallOptions, InstallSummary};

/// Run install command
pub fn run(record_dir: &Path, args: &InstallArgs) -> Result<()> {
    let options = InstallOptions::from_args(args, record_dir)?;
    let registry = InstallerRegistry::with_builtins();
    let summary = InstallOperation::new(&registry, options).install_or_upgrade()?;
    print!("{}", describe(&summary));
    Ok(())
}

/// Human-readable summary of an install or upgrade
pub(crate) fn describe(summary: &InstallSummary) -> String {
    let name = Style::new().bold().yellow().apply_to(&summary.name);
    let verb = match &summary.action {
        InstallAction::Installed => format!("Installed {name} {}", summary.version),
        InstallAction::Reinstalled => format!("Reinstalled {name} {}", summary.version),
        InstallAction::Upgraded { from } => {
            format!("Upgraded {name} {from} -> {}", summary.version)
        }
    };
    let mut line = format!("{verb} ({} files", summary.installed);
    if summary.removed > 0 {
        line.push_str(&format!(", {} removed", summary.removed));
    }
    line.push_str(")\n");
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(action: InstallAction, removed: usize) -> InstallSummary {
        InstallSummary {
            name: "kubelet".to_string(),
            version: "v2".to_string(),
            action,
            installed: 3,
            removed,
        }
    }

    #[test]
    fn test_describe_install() {
        let out = describe(&summary(InstallAction::Installed, 0));
        assert_eq!(console::strip_ansi_codes(&out), "Installed kubelet v2 (3 files)\n");
    }

    #[test]
    fn test_describe_upgrade() {
        let out = describe(&summary(
            InstallAction::Upgraded {
                from: "v1".to_string(),
            },
            2,
        ));
        assert_eq!(
            console::strip_ansi_codes(&out),
            "Upgraded kubelet v1 -> v2 (3 files, 2 removed)\n"
        );
    }
}
