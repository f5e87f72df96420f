//! Operations module for kubesupv workflows
//!
//! Each operation owns one user-facing workflow:
//! - **install**: install or upgrade a package source (`InstallOperation`)
//! - **uninstall**: remove packages by name (`UninstallOperation`)
//! - **list**: enumerate install records (`ListOperation`)
//! - **show**: describe one package, optionally verifying hashes (`ShowOperation`)

pub mod install;
pub mod list;
pub mod show;
pub mod uninstall;

pub use install::{InstallAction, InstallOperation, InstallOptions, InstallSummary};
pub use list::ListOperation;
pub use show::{FileCheck, ShowOperation, ShowOptions, ShowReport};
pub use uninstall::{UninstallOperation, UninstallOptions};
