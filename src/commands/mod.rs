//! Command implementations for kubesupv CLI
//!
//! Each command turns parsed arguments into an operation call and prints the
//! outcome. Diagnostics go through `tracing`; results go to stdout.

pub mod completions;
pub mod install;
pub mod list;
pub mod show;
pub mod uninstall;
pub mod upgrade;
pub mod version;
