//! Command implementations for the kcdcli CLI

pub mod bootstrap;
pub mod completions;
pub mod deploy;
pub mod destroy;
pub mod status;
pub mod update;
pub mod version;
