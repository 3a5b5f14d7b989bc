//! Subcommand handlers.

pub mod canonicalize;
pub mod config_cmd;
pub mod id;
pub mod sites;
