//! Subcommand implementations.

pub mod account;
pub mod profile;
pub mod reminder;
