//! Chat command handling for the drive relay bot

pub mod command;
pub mod help;

pub use command::Command;
