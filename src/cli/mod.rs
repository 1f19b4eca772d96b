//! CLI module for anneal - command-line interface and subcommands.

pub mod commands;

pub use commands::Cli;
