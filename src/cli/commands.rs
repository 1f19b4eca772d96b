//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - direct: single-shot answer, no refinement
//! - refine: full refinement run

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Anneal - bounded self-refinement over a text generation service
#[derive(Parser, Debug)]
#[command(name = "anneal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question with a single generation call
    Direct {
        /// The question to answer
        question: String,

        /// Supplementary text, may embed up to 3 URLs to ingest
        #[arg(short, long)]
        sources: Option<String>,
    },

    /// Run the full refinement loop on a question
    Refine {
        /// The question to answer
        question: String,

        /// Supplementary text, may embed up to 3 URLs to ingest
        #[arg(short, long)]
        sources: Option<String>,

        /// Pre-supplied core facts (skips fact extraction)
        #[arg(short, long)]
        facts: Option<String>,

        /// Also produce a direct answer and compare against it
        #[arg(long)]
        compare_direct: bool,

        /// Print the per-iteration log
        #[arg(short, long)]
        iterations: bool,
    },
}
