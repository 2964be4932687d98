//! CLI module for pdfrag-server
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pdfrag - question answering over uploaded PDFs
#[derive(Parser, Debug)]
#[command(
    name = "pdfrag-server",
    version,
    about = "HTTP assistant that answers questions about uploaded PDFs",
    long_about = "Indexes uploaded PDF documents into a vector store and answers questions\n\
                  with a local Ollama model constrained to their content.\n\n\
                  Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  pdfrag-server                         # Start the server (reads pdfrag.toml)\n    \
                  pdfrag-server --config prod.toml      # Use a custom config file\n    \
                  pdfrag-server ingest manual.pdf       # Index a PDF without the server\n    \
                  pdfrag-server ask \"How do I reset?\"   # One-shot question"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "pdfrag.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Index PDF files into the vector store
    Ingest {
        /// PDF files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Ask a question over the indexed documents
    Ask {
        /// The question
        question: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
