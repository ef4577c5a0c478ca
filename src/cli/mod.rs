//! CLI module for Tolk.

pub mod commands;
mod output;
pub mod preflight;
pub mod printer;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Tolk - console LLM agents
///
/// Chat with memory, ask questions about a PDF, or let the model call arithmetic tools.
/// The name "Tolk" is Norwegian for "interpreter."
#[derive(Parser, Debug)]
#[command(name = "tolk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chat with the model; the transcript is saved when you exit
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Transcript log file (overwritten each run)
        #[arg(short, long)]
        log: Option<String>,
    },

    /// Ingest a PDF and answer questions about it
    Rag {
        /// PDF to ingest (defaults to rag.pdf_path)
        #[arg(short, long)]
        pdf: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Number of chunks returned per retrieval
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Let the model solve arithmetic with add, subtract and multiply tools
    Tools {
        /// Task to run once (interactive if omitted)
        task: Option<String>,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Check credentials, configuration and input files
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tools_with_task() {
        let cli = Cli::try_parse_from(["tolk", "-vv", "tools", "Add 40+12 and then multiply the result by 6"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Tools { task, model } => {
                assert_eq!(task.as_deref(), Some("Add 40+12 and then multiply the result by 6"));
                assert!(model.is_none());
            }
            other => panic!("Expected Tools, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rag_options() {
        let cli = Cli::try_parse_from(["tolk", "rag", "--pdf", "report.pdf", "-k", "3"]).unwrap();
        match cli.command {
            Commands::Rag { pdf, top_k, .. } => {
                assert_eq!(pdf.as_deref(), Some("report.pdf"));
                assert_eq!(top_k, Some(3));
            }
            other => panic!("Expected Rag, got {:?}", other),
        }
    }
}
