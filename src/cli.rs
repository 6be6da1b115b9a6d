use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "concierge",
    version,
    about = "Answer HR policy questions from an indexed handbook and route messages to specialised agents"
)]
pub struct Cli {
    /// Config file path
    #[arg(
        short,
        long,
        global = true,
        env = "CONCIERGE_CONFIG",
        default_value = "config/default.toml",
        value_name = "FILE"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chunk, embed and store policy documents
    Ingest {
        /// Text, markdown or (with the `pdf` feature) PDF files
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,

        /// Drop the collection before ingesting
        #[arg(long)]
        recreate: bool,
    },

    /// Serve the HR policy agent
    Agent,

    /// Serve the intent router
    Router,

    /// Answer one question and print the reply as JSON
    Ask { message: String },

    /// Print the intent label for a message
    Classify { message: String },
}
