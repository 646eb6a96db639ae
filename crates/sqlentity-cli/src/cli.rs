use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Classify SQL statements into database, table and column descriptors.
#[derive(Debug, Parser)]
#[command(name = "sqlentity")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(short, long, env = "SQLENTITY_PRETTY")]
    pub pretty: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the JSON descriptor of a statement.
    Classify(InputArgs),

    /// Print the normalized command tag of a statement.
    Tag(InputArgs),

    /// Print the token tree of a statement.
    Tree(InputArgs),
}

/// Where the statement comes from. Reads stdin when neither is given.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// The SQL statement.
    #[arg(conflicts_with = "file")]
    pub sql: Option<String>,

    /// Read the statement from a file.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}
