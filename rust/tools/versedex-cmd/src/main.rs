use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Builder;
use log::LevelFilter;

use crate::commands::IndexArgs;

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "versedex-cmd")]
#[command(about = "Command-line utility for building and searching word indexes")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    index: IndexArgs,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a corpus file, replacing any previous index
    Build,

    /// List the units containing a word
    Find {
        word: String,

        /// Print the text of each unit (requires --corpus)
        #[arg(long)]
        show: bool,
    },

    /// List the indexed words starting with a prefix
    Prefix {
        prefix: String,

        /// Maximum number of words to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Evaluate a query such as "love & (god | lord) - hate"
    Query {
        text: String,

        /// Only report units inside these ordinals, e.g. "1-31, 50"
        #[arg(long)]
        within: Option<String>,

        /// Print the text of each unit (requires --corpus)
        #[arg(long)]
        show: bool,
    },

    /// Rank units by how many words of free text they match
    BestMatch {
        text: String,

        /// Number of units to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Only rank units inside these ordinals, e.g. "1-31, 50"
        #[arg(long)]
        within: Option<String>,
    },

    /// Display a JSON summary of a published index
    Inspect,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    match cli.command {
        Commands::Build => commands::build::run(&cli.index),
        Commands::Find { word, show } => commands::search::find(&cli.index, &word, show),
        Commands::Prefix { prefix, limit } => commands::search::prefix(&cli.index, &prefix, limit),
        Commands::Query { text, within, show } => {
            commands::search::query(&cli.index, &text, within.as_deref(), show)
        }
        Commands::BestMatch {
            text,
            limit,
            within,
        } => commands::search::best_match(&cli.index, &text, limit, within.as_deref()),
        Commands::Inspect => commands::inspect::run(&cli.index),
    }
}
