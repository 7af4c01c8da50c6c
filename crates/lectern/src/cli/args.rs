//! Clap argument definitions for the `lectern` CLI.

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "lectern")]
#[command(about = "Full-text search over statically published text collections")]
#[command(version)]
pub struct Cli {
    /// Log verbosity (-v for progress, -vv for fetch details)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output mode flags.
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output fragment ids only, one per line
    #[arg(long, conflicts_with = "json")]
    pub list: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Resolved output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Highlighted fragment text.
    Full,
    /// Fragment ids only.
    List,
    /// Machine-readable JSON.
    Json,
}

impl OutputArgs {
    /// Returns the selected mode.
    pub fn mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.list {
            OutputMode::List
        } else {
            OutputMode::Full
        }
    }
}

/// Arguments for `lectern search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Collection id (e.g. eng_kjv)
    pub collection: String,

    /// Query words
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Limit results to these divisions (book codes); repeatable
    #[arg(short = 'd', long = "division")]
    pub divisions: Vec<String>,

    /// Output formatting flags.
    #[command(flatten)]
    pub output: OutputArgs,
}

impl SearchCommand {
    /// Returns the query words joined back into one string.
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

/// Arguments for `lectern sections`.
#[derive(Args, Debug, Clone)]
pub struct SectionsCommand {
    /// Collection id
    pub collection: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `lectern init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.lectern.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `lectern` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search a collection and print verified, highlighted fragments
    #[command(after_help = "\
QUERY SYNTAX:
  word              Word must appear
  word1 word2       Every word, in any order (implicit AND)
  word1 OR word2    Any of the words
  \"a phrase\"        Words adjacent, in order
  G3056             Strong's lemma code (G/H + digits)

EXAMPLES:
  lectern search eng_kjv beginning word
  lectern search eng_kjv '\"the word\"'
  lectern search eng_kjv light OR darkness -d JN -d 1J
  lectern search eng_kjv G3056 --json")]
    Search(SearchCommand),

    /// List a collection's sections and fragment counts
    Sections(SectionsCommand),

    /// Initialize lectern configuration in the current directory
    Init(InitCommand),

    /// Show effective configuration settings
    Config,

    /// Show configuration files and validation warnings
    Status,
}
