use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Tempos: natural-language schedule manager
///
/// Write down what you have to do in plain words, then ask about it later.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read settings from this file instead of ./tempos.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Extract a schedule from free text and save it
    Add(AddCommand),
    /// Ask a question about your schedules
    Ask(AskCommand),
    /// Show what starts in the next few days
    Upcoming(UpcomingCommand),
    /// List stored schedules
    List(ListCommand),
    /// Run a read-only SELECT statement
    Sql(SqlCommand),
    /// Delete all schedules
    Purge(PurgeCommand),
    /// Insert three sample schedules
    Seed,
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The text to extract from, e.g. "Lunch with Sara tomorrow 12:30 at Cafe Zaha"
    pub text: String,
    /// Print the saved record as JSON
    #[clap(long)]
    pub show_json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AskCommand {
    /// The question, e.g. "what's on Friday?"
    pub question: String,
    /// Also ask the model for a short summary of the results
    #[clap(short, long)]
    pub summarize: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct UpcomingCommand {
    /// Size of the window in days (1-90)
    #[clap(short, long, default_value_t = 30)]
    pub days: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Maximum number of schedules to show
    #[clap(short, long, default_value_t = 50)]
    pub limit: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct SqlCommand {
    /// A single SELECT statement
    pub statement: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PurgeCommand {
    /// Skip the confirmation prompt
    #[clap(short, long)]
    pub force: bool,
}
