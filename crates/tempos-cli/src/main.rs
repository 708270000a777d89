use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tempos_core::config::Settings;
use tempos_core::error::CoreError;
use tempos_core::service::ScheduleService;
use tempos_core::timezone::validate_timezone;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod views;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::new()?,
    };
    let timezone = validate_timezone(&settings.timezone)?;
    let service = ScheduleService::from_settings(&settings).await?;
    tracing::debug!(command = ?cli.command, database = %settings.database_path, "dispatching");

    match cli.command {
        cli::Commands::Add(command) => commands::add::add_schedule(&service, command, timezone).await,
        cli::Commands::Ask(command) => commands::ask::ask(&service, command).await,
        cli::Commands::Upcoming(command) => commands::list::upcoming(&service, command).await,
        cli::Commands::List(command) => {
            commands::list::list_schedules(&service, command, timezone).await
        }
        cli::Commands::Sql(command) => commands::admin::run_sql(&service, command).await,
        cli::Commands::Purge(command) => commands::admin::purge(&service, command).await,
        cli::Commands::Seed => commands::admin::seed(&service, timezone).await,
    }
}

/// Logs go to stderr so table output stays clean. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::ExtractionFailure { raw, reason } => {
                eprintln!(
                    "{} Could not read a schedule from the model output: {}",
                    "Error:".style(error_style),
                    reason
                );
                eprintln!("Model output was:");
                eprintln!("  {}", raw.dimmed());
            }
            CoreError::QueryExecutionFailure { sql, source } => {
                eprintln!("{} Query failed: {}", "Error:".style(error_style), source);
                eprintln!("  {}", sql.yellow());
            }
            CoreError::UnsafeStatementRejected(reason) => {
                eprintln!(
                    "{} Statement rejected: {}",
                    "Error:".style(error_style),
                    reason.yellow()
                );
                eprintln!("Only a single read-only SELECT statement is allowed.");
            }
            CoreError::LanguageModel(_) | CoreError::QueryTranslationFailure(_) => {
                eprintln!("{} {}", "Error:".style(error_style), core_error);
                eprintln!("Is the language model server running? Check the [llm] settings.");
            }
            _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
