use anyhow::Result;
use owo_colors::OwoColorize;
use tempos_core::models::QueryOutcome;
use tempos_core::service::ScheduleService;

use crate::cli::AskCommand;
use crate::views::table::display_rows;

pub async fn ask(service: &ScheduleService, command: AskCommand) -> Result<()> {
    let outcome = service.ask(&command.question).await?;

    if outcome.fallback_used {
        println!(
            "{}",
            "The generated query was not a safe SELECT; showing upcoming schedules instead.".yellow()
        );
    }
    print_outcome(&outcome);

    if command.summarize {
        // A failed summary never fails the command.
        match service.summarize(&command.question, &outcome.rows).await {
            Ok(Some(summary)) => {
                println!("\n{}", "Summary".bold().underline());
                println!("{summary}");
            }
            Ok(None) => {}
            Err(e) => eprintln!("{} Summary skipped: {}", "Warning:".yellow().bold(), e),
        }
    }

    Ok(())
}

/// Prints the executed statement, then the rows.
pub fn print_outcome(outcome: &QueryOutcome) {
    println!("{}", outcome.sql.dimmed());
    display_rows(&outcome.rows);
}
