use anyhow::Result;
use chrono_tz::Tz;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};
use tempos_core::service::ScheduleService;

use crate::cli::{PurgeCommand, SqlCommand};
use crate::commands::ask::print_outcome;
use crate::views::table::display_schedules;

pub async fn run_sql(service: &ScheduleService, command: SqlCommand) -> Result<()> {
    let outcome = service.run_admin_sql(&command.statement).await?;
    print_outcome(&outcome);
    Ok(())
}

pub async fn purge(service: &ScheduleService, command: PurgeCommand) -> Result<()> {
    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt("Are you sure you want to delete ALL schedules?")
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Purge cancelled.");
            return Ok(());
        }
    }

    let deleted = service.purge_all().await?;
    println!("{} Deleted {} schedule(s).", "✓".style(Style::new().green().bold()), deleted);
    Ok(())
}

pub async fn seed(service: &ScheduleService, timezone: Tz) -> Result<()> {
    let saved = service.seed_samples().await?;
    let ids: Vec<String> = saved.iter().map(|s| s.id.to_string()).collect();
    println!(
        "{} Inserted sample IDs: {}",
        "✓".style(Style::new().green().bold()),
        ids.join(", ")
    );
    display_schedules(&saved, timezone);
    Ok(())
}
