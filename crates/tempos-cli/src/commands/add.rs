use anyhow::Result;
use chrono_tz::Tz;
use owo_colors::{OwoColorize, Style};
use tempos_core::service::ScheduleService;

use crate::cli::AddCommand;
use crate::views::table::display_schedules;

pub async fn add_schedule(service: &ScheduleService, command: AddCommand, timezone: Tz) -> Result<()> {
    let saved = service.extract_and_save(&command.text).await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Saved schedule #{}: {}",
        "✓".style(success_style),
        saved.id,
        saved.title.bold()
    );

    if command.show_json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        display_schedules(std::slice::from_ref(&saved), timezone);
    }

    if saved.start.is_none() {
        println!(
            "{}",
            "No start time could be read from the text; the schedule was saved without one.".yellow()
        );
    }

    Ok(())
}
