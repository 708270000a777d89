use anyhow::Result;
use chrono_tz::Tz;
use tempos_core::service::ScheduleService;

use crate::cli::{ListCommand, UpcomingCommand};
use crate::commands::ask::print_outcome;
use crate::views::table::display_schedules;

pub async fn list_schedules(service: &ScheduleService, command: ListCommand, timezone: Tz) -> Result<()> {
    let schedules = service.list_schedules(command.limit).await?;
    display_schedules(&schedules, timezone);
    Ok(())
}

pub async fn upcoming(service: &ScheduleService, command: UpcomingCommand) -> Result<()> {
    let outcome = service.upcoming(command.days).await?;
    print_outcome(&outcome);
    Ok(())
}
