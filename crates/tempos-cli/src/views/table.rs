use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use serde_json::Value;
use tempos_core::models::{QueryRow, Schedule};

const LOCAL_FORMAT: &str = "%a %d %b %Y %H:%M";

pub fn display_schedules(schedules: &[Schedule], timezone: Tz) {
    if schedules.is_empty() {
        println!("No schedules found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Start", "End", "Location", "Tags"]);

    let now = Utc::now();
    for schedule in schedules {
        let mut row = Row::new();
        row.add_cell(Cell::new(schedule.id));

        let mut title_cell = Cell::new(&schedule.title);
        if schedule.start.is_some_and(|start| start < now) {
            title_cell = title_cell.fg(Color::DarkGrey);
        } else {
            title_cell = title_cell.add_attribute(Attribute::Bold);
        }
        row.add_cell(title_cell);

        row.add_cell(start_cell(schedule.start, now, timezone));
        row.add_cell(Cell::new(
            schedule
                .end
                .map(|end| local_time(end, timezone))
                .unwrap_or_default(),
        ));
        row.add_cell(Cell::new(&schedule.location));
        row.add_cell(Cell::new(schedule.tags.join(", ")).fg(Color::Cyan));
        table.add_row(row);
    }

    println!("{table}");
}

fn start_cell(start: Option<DateTime<Utc>>, now: DateTime<Utc>, timezone: Tz) -> Cell {
    let Some(start) = start else {
        return Cell::new("-").fg(Color::DarkGrey);
    };

    let text = format!("{} ({})", local_time(start, timezone), start.humanize());
    if start < now {
        Cell::new(text).fg(Color::DarkGrey)
    } else if start.with_timezone(&timezone).date_naive() == now.with_timezone(&timezone).date_naive() {
        Cell::new(text).fg(Color::Yellow) // Today
    } else {
        Cell::new(text)
    }
}

fn local_time(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant.with_timezone(&timezone).format(LOCAL_FORMAT).to_string()
}

/// Renders rows of arbitrary shape; the header follows the first row's columns.
pub fn display_rows(rows: &[QueryRow]) {
    let Some(first) = rows.first() else {
        println!("No matching schedules.");
        return;
    };

    let mut table = Table::new();
    table.set_header(first.keys().map(|column| Cell::new(column).add_attribute(Attribute::Bold)));

    for row in rows {
        table.add_row(row.values().map(|value| Cell::new(cell_text(value))));
    }

    println!("{table}");
    println!("{} row(s)", rows.len());
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
