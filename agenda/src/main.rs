//! Holds the `agenda` program listing events day by day, or as tab separated rows.

use std::io::Write;

use gcal::{clap_helper::Parse, event::EventSource};

use crate::{
    arg_parser::Args,
    list::{ListConfig, agenda_lines, calendar_lines, tsv_lines, window},
};

mod arg_parser;
mod list;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse();
    config.options.init_logging();

    let ink = config.options.apply_color();
    let now = config.options.now()?;
    let mut events = config.options.read_events(now.time_zone())?;
    if config.list {
        let calendars = events.calendars();
        let colors = config.options.palette.resolver(calendars);
        return print_lines(calendar_lines(calendars, &ink, &colors));
    }
    if let Some(text) = &config.search {
        events.search(text);
    }

    let (start, end) = window(
        &config.start,
        &config.end,
        config.search.is_some(),
        config.no_started,
        &now,
    )?;
    let selected = events.events_between(&start, &end);

    let list_config = ListConfig {
        military: config.options.military,
        palette: config.options.palette.clone(),
        now,
        ink,
        details_calendar: config.details_calendar,
        details_length: config.details_length,
        no_started: config.no_started,
        year_date: config.search.is_some(),
    };
    let calendars = events.calendars();
    let lines = if config.tsv {
        tsv_lines(&selected, calendars, &list_config)
    } else {
        let colors = list_config.palette.resolver(calendars);
        agenda_lines(&selected, calendars, &list_config, &colors)
    };

    print_lines(lines)
}

fn print_lines(lines: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()?;
    Ok(())
}
