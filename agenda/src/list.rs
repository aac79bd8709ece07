//! Agenda lines and tab separated rows of a list of events.

use colored::Color as Base;
use gcal::{
    color::{Color, Ink, Palette, ResolveColor},
    event::{Calendars, Event},
    parser::{self, parse_datetime, parse_day},
    tsv,
};
use jiff::{Timestamp, ToSpan, Zoned};

/// Days listed when no end is given.
pub const AGENDA_DAYS: i64 = 5;

/// Printed instead of an empty agenda.
pub const NO_EVENTS: &str = "No Events Found...";

/// Spaces standing for the date of events on an already printed day.
pub const DAY_INDENT: &str = "          ";

/// Spaces before the details of an event.
pub const DETAILS_INDENT: &str = "                   ";

/// Header of the access role column of the calendar list.
pub const ACCESS_HEADER: &str = "Access";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    pub military: bool,
    pub palette: Palette,
    pub now: Zoned,
    pub ink: Ink,
    /// Show the calendar of each event.
    pub details_calendar: bool,
    /// Show how long each event lasts.
    pub details_length: bool,
    /// Skip the events that started before now.
    pub no_started: bool,
    /// Write the full date on every line (search results span years).
    pub year_date: bool,
}

/// Resolve the `[start, end)` window of the agenda.
///
/// Without a start the agenda begins at midnight today, or the search has no lower bound. Without
/// an end the agenda spans [`AGENDA_DAYS`] days and the search has no upper bound. A window
/// skipping started events never begins before now.
pub fn window(
    start_text: &str,
    end_text: &str,
    search: bool,
    no_started: bool,
    now: &Zoned,
) -> Result<(Zoned, Zoned), parser::Error> {
    let tz = now.time_zone().clone();
    let mut start = match (start_text.trim(), search) {
        ("", false) => parse_day("", now)?,
        ("", true) => Timestamp::MIN.to_zoned(tz.clone()),
        (text, _) => parse_datetime(text, now)?,
    };
    if no_started && start.timestamp() < now.timestamp() {
        start = now.clone();
    }
    let end = match (end_text.trim(), search) {
        ("", false) => start.checked_add(AGENDA_DAYS.days())?,
        ("", true) => Timestamp::MAX.to_zoned(tz),
        (text, _) => parse_datetime(text, now)?,
    };
    tracing::debug!(%start, %end, "agenda window");
    Ok((start, end))
}

fn is_started(event: &Event, config: &ListConfig) -> bool {
    event.start.timestamp() < config.now.timestamp()
}

/// The time column, left justified to 5 (24 hours) or 7 columns with the clock right aligned.
fn time_column(event: &Event, military: bool) -> String {
    let label = if event.is_all_day() {
        String::new()
    } else if military {
        event.start_time_label(true)
    } else {
        let label = event.start_time_label(false);
        let (clock, suffix) = label.split_at(label.len() - 2);
        format!("{clock:>5}{suffix}")
    };
    if military {
        format!("{label:<5}")
    } else {
        format!("{label:<7}")
    }
}

/// Agenda lines: a blank line and the date before the first event of each day.
pub fn agenda_lines(
    events: &[Event],
    calendars: &Calendars,
    config: &ListConfig,
    colors: &dyn ResolveColor,
) -> Vec<String> {
    let ink = &config.ink;
    let events: Vec<&Event> = events
        .iter()
        .filter(|e| !(config.no_started && is_started(e, config)))
        .collect();
    if events.is_empty() {
        return vec![String::new(), ink.paint(Color::Normal(Base::Yellow), NO_EVENTS)];
    }

    let day_format = if config.year_date {
        "%Y-%m-%d"
    } else {
        "%a %b %d"
    };
    let mut lines = Vec::new();
    let mut day = String::new();
    for event in events {
        let this_day = event.start.strftime(day_format).to_string();
        let prefix = if config.year_date || this_day != day {
            lines.push(String::new());
            day = this_day;
            day.as_str()
        } else {
            DAY_INDENT
        };

        let color = if event.is_happening(&config.now) && !event.is_all_day() {
            config.palette.now_marker
        } else {
            colors.calendar_color(event.calendar)
        };
        let text = format!(
            "  {}  {}",
            time_column(event, config.military),
            event.display_title()
        );
        lines.push(ink.paint(config.palette.date, prefix) + &ink.paint(color, &text));

        if config.details_calendar {
            if let Some(calendar) = event.calendar.and_then(|c| calendars.get(c)) {
                let summary = ink.escape(&calendar.summary);
                lines.push(format!("{DETAILS_INDENT}  Calendar: {summary}"));
            }
        }
        if config.details_length {
            lines.push(format!("{DETAILS_INDENT}  Length: {}", length(event)));
        }
    }
    lines
}

/// The duration of an event as `H:MM:SS`, prefixed with `N day(s), ` past a day.
fn length(event: &Event) -> String {
    let seconds = event
        .end
        .timestamp()
        .duration_since(event.start.timestamp())
        .as_secs();
    let (days, rest) = (
        seconds.div_euclid(SECONDS_PER_DAY),
        seconds.rem_euclid(SECONDS_PER_DAY),
    );
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest / 60 % 60, rest % 60);
    match days {
        0 => clock,
        1 | -1 => format!("{days} day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

/// A table of the calendars with their access role, each line in the color of its calendar.
pub fn calendar_lines(
    calendars: &Calendars,
    ink: &Ink,
    colors: &dyn ResolveColor,
) -> Vec<String> {
    let width = calendars
        .iter()
        .map(|(_, c)| c.access_role.name().len())
        .chain([ACCESS_HEADER.len()])
        .max()
        .unwrap_or(ACCESS_HEADER.len());
    let header = Color::Bright(Base::Yellow);

    let mut lines = vec![
        ink.paint(header, &format!(" {ACCESS_HEADER:>width$}  Title")),
        ink.paint(header, &format!(" {:>width$}  -----", "------")),
    ];
    lines.extend(calendars.iter().map(|(r, c)| {
        let line = format!(" {:>width$}  {}", c.access_role.name(), c.summary);
        ink.paint(colors.calendar_color(Some(r)), &line)
    }));
    lines
}

/// One tab separated row per event.
pub fn tsv_lines(events: &[Event], calendars: &Calendars, config: &ListConfig) -> Vec<String> {
    events
        .iter()
        .filter(|e| !(config.no_started && is_started(e, config)))
        .map(|e| tsv::format_row(e, calendars, config.details_calendar))
        .collect()
}
