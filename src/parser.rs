//! Holds date, color and calendar parsers.

use jiff::Zoned;

use crate::{color::Color, event::CalendarSelector};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid date `{input}` ({message})")]
    Date { input: String, message: String },
    #[error(transparent)]
    Time(#[from] jiff::Error),
}

/// Parse a date and time relative to `now`, keeping the time zone of `now`.
///
/// Anything `parse_datetime` understands is accepted ("tomorrow", "2024-01-05", "next monday",
/// ...). An empty or blank string is `now` itself.
pub fn parse_datetime(s: &str, now: &Zoned) -> Result<Zoned, Error> {
    let tz = now.time_zone().clone();
    Ok(parse_raw(s, now)?.with_time_zone(tz))
}

/// Parse like [`parse_datetime`] then truncate to the midnight of that day in the zone of `now`.
///
/// The calendar day is taken as written, even if the parser resolved it in another zone.
pub fn parse_day(s: &str, now: &Zoned) -> Result<Zoned, Error> {
    let tz = now.time_zone().clone();
    Ok(parse_raw(s, now)?.date().to_zoned(tz)?)
}

fn parse_raw(s: &str, now: &Zoned) -> Result<Zoned, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(now.clone());
    }
    parse_datetime::parse_datetime_at_date(now.clone(), s)
        .or_else(|_| parse_datetime::parse_datetime(s))
        .map_err(|e| Error::Date {
            input: s.to_owned(),
            message: e.to_string(),
        })
}

/// Parse a color name, the value parser of every `--color-*` argument.
pub fn parse_color(s: &str) -> Result<Color, &'static str> {
    Color::from_name(s).ok_or(
        "invalid color name (\"default\", \"red\", \"brightred\", ... up to \"brightwhite\")",
    )
}

/// Parse a `NAME[#COLOR]` calendar selector.
///
/// The name is everything before the first `#`. The part after the last `#` is the color if it
/// names one; otherwise the calendar keeps its default color.
pub fn parse_calendar(s: &str) -> Result<CalendarSelector, &'static str> {
    let mut parts = s.split('#');
    let name = parts.next().unwrap_or_default().trim();
    if name.is_empty() {
        return Err("a calendar name cannot be empty");
    }
    let color = s
        .rsplit_once('#')
        .and_then(|(_, color)| Color::from_name(color.trim()));
    Ok(CalendarSelector {
        name: name.to_owned(),
        color,
    })
}
