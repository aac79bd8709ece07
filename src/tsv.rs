//! Tab separated event rows, as read by the commands and printed by `gcal-agenda --tsv`.
//!
//! ```text
//! start_date  start_time  end_date  end_time  title  [calendar  [access_role]]
//! 2024-01-05  09:00       2024-01-05  09:15   Standup  Work      owner
//! ```
//!
//! Dates are `%Y-%m-%d` and times `%H:%M` in the wall clock of the reader's time zone. Newlines,
//! tabs and backslashes in titles and calendar names are written as `\n`, `\t` and `\\`.

use std::io::BufRead;

use jiff::{
    Zoned,
    civil::{Date, Time},
    tz::TimeZone,
};

use crate::event::{AccessRole, Calendars, Event, EventList};

/// The mandatory leading columns.
pub const REQUIRED_COLUMNS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("line {line}: expected at least {REQUIRED_COLUMNS} tab separated columns, found {found}")]
    Columns { line: usize, found: usize },
    #[error("line {line}: invalid {what} `{value}`")]
    Value {
        line: usize,
        what: &'static str,
        value: String,
    },
    #[error("line {line}: {source}")]
    Time { line: usize, source: jiff::Error },
}

/// One parsed row before its calendar is interned.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub start: Zoned,
    pub end: Zoned,
    pub title: String,
    pub calendar: Option<(String, AccessRole)>,
}

/// Parse a single row. `line` is only used for error messages (1 based).
pub fn parse_row(s: &str, line: usize, tz: &TimeZone) -> Result<Row, Error> {
    let columns: Vec<&str> = s.split('\t').collect();
    if columns.len() < REQUIRED_COLUMNS {
        return Err(Error::Columns {
            line,
            found: columns.len(),
        });
    }

    let zoned = |date: &str, time: &str| -> Result<Zoned, Error> {
        let date = Date::strptime("%Y-%m-%d", date.trim()).map_err(|_| Error::Value {
            line,
            what: "date",
            value: date.to_owned(),
        })?;
        let time = Time::strptime("%H:%M", time.trim()).map_err(|_| Error::Value {
            line,
            what: "time",
            value: time.to_owned(),
        })?;
        date.to_datetime(time)
            .to_zoned(tz.clone())
            .map_err(|source| Error::Time { line, source })
    };

    let start = zoned(columns[0], columns[1])?;
    let end = zoned(columns[2], columns[3])?;

    let calendar = match columns.get(5).map(|s| s.trim()) {
        None | Some("") => None,
        Some(name) => {
            let role = match columns.get(6).map(|s| s.trim()) {
                None | Some("") => AccessRole::default(),
                Some(role) => AccessRole::from_name(role).ok_or_else(|| Error::Value {
                    line,
                    what: "access role",
                    value: role.to_owned(),
                })?,
            };
            Some((unescape(name), role))
        }
    };

    Ok(Row {
        start,
        end,
        title: unescape(columns[4]),
        calendar,
    })
}

/// Read every row of the input into a sorted [`EventList`].
///
/// Empty lines and lines starting with `#` are skipped. Malformed rows are reported and skipped,
/// only an I/O failure aborts the read.
pub fn read(reader: impl BufRead, tz: &TimeZone) -> Result<EventList, Error> {
    let mut calendars = Calendars::default();
    let mut events = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_row(line, i + 1, tz) {
            Ok(row) => {
                let calendar = row
                    .calendar
                    .map(|(name, role)| calendars.intern(&name, role));
                events.push(Event {
                    start: row.start,
                    end: row.end,
                    title: row.title,
                    calendar,
                });
            }
            Err(e) => tracing::warn!("skipping event row: {e}"),
        }
    }

    tracing::debug!(
        events = events.len(),
        calendars = calendars.len(),
        "read event rows"
    );
    Ok(EventList::new(calendars, events))
}

/// Format an event as a row, optionally followed by the summary and access role of its calendar.
///
/// Rows written with the calendar are read back with the same calendar and role.
pub fn format_row(event: &Event, calendars: &Calendars, with_calendar: bool) -> String {
    let mut row = format!(
        "{}\t{}\t{}\t{}\t{}",
        event.start.strftime("%Y-%m-%d"),
        event.start.strftime("%H:%M"),
        event.end.strftime("%Y-%m-%d"),
        event.end.strftime("%H:%M"),
        escape(event.display_title()),
    );
    if with_calendar {
        if let Some(calendar) = event.calendar.and_then(|c| calendars.get(c)) {
            row.push('\t');
            row.push_str(&escape(calendar.summary.trim()));
            row.push('\t');
            row.push_str(calendar.access_role.name());
        } else {
            row.push('\t');
        }
    }
    row
}

/// Backslashes, tabs and newlines become `\\`, `\t` and `\n` so no column is split.
fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Reverse [`escape`]. Unknown sequences are kept as written.
fn unescape(s: &str) -> String {
    let mut unescaped = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => unescaped.push('\\'),
            Some('t') => unescaped.push('\t'),
            Some('n') => unescaped.push('\n'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use jiff::civil;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_row_minimal() {
        let row = parse_row("2024-01-05\t09:00\t2024-01-05\t09:15\tStandup", 1, &TimeZone::UTC)
            .unwrap();
        assert_eq!(civil::date(2024, 1, 5).at(9, 0, 0, 0), row.start.datetime());
        assert_eq!(civil::date(2024, 1, 5).at(9, 15, 0, 0), row.end.datetime());
        assert_eq!("Standup", row.title);
        assert_eq!(None, row.calendar);
    }

    #[test]
    fn test_parse_row_calendar_and_role() {
        let row = parse_row(
            "2024-01-05\t09:00\t2024-01-05\t09:15\tA\\nB\tHome\treader",
            1,
            &TimeZone::UTC,
        )
        .unwrap();
        assert_eq!("A\nB", row.title);
        assert_eq!(Some(("Home".to_owned(), AccessRole::Reader)), row.calendar);
    }

    #[test]
    fn test_parse_row_errors() {
        assert!(matches!(
            parse_row("2024-01-05\t09:00", 3, &TimeZone::UTC),
            Err(Error::Columns { line: 3, found: 2 })
        ));
        assert!(matches!(
            parse_row("2024-13-05\t09:00\t2024-01-05\t09:15\tx", 4, &TimeZone::UTC),
            Err(Error::Value { line: 4, what: "date", .. })
        ));
        assert!(matches!(
            parse_row("2024-01-05\t9am\t2024-01-05\t09:15\tx", 5, &TimeZone::UTC),
            Err(Error::Value { what: "time", .. })
        ));
        assert!(matches!(
            parse_row("2024-01-05\t09:00\t2024-01-05\t09:15\tx\tWork\tboss", 6, &TimeZone::UTC),
            Err(Error::Value { what: "access role", .. })
        ));
    }

    #[test]
    fn test_read_skips_comments_and_bad_rows() {
        let input = "# exported\n\
                     2024-01-06\t12:00\t2024-01-06\t13:00\tLunch\tWork\n\
                     \n\
                     garbage\n\
                     2024-01-05\t09:00\t2024-01-05\t09:15\tStandup\tWork\twriter\n";
        let list = read(input.as_bytes(), &TimeZone::UTC).unwrap();
        let titles: Vec<_> = list.events().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(vec!["Standup", "Lunch"], titles);

        use crate::event::EventSource;
        let calendars = list.calendars();
        assert_eq!(1, calendars.len());
        let work = list.events()[0].calendar.unwrap();
        // first occurrence of the calendar had no role column
        assert_eq!(AccessRole::Owner, calendars.get(work).unwrap().access_role);
    }

    #[test]
    fn test_format_row() {
        let input = "2024-01-05\t09:00\t2024-01-05\t09:15\tTwo\\nlines\tWork\n";
        let list = read(input.as_bytes(), &TimeZone::UTC).unwrap();
        use crate::event::EventSource;
        let event = &list.events()[0];
        assert_eq!(
            "2024-01-05\t09:00\t2024-01-05\t09:15\tTwo\\nlines",
            format_row(event, list.calendars(), false)
        );
        assert_eq!(
            "2024-01-05\t09:00\t2024-01-05\t09:15\tTwo\\nlines\tWork\towner",
            format_row(event, list.calendars(), true)
        );
    }

    #[test]
    fn test_rows_read_back_unchanged() {
        let mut calendars = Calendars::default();
        let team = calendars.intern("Team\tA", AccessRole::Reader);
        let event = Event {
            start: civil::date(2024, 1, 5).at(9, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap(),
            end: civil::date(2024, 1, 5).at(10, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap(),
            title: "Plan\tQ1\nC:\\new".to_owned(),
            calendar: Some(team),
        };

        let line = format_row(&event, &calendars, true);
        assert_eq!(
            "2024-01-05\t09:00\t2024-01-05\t10:00\tPlan\\tQ1\\nC:\\\\new\tTeam\\tA\treader",
            line
        );
        let row = parse_row(&line, 1, &TimeZone::UTC).unwrap();
        assert_eq!(event.start, row.start);
        assert_eq!(event.end, row.end);
        assert_eq!(event.title, row.title);
        assert_eq!(Some(("Team\tA".to_owned(), AccessRole::Reader)), row.calendar);
    }

    #[test]
    fn test_unknown_escape_is_kept() {
        assert_eq!("a\\xb\\", unescape("a\\xb\\"));
    }
}
