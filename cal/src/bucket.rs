//! Per day fragment streams of a week row.
//!
//! Every event of the week becomes one [`Fragment`] in the [`DayBucket`] of its weekday. A fragment
//! is preceded by a line separator, so each one starts on a fresh line of the cell after a blank
//! one. The "now" marker is either an extra rule fragment or the recoloring of the event
//! happening right now.

use gcal::{
    color::{Color, ResolveColor},
    event::Event,
};
use jiff::{ToSpan, civil::Date};

use crate::{
    layout::{RenderConfig, View, WEEK_DAYS},
    string::{Aligner, find_cut},
};

/// Colored text drawn in a day cell, wrapped over as many lines as it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    color: Color,
    text: String,
}

impl Fragment {
    /// Tabs and newlines become spaces, any other control character is dropped.
    pub fn new(color: Color, text: &str) -> Self {
        let text = text
            .chars()
            .filter_map(|c| match c {
                '\t' | '\n' | '\r' => Some(' '),
                c if c.is_control() => None,
                c => Some(c),
            })
            .collect();
        Self { color, text }
    }
}

/// Where the next line of a day comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    /// Before the separator of this fragment.
    Separator(usize),
    /// Inside the fragment at this byte offset.
    Text(usize, usize),
}

/// One line of a day cell as drained from its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// Nothing is left for this day.
    Exhausted,
    /// The blank line before a fragment.
    Separator,
    Text {
        color: Color,
        text: &'a str,
        width: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    fragments: Vec<Fragment>,
    cursor: Cursor,
}

impl Default for DayBucket {
    fn default() -> Self {
        Self {
            fragments: Vec::new(),
            cursor: Cursor::Separator(0),
        }
    }
}

impl DayBucket {
    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    /// Take the next line of at most `width` columns.
    ///
    /// Spaces at the start of a line are skipped. Every call that is not [`Cell::Exhausted`]
    /// moves the cursor forward.
    pub fn next_cell(&mut self, width: usize) -> Cell<'_> {
        match self.cursor {
            Cursor::Separator(i) if i >= self.fragments.len() => Cell::Exhausted,
            Cursor::Separator(i) => {
                self.cursor = Cursor::Text(i, 0);
                Cell::Separator
            }
            Cursor::Text(i, offset) => {
                let fragment = &self.fragments[i];
                let rest = &fragment.text[offset..];
                let trimmed = rest.trim_start_matches(' ');
                let start = offset + (rest.len() - trimmed.len());
                let cut = find_cut(trimmed, width);
                let end = start + cut.index;

                self.cursor = if end >= fragment.text.len() {
                    Cursor::Separator(i + 1)
                } else {
                    Cursor::Text(i, end)
                };
                Cell::Text {
                    color: fragment.color,
                    text: &fragment.text[start..end],
                    width: cut.width,
                }
            }
        }
    }
}

/// Distribute the events of the week starting at `week_start` over its seven days.
///
/// `events` must be sorted by start. In the month view only the events of `month` (year, month)
/// are kept. The now marker is placed at most once, before or on the first event it relates to.
pub fn build_week(
    view: View,
    month: (i16, i8),
    week_start: Date,
    events: &[Event],
    config: &RenderConfig,
    colors: &dyn ResolveColor,
) -> [DayBucket; WEEK_DAYS] {
    let mut buckets: [DayBucket; WEEK_DAYS] = Default::default();
    let week_end = week_start.saturating_add((WEEK_DAYS as i64).days());
    let now = &config.now;
    let today = now.date();
    let rule = || {
        Fragment::new(
            config.palette.now_marker,
            &Aligner::DASH.filler(config.column_width),
        )
    };

    let mut marker_placed = today < week_start || today >= week_end;

    for event in events {
        let date = event.start.date();
        if view == View::Month && (date.year(), date.month()) != month {
            continue;
        }
        if date < week_start || date >= week_end {
            continue;
        }

        let day = config.week_start.offset(date.weekday());
        let mut color = colors.calendar_color(event.calendar);

        if !marker_placed {
            if today < date {
                // today is inside the week and before this event, so `day` is at least 1
                buckets[day.saturating_sub(1)].push(rule());
                marker_placed = true;
            } else if now.timestamp() <= event.start.timestamp() {
                buckets[day].push(rule());
                marker_placed = true;
            } else if event.is_happening(now) && !event.is_all_day() {
                color = config.palette.now_marker;
                marker_placed = true;
            }
        }

        let time = if event.is_all_day() {
            String::new()
        } else {
            event.start_time_label(config.military)
        };
        let text = format!("{time} {}", event.display_title());
        buckets[day].push(Fragment::new(color, &text));
    }

    tracing::debug!(%week_start, marker_placed, "built week buckets");
    buckets
}

#[cfg(test)]
mod tests {
    use gcal::{
        color::{Ink, Palette},
        event::{AccessRole, CalendarRef, Calendars},
    };
    use jiff::{Zoned, civil, tz::TimeZone};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{art::LineArt, layout::WeekStart};

    fn at(d: i8, h: i8, m: i8) -> Zoned {
        civil::date(2024, 1, d)
            .at(h, m, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap()
    }

    fn event(title: &str, start: Zoned, end: Zoned, calendar: Option<CalendarRef>) -> Event {
        Event {
            start,
            end,
            title: title.to_owned(),
            calendar,
        }
    }

    fn config(now: Zoned) -> RenderConfig {
        RenderConfig {
            column_width: 10,
            week_start: WeekStart::Monday,
            military: true,
            palette: Palette::default(),
            now,
            ink: Ink::PLAIN,
            art: LineArt { fancy: false },
        }
    }

    /// (slot, color, text) of every fragment.
    fn flatten(buckets: &[DayBucket]) -> Vec<(usize, Color, String)> {
        buckets
            .iter()
            .enumerate()
            .flat_map(|(i, b)| {
                b.fragments
                    .iter()
                    .map(move |f| (i, f.color, f.text.clone()))
            })
            .collect()
    }

    // 2024-01-01 is a Monday
    const MONDAY: Date = civil::date(2024, 1, 1);

    #[test]
    fn test_fragment_sanitizes_title() {
        let f = Fragment::new(Color::Default, "a\tb\nc\u{7}d");
        assert_eq!("a b cd", f.text);
    }

    #[test]
    fn test_happening_event_is_recolored() {
        let mut calendars = Calendars::default();
        let work = calendars.intern("Work", AccessRole::Owner);
        let config = config(at(1, 9, 30));
        let palette = config.palette.clone();
        let events = [event("Standup", at(1, 9, 0), at(1, 10, 0), Some(work))];

        let buckets = build_week(
            View::Week,
            (2024, 1),
            MONDAY,
            &events,
            &config,
            &palette.resolver(&calendars),
        );
        assert_eq!(
            vec![(0, palette.now_marker, "09:00 Standup".to_owned())],
            flatten(&buckets)
        );
    }

    #[test]
    fn test_rule_before_next_event_same_day() {
        let calendars = Calendars::default();
        let config = config(at(3, 8, 0));
        let palette = config.palette.clone();
        let events = [
            event("Gym", at(3, 7, 0), at(3, 7, 30), None),
            event("Standup", at(3, 9, 0), at(3, 9, 15), None),
            event("Lunch", at(3, 12, 0), at(3, 13, 0), None),
        ];
        let buckets = build_week(
            View::Week,
            (2024, 1),
            MONDAY,
            &events,
            &config,
            &palette.resolver(&calendars),
        );
        assert_eq!(
            vec![
                (2, Color::Default, "07:00 Gym".to_owned()),
                (2, palette.now_marker, "----------".to_owned()),
                (2, Color::Default, "09:00 Standup".to_owned()),
                (2, Color::Default, "12:00 Lunch".to_owned()),
            ],
            flatten(&buckets)
        );
    }

    #[test]
    fn test_rule_goes_to_previous_day() {
        let calendars = Calendars::default();
        let config = config(at(2, 20, 0));
        let palette = config.palette.clone();
        let events = [
            event("Standup", at(4, 9, 0), at(4, 9, 15), None),
            event("Retro", at(5, 9, 0), at(5, 9, 15), None),
        ];
        let buckets = build_week(
            View::Week,
            (2024, 1),
            MONDAY,
            &events,
            &config,
            &palette.resolver(&calendars),
        );
        assert_eq!(
            vec![
                (2, palette.now_marker, "----------".to_owned()),
                (3, Color::Default, "09:00 Standup".to_owned()),
                (4, Color::Default, "09:00 Retro".to_owned()),
            ],
            flatten(&buckets)
        );
    }

    #[test]
    fn test_all_day_never_recolored() {
        let calendars = Calendars::default();
        let config = config(at(2, 12, 0));
        let palette = config.palette.clone();
        let events = [
            event("Holiday", at(2, 0, 0), at(3, 0, 0), None),
            event("Review", at(2, 11, 0), at(2, 13, 0), None),
        ];
        let buckets = build_week(
            View::Week,
            (2024, 1),
            MONDAY,
            &events,
            &config,
            &palette.resolver(&calendars),
        );
        assert_eq!(
            vec![
                (1, Color::Default, " Holiday".to_owned()),
                (1, palette.now_marker, "11:00 Review".to_owned()),
            ],
            flatten(&buckets)
        );
    }

    #[test]
    fn test_marker_at_most_once() {
        let calendars = Calendars::default();
        let config = config(at(2, 9, 30));
        let palette = config.palette.clone();
        let events = [
            event("A", at(2, 9, 0), at(2, 10, 0), None),
            event("B", at(2, 9, 15), at(2, 10, 0), None),
            event("C", at(2, 11, 0), at(2, 12, 0), None),
            event("D", at(4, 11, 0), at(4, 12, 0), None),
        ];
        let buckets = build_week(
            View::Week,
            (2024, 1),
            MONDAY,
            &events,
            &config,
            &palette.resolver(&calendars),
        );
        let fragments = flatten(&buckets);
        let marked = fragments
            .iter()
            .filter(|(_, color, _)| *color == palette.now_marker)
            .count();
        assert_eq!(1, marked);
        assert_eq!(4, fragments.len());
    }

    #[test]
    fn test_now_outside_week_has_no_marker() {
        let calendars = Calendars::default();
        let config = config(at(8, 9, 0));
        let palette = config.palette.clone();
        let events = [event("A", at(2, 9, 0), at(9, 10, 0), None)];
        let buckets = build_week(
            View::Week,
            (2024, 1),
            MONDAY,
            &events,
            &config,
            &palette.resolver(&calendars),
        );
        assert_eq!(
            vec![(1, Color::Default, "09:00 A".to_owned())],
            flatten(&buckets)
        );
    }

    #[test]
    fn test_month_view_skips_other_months() {
        let calendars = Calendars::default();
        let config = config(at(20, 9, 0));
        let palette = config.palette.clone();
        let february = civil::date(2024, 2, 1)
            .at(9, 0, 0, 0)
            .to_zoned(TimeZone::UTC)
            .unwrap();
        let events = [
            event("Jan", at(30, 9, 0), at(30, 10, 0), None),
            event("Feb", february.clone(), february, None),
        ];
        let buckets = build_week(
            View::Month,
            (2024, 1),
            civil::date(2024, 1, 29),
            &events,
            &config,
            &palette.resolver(&calendars),
        );
        assert_eq!(
            vec![(1, Color::Default, "09:00 Jan".to_owned())],
            flatten(&buckets)
        );
    }

    #[test]
    fn test_drain_cells() {
        let mut bucket = DayBucket::default();
        bucket.push(Fragment::new(Color::Default, "09:00 Pay the rent"));
        assert_eq!(Cell::Separator, bucket.next_cell(10));
        assert_eq!(
            Cell::Text {
                color: Color::Default,
                text: "09:00 Pay",
                width: 9
            },
            bucket.next_cell(10)
        );
        assert_eq!(
            Cell::Text {
                color: Color::Default,
                text: "the rent",
                width: 8
            },
            bucket.next_cell(10)
        );
        assert_eq!(Cell::Exhausted, bucket.next_cell(10));
        assert_eq!(Cell::Exhausted, bucket.next_cell(10));
    }
}
