//! Calendars, events and the source the commands query them from.

use jiff::Zoned;

use crate::{clap_helper::StaticMap, color::Color};

/// Shown when an event has a blank title.
pub const NO_TITLE: &str = "(No title)";

/// The permission level of a calendar, used to pick its default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessRole {
    #[default]
    Owner,
    Writer,
    Reader,
    FreeBusyReader,
}

impl AccessRole {
    pub const PARSER_MAP: StaticMap<AccessRole> = StaticMap(&[
        ("owner", AccessRole::Owner),
        ("writer", AccessRole::Writer),
        ("reader", AccessRole::Reader),
        ("freeBusyReader", AccessRole::FreeBusyReader),
    ]);

    pub fn from_name(name: &str) -> Option<Self> {
        Self::PARSER_MAP.get_ignore_case(name).copied()
    }

    pub fn name(&self) -> &'static str {
        Self::PARSER_MAP.key_for(self).unwrap_or("owner")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Calendar {
    pub summary: String,
    pub access_role: AccessRole,
    /// Explicitly requested color, overrides the access role default.
    pub color: Option<Color>,
}

impl Calendar {
    pub fn new(summary: impl Into<String>, access_role: AccessRole) -> Self {
        Self {
            summary: summary.into(),
            access_role,
            color: None,
        }
    }
}

/// Opaque handle of a calendar in its [`Calendars`] list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarRef(usize);

/// Every calendar known to an event list, addressed by [`CalendarRef`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendars(Vec<Calendar>);

impl Calendars {
    /// Find the calendar with this summary or add it.
    ///
    /// The access role of the first occurrence wins.
    pub fn intern(&mut self, summary: &str, access_role: AccessRole) -> CalendarRef {
        if let Some(i) = self.0.iter().position(|c| c.summary == summary) {
            return CalendarRef(i);
        }
        self.0.push(Calendar::new(summary, access_role));
        CalendarRef(self.0.len() - 1)
    }

    pub fn get(&self, r: CalendarRef) -> Option<&Calendar> {
        self.0.get(r.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every calendar with its handle, in the order they were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (CalendarRef, &Calendar)> {
        self.0.iter().enumerate().map(|(i, c)| (CalendarRef(i), c))
    }

    /// Which calendars match any of the selectors, applying their colors on the way.
    ///
    /// For every selector an exact summary match is preferred; otherwise every calendar that
    /// contains the selector name (ignoring case) matches.
    pub fn select(&mut self, selectors: &[CalendarSelector]) -> Vec<CalendarRef> {
        let mut selected = Vec::new();
        for selector in selectors {
            let matches: Vec<usize> = match self.0.iter().position(|c| c.summary == selector.name)
            {
                Some(i) => vec![i],
                None => {
                    let needle = selector.name.to_lowercase();
                    (0..self.0.len())
                        .filter(|&i| self.0[i].summary.to_lowercase().contains(&needle))
                        .collect()
                }
            };
            for i in matches {
                if selector.color.is_some() {
                    self.0[i].color = selector.color;
                }
                if !selected.contains(&CalendarRef(i)) {
                    selected.push(CalendarRef(i));
                }
            }
        }
        selected
    }
}

/// A `NAME[#COLOR]` calendar request from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarSelector {
    pub name: String,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub start: Zoned,
    pub end: Zoned,
    pub title: String,
    pub calendar: Option<CalendarRef>,
}

impl Event {
    /// Both ends sit exactly on midnight.
    pub fn is_all_day(&self) -> bool {
        self.start.hour() == 0
            && self.start.minute() == 0
            && self.end.hour() == 0
            && self.end.minute() == 0
    }

    /// The trimmed title or [`NO_TITLE`].
    pub fn display_title(&self) -> &str {
        match self.title.trim() {
            "" => NO_TITLE,
            title => title,
        }
    }

    /// Whether `now` is inside the inclusive span of this event.
    pub fn is_happening(&self, now: &Zoned) -> bool {
        self.start.timestamp() <= now.timestamp() && now.timestamp() <= self.end.timestamp()
    }

    /// The start time as `HH:MM` or as `H:MMam`.
    pub fn start_time_label(&self, military: bool) -> String {
        time_label(self.start.hour(), self.start.minute(), military)
    }
}

/// Format a wall clock time in 24 hours (`09:05`) or 12 hours without the leading zero (`9:05am`).
pub fn time_label(hour: i8, minute: i8, military: bool) -> String {
    if military {
        return format!("{hour:02}:{minute:02}");
    }
    let suffix = if hour < 12 { "am" } else { "pm" };
    let hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour}:{minute:02}{suffix}")
}

/// Provides events of a time window.
///
/// Implementors must return the events sorted by their start.
pub trait EventSource {
    /// Events starting in `[start, end)`.
    fn events_between(&self, start: &Zoned, end: &Zoned) -> Vec<Event>;

    fn calendars(&self) -> &Calendars;
}

/// An in memory, start sorted, list of events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventList {
    calendars: Calendars,
    events: Vec<Event>,
}

impl EventList {
    pub fn new(calendars: Calendars, mut events: Vec<Event>) -> Self {
        // stable so same start events keep their input order
        events.sort_by(|a, b| a.start.timestamp().cmp(&b.start.timestamp()));
        Self { calendars, events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Keep only events of the selected calendars. No selectors keeps everything.
    pub fn select(&mut self, selectors: &[CalendarSelector]) {
        if selectors.is_empty() {
            return;
        }
        let selected = self.calendars.select(selectors);
        self.events
            .retain(|e| e.calendar.is_some_and(|c| selected.contains(&c)));
    }

    /// Keep only events whose title contains `text`, ignoring case.
    pub fn search(&mut self, text: &str) {
        let needle = text.to_lowercase();
        self.events
            .retain(|e| e.title.to_lowercase().contains(&needle));
    }
}

impl EventSource for EventList {
    fn events_between(&self, start: &Zoned, end: &Zoned) -> Vec<Event> {
        let (start, end) = (start.timestamp(), end.timestamp());
        self.events
            .iter()
            .filter(|e| start <= e.start.timestamp() && e.start.timestamp() < end)
            .cloned()
            .collect()
    }

    fn calendars(&self) -> &Calendars {
        &self.calendars
    }
}

#[cfg(test)]
mod tests {
    use jiff::{civil, tz::TimeZone};

    use super::*;

    fn at(y: i16, m: i8, d: i8, h: i8, min: i8) -> Zoned {
        civil::date(y, m, d)
            .at(h, min, 0, 0)
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

    #[test]
    fn test_all_day() {
        let e = event("Holiday", at(2024, 1, 1, 0, 0), at(2024, 1, 2, 0, 0), None);
        assert!(e.is_all_day());
        let e = event("Standup", at(2024, 1, 1, 0, 0), at(2024, 1, 1, 0, 15), None);
        assert!(!e.is_all_day());
    }

    #[test]
    fn test_display_title() {
        let e = event("  ", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 10, 0), None);
        assert_eq!(NO_TITLE, e.display_title());
        let e = event(" Lunch ", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 10, 0), None);
        assert_eq!("Lunch", e.display_title());
    }

    #[test]
    fn test_time_label() {
        assert_eq!("09:05", time_label(9, 5, true));
        assert_eq!("9:05am", time_label(9, 5, false));
        assert_eq!("12:00am", time_label(0, 0, false));
        assert_eq!("12:30pm", time_label(12, 30, false));
        assert_eq!("11:59pm", time_label(23, 59, false));
    }

    #[test]
    fn test_is_happening_is_inclusive() {
        let e = event("x", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 10, 0), None);
        assert!(e.is_happening(&at(2024, 1, 1, 9, 0)));
        assert!(e.is_happening(&at(2024, 1, 1, 10, 0)));
        assert!(!e.is_happening(&at(2024, 1, 1, 10, 1)));
    }

    #[test]
    fn test_intern_reuses_calendars() {
        let mut calendars = Calendars::default();
        let a = calendars.intern("Work", AccessRole::Owner);
        let b = calendars.intern("Home", AccessRole::Reader);
        assert_eq!(a, calendars.intern("Work", AccessRole::Reader));
        assert_ne!(a, b);
        assert_eq!(2, calendars.len());
        assert_eq!(AccessRole::Owner, calendars.get(a).unwrap().access_role);
    }

    #[test]
    fn test_select_prefers_exact_match() {
        let mut calendars = Calendars::default();
        let work = calendars.intern("Work", AccessRole::Owner);
        let _ = calendars.intern("Work Travel", AccessRole::Owner);
        let red = Color::from_name("red");
        let selected = calendars.select(&[CalendarSelector {
            name: "Work".to_owned(),
            color: red,
        }]);
        assert_eq!(vec![work], selected);
        assert_eq!(red, calendars.get(work).unwrap().color);
    }

    #[test]
    fn test_select_substring_ignores_case() {
        let mut calendars = Calendars::default();
        let a = calendars.intern("Work", AccessRole::Owner);
        let b = calendars.intern("Work Travel", AccessRole::Owner);
        let _ = calendars.intern("Home", AccessRole::Owner);
        let selected = calendars.select(&[CalendarSelector {
            name: "work".to_owned(),
            color: None,
        }]);
        assert_eq!(vec![a, b], selected);
    }

    #[test]
    fn test_event_list_sorts_and_windows() {
        let mut calendars = Calendars::default();
        let work = calendars.intern("Work", AccessRole::Owner);
        let home = calendars.intern("Home", AccessRole::Owner);
        let mut list = EventList::new(
            calendars,
            vec![
                event("b", at(2024, 1, 2, 9, 0), at(2024, 1, 2, 10, 0), Some(work)),
                event("a", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 10, 0), Some(home)),
                event("c", at(2024, 1, 3, 0, 0), at(2024, 1, 3, 1, 0), Some(work)),
            ],
        );
        let titles = |v: Vec<Event>| v.into_iter().map(|e| e.title).collect::<Vec<_>>();
        assert_eq!(
            vec!["a", "b"],
            titles(list.events_between(&at(2024, 1, 1, 0, 0), &at(2024, 1, 3, 0, 0)))
        );

        list.select(&[CalendarSelector {
            name: "Work".to_owned(),
            color: None,
        }]);
        assert_eq!(
            vec!["b", "c"],
            titles(list.events_between(&at(2024, 1, 1, 0, 0), &at(2024, 2, 1, 0, 0)))
        );
    }

    #[test]
    fn test_search() {
        let mut list = EventList::new(
            Calendars::default(),
            vec![
                event("Standup", at(2024, 1, 1, 9, 0), at(2024, 1, 1, 9, 15), None),
                event("Lunch", at(2024, 1, 1, 12, 0), at(2024, 1, 1, 13, 0), None),
            ],
        );
        list.search("STAND");
        assert_eq!(1, list.events().len());
        assert_eq!("Standup", list.events()[0].title);
    }
}
