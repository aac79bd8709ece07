//! Structures the week and month grids for printing.
//!
//! # Layout Reference
//!
//! Week view (`calw`), `COUNT` week rows:
//! ```text
//! .-------------------------------------------.
//! |  WEEKDAY  |  WEEKDAY  | ... x7             | } 1 Line
//! |-----------+-----------+--------------------|
//! |   DATE    |   DATE    | ... x7             | } 1 Line  .
//! |  EVENTS   |  EVENTS   | ...                | } n Lines  > per week
//! |-----------+-----------+--------------------|           *
//! `--------------------------------------------*
//! ```
//!
//! The month view (`calm`) has an extra `MONTH YEAR` line spanning all the cells on top and
//! leaves the dates of the other months blank.
//!
//! Every cell is exactly `column_width` columns, so each line is `7 * (column_width + 1) + 1`
//! columns wide whatever tokens it holds.

use gcal::{
    WEEKDAYS,
    color::{Color, Ink, Markup, Palette, ResolveColor},
    event::{Event, EventSource},
    parser::{self, parse_day},
};
use jiff::{
    ToSpan, Zoned,
    civil::{Date, Weekday},
};

use crate::{
    art::{Art, LineArt},
    bucket::{Cell, build_week},
    string::{Aligner, strip_tokens, visible_width},
};

/// How many days is in each week.
pub const WEEK_DAYS: usize = 7;

/// Columns of a day cell unless asked otherwise.
pub const DEFAULT_COLUMN_WIDTH: usize = 10;

/// Today's date cell is marked with this suffix.
pub const TODAY_SUFFIX: &str = " **";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// `calw`
    Week,
    /// `calm`
    Month,
}

/// The first day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// Position of the weekday in a week starting on this day.
    pub fn offset(self, weekday: Weekday) -> usize {
        let offset = match self {
            Self::Sunday => weekday.to_sunday_zero_offset(),
            Self::Monday => weekday.to_monday_zero_offset(),
        };
        offset as usize
    }

    /// The first day of the week holding `date`.
    pub fn snap(self, date: Date) -> Date {
        date.saturating_sub((self.offset(date.weekday()) as i64).days())
    }

    /// Weekday names in the order of the columns.
    pub fn weekday_names(self) -> [&'static str; WEEK_DAYS] {
        let first = self.offset(Weekday::Sunday);
        // Sunday is at `first`, so the column `i` is `WEEKDAYS[i - first]`
        std::array::from_fn(|i| WEEKDAYS[(i + WEEK_DAYS - first) % WEEK_DAYS])
    }
}

/// Everything a grid needs besides its events.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub column_width: usize,
    pub week_start: WeekStart,
    /// 24 hours clock.
    pub military: bool,
    pub palette: Palette,
    pub now: Zoned,
    pub ink: Ink,
    pub art: LineArt,
}

impl RenderConfig {
    /// Default options with the clock at `now`.
    pub fn new(now: Zoned) -> Self {
        Self {
            column_width: DEFAULT_COLUMN_WIDTH,
            week_start: WeekStart::default(),
            military: false,
            palette: Palette::default(),
            now,
            ink: Ink::default(),
            art: LineArt { fancy: true },
        }
    }

    /// Columns of a whole grid line.
    pub fn line_width(&self) -> usize {
        WEEK_DAYS * (self.column_width + 1) + 1
    }

    /// Columns a rendered line takes, line art being ANSI escapes in every markup.
    pub fn visible_width(&self, line: &str) -> usize {
        visible_width(&strip_tokens(line, Markup::Ansi), self.ink.markup)
    }
}

/// Draws the pieces of a grid line.
struct Painter<'a> {
    config: &'a RenderConfig,
}

impl Painter<'_> {
    fn border(&self, art: &str) -> String {
        self.config.ink.paint(self.config.palette.border, art)
    }

    fn vertical(&self) -> String {
        self.border(&self.config.art.draw([Art::Vertical]))
    }

    fn divider(&self, left: Art, joint: Art, right: Art) -> String {
        let art = self
            .config
            .art
            .divider(left, joint, right, self.config.column_width);
        self.border(&art)
    }

    fn empty(&self) -> String {
        Aligner::SPACE.filler(self.config.column_width)
    }

    /// Already cut text of `width` columns, padded to the cell.
    fn cell(&self, color: Color, text: &str, width: usize) -> String {
        let ink = &self.config.ink;
        let padding = Aligner::SPACE.filler(self.config.column_width.saturating_sub(width));
        ink.color(color) + &ink.escape(text) + &padding + &ink.reset()
    }

    /// Any text fitted to exactly `width` columns.
    fn label(&self, color: Color, text: &str, width: usize) -> String {
        self.config
            .ink
            .paint(color, &Aligner::SPACE.left(text, width))
    }

    fn row(&self, cells: impl IntoIterator<Item = String>) -> String {
        let vertical = self.vertical();
        cells
            .into_iter()
            .fold(vertical.clone(), |acc, cell| acc + &cell + &vertical)
    }
}

/// Render `week_count` weeks from `start`, with the headers of the view.
///
/// `start` is the first day of the first week in the week view and the first of the month in the
/// month view. Events starting before `start` are ignored.
pub fn render(
    view: View,
    start: Date,
    week_count: usize,
    events: &[Event],
    config: &RenderConfig,
    colors: &dyn ResolveColor,
) -> Vec<String> {
    let painter = Painter { config };
    let width = config.column_width;
    let palette = &config.palette;
    let first = events
        .iter()
        .position(|e| e.start.date() >= start)
        .unwrap_or(events.len());
    let events = &events[first..];

    let mut lines = Vec::new();
    match view {
        View::Week => lines.push(painter.divider(Art::UpperLeft, Art::TopTee, Art::UpperRight)),
        View::Month => {
            lines.push(painter.divider(Art::UpperLeft, Art::Horizontal, Art::UpperRight));
            let month = start.strftime("%B %Y").to_string();
            let label = painter.label(palette.date, &month, WEEK_DAYS * width + WEEK_DAYS - 1);
            lines.push(painter.row([label]));
            lines.push(painter.divider(Art::LeftTee, Art::TopTee, Art::RightTee));
        }
    }
    let names = config.week_start.weekday_names();
    lines.push(painter.row(names.map(|name| painter.label(palette.date, name, width))));
    let middle = painter.divider(Art::LeftTee, Art::Cross, Art::RightTee);
    lines.push(middle.clone());

    let month = (start.year(), start.month());
    let today = config.now.date();
    let mut week_start = match view {
        View::Week => start,
        View::Month => config.week_start.snap(start),
    };

    for week in 0..week_count {
        let dates = (0..WEEK_DAYS).map(|i| {
            let day = week_start.saturating_add((i as i64).days());
            let mut text = match view {
                View::Week => day.strftime("%d %b").to_string(),
                View::Month if (day.year(), day.month()) == month => {
                    day.strftime("%d").to_string()
                }
                View::Month => String::new(),
            };
            let color = if day == today {
                text.push_str(TODAY_SUFFIX);
                palette.now_marker
            } else {
                palette.date
            };
            painter.label(color, &text, width)
        });
        lines.push(painter.row(dates));

        let mut buckets = build_week(view, month, week_start, events, config, colors);
        loop {
            let mut done = true;
            let mut cells = Vec::with_capacity(WEEK_DAYS);
            for bucket in &mut buckets {
                let cell = match bucket.next_cell(width) {
                    Cell::Exhausted => painter.empty(),
                    Cell::Separator => {
                        done = false;
                        painter.empty()
                    }
                    Cell::Text { color, text, width } => {
                        done = false;
                        painter.cell(color, text, width)
                    }
                };
                cells.push(cell);
            }
            if done {
                break;
            }
            lines.push(painter.row(cells));
        }

        if week + 1 < week_count {
            lines.push(middle.clone());
        } else {
            lines.push(painter.divider(Art::LowerLeft, Art::BottomTee, Art::LowerRight));
        }
        week_start = week_start.saturating_add((WEEK_DAYS as i64).days());
    }

    // only a glyph wider than the cell itself can overflow
    for line in &lines {
        let line_width = config.visible_width(line);
        if line_width != config.line_width() {
            tracing::debug!(line_width, expected = config.line_width(), "misaligned line");
        }
    }
    lines
}

/// The dates `[start, end)` and the number of week rows shown for `date`.
pub fn window(view: View, date: Date, count: usize, week_start: WeekStart) -> (Date, Date, usize) {
    match view {
        View::Week => {
            let start = week_start.snap(date);
            let days = (count as i64).saturating_mul(WEEK_DAYS as i64);
            (start, start.saturating_add(days.days()), count)
        }
        View::Month => {
            let start = date.first_of_month();
            let end = start.saturating_add(1.months());
            let days = start.days_in_month() as usize;
            let offset = week_start.offset(start.weekday());
            (start, end, (days + offset).div_ceil(WEEK_DAYS))
        }
    }
}

/// Parse the start, fetch the events of its week or month window and render them.
///
/// An empty `start_text` is today. `count` is the number of weeks and ignored in the month view.
pub fn cal_query(
    view: View,
    start_text: &str,
    count: usize,
    source: &dyn EventSource,
    config: &RenderConfig,
) -> Result<Vec<String>, parser::Error> {
    let day = parse_day(start_text, &config.now)?;
    let (start, end, count) = window(view, day.date(), count, config.week_start);
    tracing::debug!(?view, %start, %end, weeks = count, "calendar window");

    let tz = config.now.time_zone().clone();
    let events = source.events_between(&start.to_zoned(tz.clone())?, &end.to_zoned(tz)?);
    let colors = config.palette.resolver(source.calendars());
    Ok(render(view, start, count, &events, config, &colors))
}
