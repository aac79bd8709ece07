//! Display colors, their terminal (or Conky) spelling and the calendar palette.
//!
//! A [`Color`] is only a name. It becomes a token through an [`Ink`] which knows whether color is
//! enabled at all and which markup dialect the output speaks. Tokens are always written in pairs
//! (color then reset) by the callers so nothing bleeds into the next cell.

use std::borrow::Cow;

use colored::Color as Base;

use crate::{
    clap_helper::StaticMap,
    event::{AccessRole, Calendar, CalendarRef, Calendars},
};

/// The escape character starting every ANSI token.
pub const ESC: char = '\u{1b}';

/// Dialect of the color tokens embedded in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Markup {
    /// Terminal SGR sequences (`ESC[0;31m`).
    #[default]
    Ansi,
    /// Conky text macros (`${color red}`).
    Conky,
}

/// A named display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Whatever the terminal uses by default; written as a reset.
    Default,
    Normal(Base),
    /// The bold variant of the base color.
    Bright(Base),
}

impl Color {
    pub const PARSER_MAP: StaticMap<Color> = StaticMap(&[
        ("default", Color::Default),
        ("black", Color::Normal(Base::Black)),
        ("brightblack", Color::Bright(Base::Black)),
        ("red", Color::Normal(Base::Red)),
        ("brightred", Color::Bright(Base::Red)),
        ("green", Color::Normal(Base::Green)),
        ("brightgreen", Color::Bright(Base::Green)),
        ("yellow", Color::Normal(Base::Yellow)),
        ("brightyellow", Color::Bright(Base::Yellow)),
        ("blue", Color::Normal(Base::Blue)),
        ("brightblue", Color::Bright(Base::Blue)),
        ("magenta", Color::Normal(Base::Magenta)),
        ("brightmagenta", Color::Bright(Base::Magenta)),
        ("cyan", Color::Normal(Base::Cyan)),
        ("brightcyan", Color::Bright(Base::Cyan)),
        ("white", Color::Normal(Base::White)),
        ("brightwhite", Color::Bright(Base::White)),
    ]);

    /// Look up a color by its command line name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::PARSER_MAP.get_ignore_case(name).copied()
    }

    /// The token selecting this color in the given dialect.
    pub fn token(&self, markup: Markup) -> String {
        match (markup, self) {
            (Markup::Ansi, Color::Default) => format!("{ESC}[0m"),
            (Markup::Ansi, Color::Normal(base)) => format!("{ESC}[0;{}m", base.to_fg_str()),
            (Markup::Ansi, Color::Bright(base)) => format!("{ESC}[{};1m", base.to_fg_str()),
            (Markup::Conky, Color::Default) => "${color}".to_owned(),
            (Markup::Conky, Color::Normal(base) | Color::Bright(base)) => {
                format!("${{color {}}}", conky_name(base))
            }
        }
    }
}

/// Conky only knows plain X11 names so bright variants collapse to their base.
fn conky_name(base: &Base) -> &'static str {
    match base {
        Base::Black | Base::BrightBlack => "black",
        Base::Red | Base::BrightRed => "red",
        Base::Green | Base::BrightGreen => "green",
        Base::Yellow | Base::BrightYellow => "yellow",
        Base::Blue | Base::BrightBlue => "blue",
        Base::Magenta | Base::BrightMagenta => "magenta",
        Base::Cyan | Base::BrightCyan => "cyan",
        _ => "white",
    }
}

/// Turns colors into tokens, or into nothing when color is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ink {
    pub enabled: bool,
    pub markup: Markup,
}

impl Ink {
    /// Never writes a token.
    pub const PLAIN: Self = Self {
        enabled: false,
        markup: Markup::Ansi,
    };

    pub const ANSI: Self = Self {
        enabled: true,
        markup: Markup::Ansi,
    };

    pub const CONKY: Self = Self {
        enabled: true,
        markup: Markup::Conky,
    };

    /// The token switching to `color`.
    pub fn color(&self, color: Color) -> String {
        if self.enabled {
            color.token(self.markup)
        } else {
            String::new()
        }
    }

    /// The token switching back to the default color.
    pub fn reset(&self) -> String {
        self.color(Color::Default)
    }

    /// Text as it must be written so the markup shows it literally.
    ///
    /// Conky expands anything after a `$`, so it is doubled to `$$`. ANSI text is written as is.
    pub fn escape<'a>(&self, s: &'a str) -> Cow<'a, str> {
        match self.markup {
            Markup::Conky if s.contains('$') => Cow::Owned(s.replace('$', "$$")),
            _ => Cow::Borrowed(s),
        }
    }

    /// `s` in `color` followed by a reset.
    pub fn paint(&self, color: Color, s: &str) -> String {
        self.color(color) + &self.escape(s) + &self.reset()
    }
}

impl Default for Ink {
    fn default() -> Self {
        Self::ANSI
    }
}

/// Resolves the display color of an event's calendar.
pub trait ResolveColor {
    fn calendar_color(&self, calendar: Option<CalendarRef>) -> Color;
}

/// Colors of every element of the output.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub owner: Color,
    pub writer: Color,
    pub reader: Color,
    pub free_busy: Color,
    pub date: Color,
    pub now_marker: Color,
    pub border: Color,
}

impl Palette {
    /// Color of a calendar, with its explicit override taking precedence over its access role.
    pub fn color_of(&self, calendar: Option<&Calendar>) -> Color {
        let Some(calendar) = calendar else {
            return Color::Default;
        };
        if let Some(color) = calendar.color {
            return color;
        }
        match calendar.access_role {
            AccessRole::Owner => self.owner,
            AccessRole::Writer => self.writer,
            AccessRole::Reader => self.reader,
            AccessRole::FreeBusyReader => self.free_busy,
        }
    }

    /// Bind this palette to the calendars the event handles refer to.
    pub fn resolver<'a>(&'a self, calendars: &'a Calendars) -> Resolver<'a> {
        Resolver {
            palette: self,
            calendars,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            owner: Color::Normal(Base::Cyan),
            writer: Color::Normal(Base::Green),
            reader: Color::Normal(Base::Magenta),
            free_busy: Color::Default,
            date: Color::Normal(Base::Yellow),
            now_marker: Color::Bright(Base::Red),
            border: Color::Normal(Base::White),
        }
    }
}

/// A [`Palette`] paired with the calendar list.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    palette: &'a Palette,
    calendars: &'a Calendars,
}

impl ResolveColor for Resolver<'_> {
    fn calendar_color(&self, calendar: Option<CalendarRef>) -> Color {
        self.palette
            .color_of(calendar.and_then(|r| self.calendars.get(r)))
    }
}
