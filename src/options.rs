//! Options shared by the commands: colors, calendars, the event file and the clock.

use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use clap::{Arg, ArgAction, ArgMatches, value_parser};
use jiff::{Zoned, tz::TimeZone};
use tracing_subscriber::EnvFilter;

use crate::{
    clap_helper::StaticMap,
    color::{Color, Ink, Markup, Palette},
    event::{CalendarSelector, EventList},
    parser::{self, parse_calendar, parse_color, parse_datetime},
    tsv,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub const PARSER_DEFAULT: &'static str = "auto";

    pub const PARSER_MAP: StaticMap<&'static Self> = StaticMap(&[
        (Self::PARSER_DEFAULT, &Self::Auto),
        ("always", &Self::Always),
        ("never", &Self::Never),
    ]);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub color: ColorMode,
    /// Conky color macros instead of terminal escapes.
    pub conky: bool,
    pub palette: Palette,
    /// Only use these calendars (all if empty).
    pub calendars: Vec<CalendarSelector>,
    /// Tab separated events, standard input if not given or `-`.
    pub file: Option<PathBuf>,
    /// Overrides the clock, parsed relative to the real one.
    pub now: Option<String>,
    pub military: bool,
    pub verbose: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            color: ColorMode::Auto,
            conky: false,
            palette: Palette::default(),
            calendars: Vec::new(),
            file: None,
            now: None,
            military: false,
            verbose: false,
        }
    }
}

impl Options {
    pub const COLOR_LONG: &str = "color";
    pub const NOCOLOR_LONG: &str = "nocolor";
    pub const CONKY_LONG: &str = "conky";
    pub const COLOR_OWNER_LONG: &str = "color-owner";
    pub const COLOR_WRITER_LONG: &str = "color-writer";
    pub const COLOR_READER_LONG: &str = "color-reader";
    pub const COLOR_FREEBUSY_LONG: &str = "color-freebusy";
    pub const COLOR_DATE_LONG: &str = "color-date";
    pub const COLOR_NOW_MARKER_LONG: &str = "color-now-marker";
    pub const COLOR_BORDER_LONG: &str = "color-border";
    pub const CALENDAR_LONG: &str = "calendar";
    pub const FILE_LONG: &str = "file";
    pub const NOW_LONG: &str = "now";
    pub const MILITARY_LONG: &str = "military";
    pub const VERBOSE_LONG: &str = "verbose";

    pub const COLOR_SETTERS_ARGS: &[&str] = &[Self::COLOR_LONG, Self::NOCOLOR_LONG];

    /// Palette arguments with the element they color.
    const PALETTE_ARGS: [(&str, &str); 7] = [
        (Self::COLOR_OWNER_LONG, "events of calendars you own"),
        (Self::COLOR_WRITER_LONG, "events of calendars you can write"),
        (Self::COLOR_READER_LONG, "events of calendars you can read"),
        (Self::COLOR_FREEBUSY_LONG, "events of free/busy calendars"),
        (Self::COLOR_DATE_LONG, "dates and weekday names"),
        (Self::COLOR_NOW_MARKER_LONG, "the now marker and today"),
        (Self::COLOR_BORDER_LONG, "the grid lines"),
    ];

    pub fn args() -> Vec<Arg> {
        let mut args = vec![
            Arg::new(Self::COLOR_LONG)
                .long(Self::COLOR_LONG)
                .overrides_with_all(Self::COLOR_SETTERS_ARGS)
                .num_args(0..=1) // if not given don't push the default
                .default_missing_value(ColorMode::PARSER_DEFAULT)
                .value_parser(ColorMode::PARSER_MAP)
                .ignore_case(true)
                .help("set coloring behavior"),
            Arg::new(Self::NOCOLOR_LONG)
                .long(Self::NOCOLOR_LONG)
                .overrides_with_all(Self::COLOR_SETTERS_ARGS)
                .help("disable colors (equal to `--color never`)")
                .action(ArgAction::SetTrue),
            Arg::new(Self::CONKY_LONG)
                .long(Self::CONKY_LONG)
                .help("use Conky color macros instead of terminal escapes")
                .action(ArgAction::SetTrue),
        ];

        args.extend(Self::PALETTE_ARGS.map(|(long, what)| {
            Arg::new(long)
                .long(long)
                .value_name("COLOR")
                .value_parser(parse_color)
                .help(format!("color of {what}"))
        }));

        args.extend([
            Arg::new(Self::CALENDAR_LONG)
                .long(Self::CALENDAR_LONG)
                .value_name("NAME[#COLOR]")
                .action(ArgAction::Append)
                .value_parser(parse_calendar)
                .help("only use this calendar, optionally with its own color (repeatable)"),
            Arg::new(Self::FILE_LONG)
                .long(Self::FILE_LONG)
                .short('f')
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("read tab separated events from the file (`-` or none for standard input)"),
            Arg::new(Self::NOW_LONG)
                .long(Self::NOW_LONG)
                .value_name("DATETIME")
                .help("pretend the clock is at this time"),
            Arg::new(Self::MILITARY_LONG)
                .long(Self::MILITARY_LONG)
                .help("use the 24 hours clock")
                .action(ArgAction::SetTrue),
            Arg::new(Self::VERBOSE_LONG)
                .long(Self::VERBOSE_LONG)
                .short('v')
                .help("log debug messages to standard error (`RUST_LOG` takes precedence)")
                .action(ArgAction::SetTrue),
        ]);
        args
    }

    pub fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        if matches.get_flag(Self::NOCOLOR_LONG) {
            self.color = ColorMode::Never;
        } else if let Some(&color) = matches.get_one::<&ColorMode>(Self::COLOR_LONG) {
            self.color = color.clone();
        }
        if matches.get_flag(Self::CONKY_LONG) {
            self.conky = true;
        }

        let palette = &mut self.palette;
        for (id, slot) in [
            (Self::COLOR_OWNER_LONG, &mut palette.owner),
            (Self::COLOR_WRITER_LONG, &mut palette.writer),
            (Self::COLOR_READER_LONG, &mut palette.reader),
            (Self::COLOR_FREEBUSY_LONG, &mut palette.free_busy),
            (Self::COLOR_DATE_LONG, &mut palette.date),
            (Self::COLOR_NOW_MARKER_LONG, &mut palette.now_marker),
            (Self::COLOR_BORDER_LONG, &mut palette.border),
        ] {
            if let Some(&color) = matches.get_one::<Color>(id) {
                *slot = color;
            }
        }

        if let Some(calendars) = matches.get_many::<CalendarSelector>(Self::CALENDAR_LONG) {
            self.calendars = calendars.cloned().collect();
        }
        if let Some(file) = matches.get_one::<PathBuf>(Self::FILE_LONG) {
            self.file = Some(file.clone());
        }
        if let Some(now) = matches.get_one::<String>(Self::NOW_LONG) {
            self.now = Some(now.clone());
        }
        if matches.get_flag(Self::MILITARY_LONG) {
            self.military = true;
        }
        if matches.get_flag(Self::VERBOSE_LONG) {
            self.verbose = true;
        }
        Ok(())
    }

    /// Apply the color mode to [`colored`] and pick the ink of the output.
    ///
    /// Conky output is rarely a terminal so it is colored unless colors are disabled explicitly.
    pub fn apply_color(&self) -> Ink {
        match self.color {
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
            ColorMode::Auto => colored::control::unset_override(),
        }
        let enabled = match self.color {
            ColorMode::Never => false,
            ColorMode::Auto if self.conky => true,
            _ => colored::control::SHOULD_COLORIZE.should_colorize(),
        };
        let markup = if self.conky {
            Markup::Conky
        } else {
            Markup::Ansi
        };
        Ink { enabled, markup }
    }

    /// Log to standard error, `RUST_LOG` or `warn` (`debug` if verbose).
    ///
    /// Only the first call installs the subscriber.
    pub fn init_logging(&self) {
        let default_level = if self.verbose { "debug" } else { "warn" };
        let _ = tracing_subscriber::fmt()
            // also when `RUST_LOG` is set but invalid
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .or_else(|_| EnvFilter::try_new(default_level))
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_writer(io::stderr)
            .try_init();
    }

    /// The clock, possibly overridden.
    pub fn now(&self) -> Result<Zoned, parser::Error> {
        let now = Zoned::now();
        match &self.now {
            Some(s) => parse_datetime(s, &now),
            None => Ok(now),
        }
    }

    /// Read the events in `tz` and keep the selected calendars.
    pub fn read_events(&self, tz: &TimeZone) -> Result<EventList, tsv::Error> {
        let mut list = match &self.file {
            Some(path) if path.as_os_str() != "-" => {
                tracing::debug!(path = %path.display(), "reading events");
                tsv::read(BufReader::new(File::open(path)?), tz)?
            }
            _ => tsv::read(io::stdin().lock(), tz)?,
        };
        list.select(&self.calendars);
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use clap::Command;
    use colored::Color as Base;

    use super::*;

    fn parse(args: &[&str]) -> Options {
        let matches = Command::new("test")
            .args(Options::args())
            .try_get_matches_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap();
        let mut options = Options::default();
        options.update_from_arg_matches(&matches).unwrap();
        options
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Options::default(), parse(&[]));
    }

    #[test]
    fn test_color_mode() {
        assert_eq!(ColorMode::Always, parse(&["--color", "ALWAYS"]).color);
        assert_eq!(ColorMode::Never, parse(&["--color", "always", "--nocolor"]).color);
        assert_eq!(ColorMode::Auto, parse(&["--color"]).color);
    }

    #[test]
    fn test_palette_overrides() {
        let options = parse(&["--color-owner", "red", "--color-border", "brightblue"]);
        assert_eq!(Color::Normal(Base::Red), options.palette.owner);
        assert_eq!(Color::Bright(Base::Blue), options.palette.border);
        assert_eq!(Palette::default().writer, options.palette.writer);
    }

    #[test]
    fn test_calendars_and_file() {
        let options = parse(&[
            "--calendar",
            "Work#red",
            "--calendar",
            "Home",
            "-f",
            "events.tsv",
            "--military",
        ]);
        assert_eq!(
            vec!["Work", "Home"],
            options
                .calendars
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
        );
        assert_eq!(Some(PathBuf::from("events.tsv")), options.file);
        assert!(options.military);
    }

    #[test]
    fn test_invalid_color_is_rejected() {
        let result = Command::new("test")
            .args(Options::args())
            .try_get_matches_from(["test", "--color-date", "teal"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_never_has_plain_ink() {
        let options = Options {
            color: ColorMode::Never,
            conky: true,
            ..Default::default()
        };
        let ink = options.apply_color();
        assert!(!ink.enabled);
        assert_eq!(Markup::Conky, ink.markup);
    }

    #[test]
    fn test_init_logging_twice() {
        let options = Options {
            verbose: true,
            ..Default::default()
        };
        options.init_logging();
        // the second subscriber is refused without panicking
        Options::default().init_logging();
        tracing::debug!("logging is installed");
    }
}
