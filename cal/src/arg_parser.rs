use std::num::ParseIntError;

use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, command};
use gcal::{
    clap_helper::CommandFactoryExt,
    options::Options,
};

use crate::layout::{DEFAULT_COLUMN_WIDTH, View, WEEK_DAYS, WeekStart};

/// Terminal width assumed when it cannot be measured.
pub const FALLBACK_TERMINAL_WIDTH: usize = 80;

#[derive(Debug, PartialEq)]
pub struct Args {
    pub view: View,
    /// non-zero, how many weeks `calw` prints.
    pub count: usize,
    /// Any date in the first week or month, today if empty.
    pub start: String,
    /// Columns of a day cell, `None` to fit the terminal.
    pub width: Option<usize>,
    pub week_start: WeekStart,
    pub line_art: bool,
    pub options: Options,
}

impl Args {
    /// The width of a day cell fitting the terminal, at least 1.
    pub fn auto_width(terminal_width: usize) -> usize {
        // 7 cells and 8 borders
        (terminal_width.saturating_sub(WEEK_DAYS + 1) / WEEK_DAYS).max(1)
    }

    /// The requested cell width or the one fitting the terminal.
    pub fn column_width(&self) -> usize {
        self.width.unwrap_or_else(|| {
            let terminal_width = terminal_size::terminal_size()
                .map(|(w, _)| w.0 as usize)
                .unwrap_or(FALLBACK_TERMINAL_WIDTH);
            Self::auto_width(terminal_width)
        })
    }
}

impl Args {
    pub const CALW_NAME: &str = "calw";
    pub const CALM_NAME: &str = "calm";
    pub const WIDTH_LONG: &str = "width";
    pub const SUNDAY_LONG: &str = "sunday";
    pub const MONDAY_LONG: &str = "monday";
    pub const NOLINEART_LONG: &str = "nolineart";
    pub const COUNT_ID: &str = "count";
    pub const START_ID: &str = "start";

    pub const WEEKDAY_SETTERS_ARGS: &[&str] = &[Self::SUNDAY_LONG, Self::MONDAY_LONG];

    pub fn args() -> [Arg; 4] {
        [
            Arg::new(Self::WIDTH_LONG)
                .long(Self::WIDTH_LONG)
                .short('w')
                .overrides_with(Self::WIDTH_LONG)
                .value_name("N|auto")
                .value_parser(|s: &str| -> Result<Option<usize>, String> {
                    if s == "auto" {
                        return Ok(None);
                    }
                    let v: usize = s.parse().map_err(|e: ParseIntError| e.to_string())?;
                    if v == 0 {
                        return Err("the width must be at least 1".to_string());
                    }
                    Ok(Some(v))
                })
                .help("set the width of a day (`auto` to fit the terminal)"),
            Arg::new(Self::SUNDAY_LONG)
                .long(Self::SUNDAY_LONG)
                .short('s')
                .overrides_with_all(Self::WEEKDAY_SETTERS_ARGS)
                .help("set Sunday as the first weekday (default)")
                .action(ArgAction::SetTrue),
            Arg::new(Self::MONDAY_LONG)
                .long(Self::MONDAY_LONG)
                .short('m')
                .overrides_with_all(Self::WEEKDAY_SETTERS_ARGS)
                .help("set Monday as the first weekday")
                .action(ArgAction::SetTrue),
            Arg::new(Self::NOLINEART_LONG)
                .long(Self::NOLINEART_LONG)
                .help("draw the grid with `-`, `|` and `+`")
                .action(ArgAction::SetTrue),
        ]
    }

    fn start_arg() -> Arg {
        Arg::new(Self::START_ID)
            .value_name("START")
            .help("any date in the first week or month (`2024-05-01`, `next monday`, ...)")
    }
}

impl CommandFactory for Args {
    fn command() -> Command {
        let global = Self::args()
            .into_iter()
            .chain(Options::args())
            .map(|arg| arg.global(true));

        command!(/* with version, about and author */)
            .subcommand_required(true)
            .args(global)
            .subcommand(
                Command::new(Self::CALW_NAME)
                    .about("print a week calendar of the events")
                    .arg(
                        Arg::new(Self::COUNT_ID)
                            .value_name("COUNT")
                            .value_parser(|s: &str| -> Result<usize, String> {
                                let v: usize =
                                    s.parse().map_err(|e: ParseIntError| e.to_string())?;
                                if v == 0 {
                                    return Err("print at least 1 week".to_string());
                                }
                                Ok(v)
                            })
                            .help("how many weeks to print (1 by default)"),
                    )
                    .arg(Self::start_arg()),
            )
            .subcommand(
                Command::new(Self::CALM_NAME)
                    .about("print a month calendar of the events")
                    .arg(Self::start_arg()),
            )
    }

    fn command_for_update() -> Command {
        Self::command()
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            view: View::Week,
            count: 1,
            start: String::new(),
            width: Some(DEFAULT_COLUMN_WIDTH),
            week_start: WeekStart::default(),
            line_art: true,
            options: Options::default(),
        }
    }
}

impl FromArgMatches for Args {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut v = Self::default();
        v.update_from_arg_matches(matches)?;
        Ok(v)
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        // global arguments are propagated into the subcommand
        let matches = match matches.subcommand() {
            Some((Self::CALW_NAME, sub)) => {
                self.view = View::Week;
                if let Some(&count) = sub.get_one::<usize>(Self::COUNT_ID) {
                    self.count = count;
                }
                sub
            }
            Some((Self::CALM_NAME, sub)) => {
                self.view = View::Month;
                sub
            }
            _ => {
                return Err(Self::error(
                    clap::error::ErrorKind::MissingSubcommand,
                    "either `calw` or `calm` is required",
                ));
            }
        };

        if let Some(start) = matches.get_one::<String>(Self::START_ID) {
            self.start = start.clone();
        }
        if let Some(&width) = matches.get_one::<Option<usize>>(Self::WIDTH_LONG) {
            self.width = width;
        }

        // WEEKDAY_SETTERS_ARGS
        if matches.get_flag(Self::MONDAY_LONG) {
            self.week_start = WeekStart::Monday;
        } else if matches.get_flag(Self::SUNDAY_LONG) {
            self.week_start = WeekStart::Sunday;
        }

        if matches.get_flag(Self::NOLINEART_LONG) {
            self.line_art = false;
        }

        self.options.update_from_arg_matches(matches)
    }
}
