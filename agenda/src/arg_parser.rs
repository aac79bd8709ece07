use clap::{Arg, ArgAction, ArgMatches, Command, CommandFactory, FromArgMatches, command};
use gcal::{clap_helper::StaticMap, options::Options};

/// Extra information printed with each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    Calendar,
    Length,
    All,
}

impl Detail {
    pub const PARSER_MAP: StaticMap<Self> = StaticMap(&[
        ("calendar", Self::Calendar),
        ("length", Self::Length),
        ("all", Self::All),
    ]);
}

#[derive(Debug, PartialEq, Default)]
pub struct Args {
    /// Beginning of the listed window, today if empty.
    pub start: String,
    /// End of the listed window, a few days after the start if empty.
    pub end: String,
    pub tsv: bool,
    pub details_calendar: bool,
    pub details_length: bool,
    pub no_started: bool,
    /// Print the calendars instead of their events.
    pub list: bool,
    /// Only list the events with this text in their title.
    pub search: Option<String>,
    pub options: Options,
}

impl Args {
    pub const TSV_LONG: &str = "tsv";
    pub const DETAILS_LONG: &str = "details";
    pub const NOSTARTED_LONG: &str = "nostarted";
    pub const SEARCH_LONG: &str = "search";
    pub const LIST_LONG: &str = "list";
    pub const START_ID: &str = "start";
    pub const END_ID: &str = "end";

    pub fn args() -> [Arg; 7] {
        [
            Arg::new(Self::TSV_LONG)
                .long(Self::TSV_LONG)
                .help("print tab separated rows instead of a list")
                .action(ArgAction::SetTrue),
            Arg::new(Self::DETAILS_LONG)
                .long(Self::DETAILS_LONG)
                .value_name("DETAIL")
                .action(ArgAction::Append)
                .value_parser(Detail::PARSER_MAP)
                .ignore_case(true)
                .help("show more about the events (repeatable)"),
            Arg::new(Self::NOSTARTED_LONG)
                .long(Self::NOSTARTED_LONG)
                .help("skip the events that already started")
                .action(ArgAction::SetTrue),
            Arg::new(Self::SEARCH_LONG)
                .long(Self::SEARCH_LONG)
                .value_name("TEXT")
                .help("only list the events with the text in their title (ignoring case)"),
            Arg::new(Self::LIST_LONG)
                .long(Self::LIST_LONG)
                .help("list the calendars with their access role instead of the events")
                .action(ArgAction::SetTrue),
            Arg::new(Self::START_ID)
                .value_name("START")
                .help("list from this time (midnight today by default)"),
            Arg::new(Self::END_ID)
                .value_name("END")
                .help("list up to this time (5 days after the start by default)"),
        ]
    }
}

impl CommandFactory for Args {
    fn command() -> Command {
        command!(/* with version, about and author */)
            .args(Self::args())
            .args(Options::args())
    }

    fn command_for_update() -> Command {
        Self::command()
    }
}

impl FromArgMatches for Args {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut v = Self::default();
        v.update_from_arg_matches(matches)?;
        Ok(v)
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        if matches.get_flag(Self::TSV_LONG) {
            self.tsv = true;
        }
        if matches.get_flag(Self::NOSTARTED_LONG) {
            self.no_started = true;
        }
        if matches.get_flag(Self::LIST_LONG) {
            self.list = true;
        }
        if let Some(details) = matches.get_many::<Detail>(Self::DETAILS_LONG) {
            for detail in details {
                match detail {
                    Detail::Calendar => self.details_calendar = true,
                    Detail::Length => self.details_length = true,
                    Detail::All => {
                        self.details_calendar = true;
                        self.details_length = true;
                    }
                }
            }
        }
        if let Some(search) = matches.get_one::<String>(Self::SEARCH_LONG) {
            self.search = Some(search.clone());
        }
        if let Some(start) = matches.get_one::<String>(Self::START_ID) {
            self.start = start.clone();
        }
        if let Some(end) = matches.get_one::<String>(Self::END_ID) {
            self.end = end.clone();
        }
        self.options.update_from_arg_matches(matches)
    }
}

#[cfg(test)]
mod tests {
    use gcal::clap_helper::Parse;

    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(Args::default(), Args::try_parse_from(["gcal-agenda"]).unwrap());
    }

    #[test]
    fn test_window_and_flags() {
        let args = Args::try_parse_from([
            "gcal-agenda",
            "tomorrow",
            "next friday",
            "--tsv",
            "--details",
            "CALENDAR",
            "--nostarted",
            "--military",
        ])
        .unwrap();
        assert_eq!("tomorrow", args.start);
        assert_eq!("next friday", args.end);
        assert!(args.tsv);
        assert!(args.details_calendar);
        assert!(!args.details_length);
        assert!(args.no_started);
        assert!(args.options.military);
    }

    #[test]
    fn test_details() {
        let args = Args::try_parse_from(["gcal-agenda", "--details", "length"]).unwrap();
        assert!(!args.details_calendar);
        assert!(args.details_length);

        let args = Args::try_parse_from(["gcal-agenda", "--details", "all"]).unwrap();
        assert!(args.details_calendar);
        assert!(args.details_length);
    }

    #[test]
    fn test_list() {
        assert!(Args::try_parse_from(["gcal-agenda", "--list"]).unwrap().list);
    }

    #[test]
    fn test_search() {
        let args = Args::try_parse_from(["gcal-agenda", "--search", "standup"]).unwrap();
        assert_eq!(Some("standup".to_owned()), args.search);
        assert!(Args::try_parse_from(["gcal-agenda", "--details", "location"]).is_err());
    }
}
