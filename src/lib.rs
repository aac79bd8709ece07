//! Common utilities for `gcal-cal` and `gcal-agenda`.
pub mod clap_helper;
pub mod color;
pub mod event;
pub mod options;
pub mod parser;
pub mod tsv;

/// Sunday based weekdays in English.
pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
