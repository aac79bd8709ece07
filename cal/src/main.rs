//! Holds the `calw` and `calm` programs drawing events in a week or month grid.
//!
//! Events are read as tab separated rows (see [`gcal::tsv`]) from a file or standard input.

use std::io::Write;

use gcal::clap_helper::Parse;

use crate::{
    arg_parser::Args,
    art::LineArt,
    layout::{RenderConfig, cal_query},
};

mod arg_parser;
mod art;
mod bucket;
mod layout;
mod string;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse();
    config.options.init_logging();

    let ink = config.options.apply_color();
    let now = config.options.now()?;
    let events = config.options.read_events(now.time_zone())?;

    let render_config = RenderConfig {
        column_width: config.column_width(),
        week_start: config.week_start,
        military: config.options.military,
        palette: config.options.palette.clone(),
        ink,
        art: LineArt {
            fancy: config.line_art,
        },
        ..RenderConfig::new(now)
    };

    let lines = cal_query(
        config.view,
        &config.start,
        config.count,
        &events,
        &render_config,
    )?;

    let mut stdout = std::io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()?;
    Ok(())
}
