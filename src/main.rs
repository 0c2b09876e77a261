mod checksum;
mod clargs;
mod display;
mod error;
mod finder;
mod group;
mod logging;
mod report;
mod scan;

use anyhow::Context;
use clargs::*;
use display::{render_json, render_text, Settings};
use finder::find_duplicates;
use std::io::{prelude::*, IsTerminal};
use structopt::StructOpt;

fn run(opt: &Opt) -> anyhow::Result<()> {
    let report = find_duplicates(&opt.directories, &opt.finder_config())
        .context("duplicate search failed")?;

    let rendered = if opt.json {
        render_json(&report)?
    } else {
        let stdout_is_terminal = std::io::stdout().is_terminal();
        let settings = Settings {
            recursive: opt.recursive,
            include_hidden: opt.include_hidden,
            verbose: opt.verbose,
            directories: &opt.directories,
        };
        render_text(&settings, &report, !opt.no_color && stdout_is_terminal)?
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered).context("failed to write report")?;
    Ok(())
}

fn main() {
    let opt = Opt::from_args();
    logging::init_logging(opt.verbose);

    if let Err(err) = run(&opt) {
        eprintln!("hashdup: {:#}", err);
        std::process::exit(1);
    }
}
