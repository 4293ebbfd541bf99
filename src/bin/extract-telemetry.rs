#[macro_use]
extern crate log;

use std::path::Path;

use clap::{App, Arg};
use failure::bail;

use otkit::cli;
use otkit::config::Config;
use otkit::diagnostics::Severity;

fn cli_opts<'a, 'b>() -> App<'a, 'b> {
    cli::base_opts()
        .about("Extracts embedded telemetry from a recording or subtitle file as JSON")
        .arg(
            Arg::with_name("path")
                .long("path")
                .takes_value(true)
                .required(true)
                .help("Recording or telemetry file to read"),
        )
        .arg(
            Arg::with_name("epoch")
                .long("epoch")
                .help("Emit epoch timestamps instead of datetime text"),
        )
        .arg(
            Arg::with_name("require-timestamp")
                .long("require-timestamp")
                .help("Estimate a timestamp for every sample that lacks one"),
        )
        .arg(
            Arg::with_name("pretty")
                .long("pretty")
                .help("Pretty print the JSON output"),
        )
}

fn main() {
    cli::run(|| {
        let matches = cli_opts().get_matches();

        let cfg = match matches.value_of("config") {
            Some(path) => Config::from_file(path)?,
            None if Path::new("otkit.toml").exists() => Config::from_file("otkit.toml")?,
            None => Config::default(),
        };

        let mut options = cfg.parser_options()?;
        options.convert_to_epoch |= matches.is_present("epoch");
        options.require_timestamp |= matches.is_present("require-timestamp");

        // clap enforces this
        let path = matches.value_of("path").unwrap_or_default();
        let mut parser = cfg.detector().create_parser(path, options)?;
        let telemetry = parser.read()?;

        let diag = parser.diagnostics();
        info!(
            "Read {} packets ({} warnings, {} errors)",
            telemetry.len(),
            diag.count(Severity::Warning),
            diag.count(Severity::Error),
        );

        if matches.is_present("pretty") {
            println!("{}", telemetry.to_json_pretty()?);
        } else {
            println!("{}", telemetry.to_json()?);
        }

        if diag.has_critical() {
            bail!("Could not honour the requested options for {}", path);
        }
        Ok(())
    })
}
