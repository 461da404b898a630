use arpeggios::base_path::{Environment, Mode};
use arpeggios::build::build_feed;
use arpeggios::config::Config;
use arpeggios::render::Dialect;
use clap::{App, Arg};
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let matches = App::new("arpeggios")
        .about("Generates the blog's RSS or Atom feed")
        .arg(
            Arg::with_name("project")
                .long("project")
                .value_name("DIR")
                .default_value(".")
                .help("Directory in which to start looking for arpeggios.yaml"),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .value_name("DIR")
                .default_value("dist")
                .help("Directory the feed file is written into"),
        )
        .arg(
            Arg::with_name("mode")
                .long("mode")
                .possible_values(&["development", "production"])
                .default_value("production")
                .help("Build mode, consulted by the `mode` base path strategy"),
        )
        .arg(
            Arg::with_name("dialect")
                .long("dialect")
                .possible_values(&["rss", "atom"])
                .help("Overrides the feed dialect from the project file"),
        )
        .get_matches();

    let mode: Mode = matches.value_of("mode").unwrap_or("production").parse()?;
    let dialect = matches
        .value_of("dialect")
        .map(str::parse::<Dialect>)
        .transpose()?;

    let config = Config::from_directory(
        Path::new(matches.value_of("project").unwrap_or(".")),
        Path::new(matches.value_of("output").unwrap_or("dist")),
        dialect,
    )?;
    build_feed(&config, &Environment::from_process(mode))?;
    Ok(())
}
