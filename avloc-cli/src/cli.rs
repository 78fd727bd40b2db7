//! Application definition.

extern crate simplelog;

use std::env;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Error, Result};
use avloc::{DryRun, Generator, JobConfig, QueueSubmitter, Submitter};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use self::simplelog::LevelFilter;
use crate::init;
use crate::util;

pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &'static str = env!("CARGO_PKG_AUTHORS");

pub fn app<'a, 'b>() -> App<'a, 'b> {
    let app = App::new("avloc")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .version(VERSION)
        .author(AUTHORS)
        .about("Template AV location simulation jobs and submit them to the cluster queue.")
        .arg(Arg::with_name("verbosity")
            .long("verbosity")
            .short("v")
            .takes_value(true)
            .default_value("info")
            .value_name("verb")
            .global(true)
            .help("Set the verbosity of the log output"))

        // new subcommand
        .subcommand(SubCommand::with_name("new")
            .display_order(10)
            .about("Create a new job directory with a config file and templates")
            .arg(Arg::with_name("path")
                .required(true)
                .value_name("path"))
            .arg(Arg::with_name("template")
                .possible_values(&["commented", "bare"])
                .takes_value(true)
                .default_value("commented")
                .help("Init with a template")
                .long("template")
                .short("t")))

        // plan subcommand
        .subcommand(SubCommand::with_name("plan")
            .display_order(20)
            .about("List the files a submission would generate, without writing anything")
            .arg(Arg::with_name("config")
                .value_name("config-path")
                .help("Path to the job config (defaults to ./jobs.toml)"))
            .arg(Arg::with_name("full")
                .long("full")
                .short("f")
                .help("List every script instead of a range per macro"))
            .args(&override_args()))

        // submit subcommand
        .subcommand(SubCommand::with_name("submit")
            .display_order(21)
            .about("Generate macros and scripts, submitting each script to the queue")
            .arg(Arg::with_name("config")
                .value_name("config-path")
                .help("Path to the job config (defaults to ./jobs.toml)"))
            .arg(Arg::with_name("dry-run")
                .long("dry-run")
                .short("d")
                .help("Write all files and print the queue commands without running them"))
            .arg(Arg::with_name("on-failure")
                .long("on-failure")
                .takes_value(true)
                .value_name("policy")
                .possible_values(&["ignore", "warn", "abort"])
                .help("What to do when the queue command fails"))
            .arg(Arg::with_name("command")
                .long("command")
                .short("c")
                .takes_value(true)
                .value_name("program")
                .help("Queue submission program to use instead of the configured one"))
            .args(&override_args()));

    app
}

/// Arguments overriding config file values, shared by `plan` and `submit`.
fn override_args<'a, 'b>() -> Vec<Arg<'a, 'b>> {
    vec![
        Arg::with_name("base")
            .long("base")
            .short("b")
            .takes_value(true)
            .value_name("dir")
            .help("Base directory holding macros, outputs and RATlogs"),
        Arg::with_name("repetitions")
            .long("repetitions")
            .short("n")
            .takes_value(true)
            .value_name("count")
            .help("Number of jobs per sensor and displacement"),
        Arg::with_name("events")
            .long("events")
            .short("e")
            .takes_value(true)
            .value_name("count")
            .help("Number of events per job"),
        Arg::with_name("disp-format")
            .long("disp-format")
            .takes_value(true)
            .value_name("format")
            .possible_values(&["truncate", "exact"])
            .help("How displacements are written in file names"),
        Arg::with_name("create-dirs")
            .long("create-dirs")
            .help("Create missing macros, outputs and RATlogs directories"),
    ]
}

pub fn app_matches() -> ArgMatches<'static> {
    app().get_matches()
}

/// Runs based on specified subcommand.
pub fn start(matches: ArgMatches) -> Result<()> {
    match matches.subcommand() {
        ("new", Some(m)) => start_new(m),
        ("plan", Some(m)) => start_plan(m),
        ("submit", Some(m)) => start_submit(m),
        _ => Ok(()),
    }
}

// Initiate new job directory based on input args
fn start_new(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);
    let path = matches
        .value_of("path")
        .ok_or(Error::msg("failed to get path"))?;
    let template = matches.value_of("template").unwrap_or("commented");
    init::init_at_path(path, template)
}

fn start_plan(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);
    let config = config_from_matches(matches)?;
    let generator = Generator::from_config(config)?;
    let plan = generator.plan()?;

    let full = matches.is_present("full");
    for pair in &plan {
        println!("{}", pair.macro_path.to_string_lossy());
        if full {
            for job in &pair.jobs {
                println!("   {}", job.script_path.to_string_lossy());
            }
        } else if let (Some(first), Some(last)) = (pair.jobs.first(), pair.jobs.last()) {
            println!(
                "   {} .. {} ({} scripts)",
                util::file_name(&first.script_path),
                util::file_name(&last.script_path),
                pair.jobs.len()
            );
        }
    }

    let config = generator.config();
    println!(
        "\n{} macro file(s), {} script(s) to submit",
        config.pair_count(),
        config.job_count()
    );
    for (label, values) in config.label_collisions() {
        println!("note: displacements {:?} all map to label \"{}\"", values, label);
    }
    for sensor in config.duplicate_sensors() {
        println!("note: sensor {} is listed more than once", sensor);
    }
    Ok(())
}

fn start_submit(matches: &ArgMatches) -> Result<()> {
    setup_log_verbosity(matches);
    let mut config = config_from_matches(matches)?;
    if let Some(policy) = matches.value_of("on-failure") {
        config.submit.on_failure = policy.parse::<avloc::OnFailure>()?;
    }
    if let Some(program) = matches.value_of("command") {
        config.submit.command = program.to_string();
    }
    debug!("effective config:\n{}", toml::to_string(&config)?);

    let queue = QueueSubmitter::new(&config.submit.command, &config.submit.args);
    let generator = Generator::from_config(config)?;

    let mut submitter: Box<dyn Submitter> = if matches.is_present("dry-run") {
        info!("dry run, nothing will be submitted");
        Box::new(DryRun { inner: queue })
    } else {
        Box::new(queue)
    };
    let stdout = io::stdout();
    let mut console = stdout.lock();
    let report = generator
        .run(submitter.as_mut(), &mut console)
        .context("job submission stopped")?;

    info!(
        "{} job(s) submitted, {} failed submission(s)",
        report.submitted, report.failed
    );
    Ok(())
}

/// Loads the config named on the command line (or found in the working
/// directory) and applies the override arguments on top.
pub(crate) fn config_from_matches(matches: &ArgMatches) -> Result<JobConfig> {
    let cwd = env::current_dir()?;
    let mut config = match util::resolve_config_path(&cwd, matches.value_of("config"))? {
        Some(path) => {
            info!("using job config: {}", path.to_string_lossy());
            JobConfig::from_path(&path)
                .with_context(|| format!("failed reading config: {}", path.to_string_lossy()))?
        }
        None => {
            info!(
                "no {} found, using built-in defaults",
                avloc::CONFIG_FILE_NAME
            );
            JobConfig::default()
        }
    };

    if let Some(base) = matches.value_of("base") {
        config.base_dir = PathBuf::from(base);
    }
    if let Some(n) = matches.value_of("repetitions") {
        config.repetitions = n
            .parse::<u32>()
            .with_context(|| format!("invalid repetition count: {}", n))?;
    }
    if let Some(n) = matches.value_of("events") {
        config.events = n
            .parse::<u32>()
            .with_context(|| format!("invalid event count: {}", n))?;
    }
    match matches.value_of("disp-format") {
        Some("truncate") => config.disp_format = avloc::DispFormat::Truncate,
        Some("exact") => config.disp_format = avloc::DispFormat::Exact,
        _ => (),
    }
    if matches.is_present("create-dirs") {
        config.create_dirs = true;
    }
    Ok(config)
}

fn setup_log_verbosity(matches: &ArgMatches) {
    use self::simplelog::{TermLogger, TerminalMode};
    let level_filter = parse_verbosity(matches.value_of("verbosity"));
    let mut config_builder = simplelog::ConfigBuilder::new();
    let logger_conf = config_builder
        .set_time_level(LevelFilter::Error)
        .set_target_level(LevelFilter::Debug)
        .set_location_level(LevelFilter::Trace)
        .set_time_format_str("%H:%M:%S%.6f")
        .build();
    let _ = TermLogger::init(level_filter, logger_conf, TerminalMode::Mixed);
}

fn parse_verbosity(value: Option<&str>) -> LevelFilter {
    match value {
        Some(s) => match s {
            "0" | "none" => LevelFilter::Off,
            "1" | "err" | "error" | "min" => LevelFilter::Error,
            "2" | "warn" | "warning" | "default" => LevelFilter::Warn,
            "3" | "info" => LevelFilter::Info,
            "4" | "debug" => LevelFilter::Debug,
            "5" | "trace" | "max" | "all" => LevelFilter::Trace,
            _ => LevelFilter::Warn,
        },
        _ => LevelFilter::Warn,
    }
}
