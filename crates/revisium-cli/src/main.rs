use std::path::PathBuf;

use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use revisium_cli::{diff, inspect, normalize, read_json, read_schema, CliConfig};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("revisium")
        .version(revisium_cli::VERSION)
        .about("Inspect Revisium schemas, normalize rows and diff schemas")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter, overrides RUST_LOG"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print every schema node with its pointer, type and flags")
                .arg(
                    Arg::new("schema")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Schema JSON file"),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Hydrate a row against a schema and print it in priority order")
                .arg(
                    Arg::new("schema")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Schema JSON file"),
                )
                .arg(
                    Arg::new("row")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Row JSON file"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Print the JSON Patch turning one schema into another")
                .arg(
                    Arg::new("old")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Current schema JSON file"),
                )
                .arg(
                    Arg::new("new")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Target schema JSON file"),
                ),
        )
}

fn init_tracing(level: Option<&String>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> anyhow::Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing <{name}>"))
}

fn run(matches: &ArgMatches) -> anyhow::Result<i32> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(file) => CliConfig::load(file)?,
        None => CliConfig::default(),
    };
    tracing::debug!(?config, "Loaded configuration");

    match matches.subcommand() {
        Some(("inspect", args)) => {
            let schema = read_schema(path(args, "schema")?)?;
            print!("{}", inspect(&schema, &config)?);
            Ok(0)
        }
        Some(("normalize", args)) => {
            let schema = read_schema(path(args, "schema")?)?;
            let row = read_json(path(args, "row")?)?;
            let normalized = normalize(&schema, &row, &config)?;

            println!("{}", serde_json::to_string_pretty(&normalized.value)?);
            for issue in &normalized.issues {
                eprintln!("{issue}");
            }
            Ok(i32::from(!normalized.is_valid()))
        }
        Some(("diff", args)) => {
            let old = read_schema(path(args, "old")?)?;
            let new = read_schema(path(args, "new")?)?;
            let patches = diff(&old, &new)?;
            println!("{}", serde_json::to_string_pretty(&patches)?);
            Ok(0)
        }
        _ => unreachable!("subcommand is required"),
    }
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_one::<String>("log-level"));

    match run(&matches) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    }
}
