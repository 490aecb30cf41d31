use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use guildsmith_bot::{ScriptedDecision, Simulation, SimulationReport, VERSION};
use guildsmith_core::{GuildsmithConfig, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("guildsmith")
        .version(VERSION)
        .about("Template-driven workspace provisioning and teardown")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
        .subcommand(
            Command::new("create-structure")
                .about("Provision a themed structure")
                .arg(
                    Arg::new("theme")
                        .long("theme")
                        .required(true)
                        .help("Theme key (musica, animes, games)"),
                )
                .arg(
                    Arg::new("runs")
                        .long("runs")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Number of consecutive runs"),
                ),
        )
        .subcommand(
            Command::new("teardown")
                .about("Provision the games theme, then tear everything down")
                .arg(
                    Arg::new("decision")
                        .long("decision")
                        .default_value("approve")
                        .value_parser(ScriptedDecision::VALUES)
                        .help("Scripted answer to the confirmation prompt"),
                ),
        )
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<GuildsmithConfig> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => GuildsmithConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GuildsmithConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn print_report(report: &SimulationReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for reply in &report.replies {
        println!("{reply}");
        println!();
    }
    for error in &report.errors {
        eprintln!("error: {error}");
    }
    println!(
        "Workspace now holds {} roles and {} channels.",
        report.roles_remaining, report.channels_remaining
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let Some((command, args)) = matches.subcommand() else {
        anyhow::bail!("a subcommand is required");
    };

    // Global flags propagate down, so the subcommand sees them wherever they were given.
    let config = load_config(args)?;
    init_tracing(&config.logging);
    let json = args.get_flag("json");

    let simulation = Simulation::new(config);
    let report = match command {
        "create-structure" => {
            let theme = args
                .get_one::<String>("theme")
                .context("missing --theme")?;
            let runs = args.get_one::<usize>("runs").copied().unwrap_or(1);
            simulation.create_structure(theme, runs).await
        }
        "teardown" => {
            let decision = args
                .get_one::<String>("decision")
                .context("missing --decision")?
                .parse::<ScriptedDecision>()
                .map_err(anyhow::Error::msg)?;
            simulation.teardown(decision).await?
        }
        other => anyhow::bail!("unknown subcommand: {other}"),
    };

    print_report(&report, json)?;
    if report.errors.is_empty() {
        Ok(())
    } else {
        std::process::exit(1)
    }
}
