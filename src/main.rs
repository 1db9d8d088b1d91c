use anyhow::Context;
use commissioning::config::ClientConfig;
use commissioning::integration::HandlerRegistry;
use commissioning::telemetry;
use commissioning::RunType;
use serde_json::json;
use tracing::warn;

enum CliCommand {
    Validate { configs: Vec<String> },
    ListRunTypes,
    Help,
}

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise telemetry")?;

    match parse_cli_args()? {
        CliCommand::Validate { configs } => run_validate_command(configs),
        CliCommand::ListRunTypes => {
            print_run_types();
            Ok(())
        }
        CliCommand::Help => {
            print_help();
            Ok(())
        }
    }
}

fn parse_cli_args() -> anyhow::Result<CliCommand> {
    let mut args = std::env::args().skip(1);
    let Some(first) = args.next() else {
        return Ok(CliCommand::Help);
    };

    match first.as_str() {
        "validate" => {
            let mut configs = Vec::new();
            for arg in args {
                match arg.as_str() {
                    "-h" | "--help" => return Ok(CliCommand::Help),
                    other => configs.push(other.to_string()),
                }
            }
            if configs.is_empty() {
                anyhow::bail!("commissioning validate requires at least one config path");
            }
            Ok(CliCommand::Validate { configs })
        }
        "--list-run-types" => Ok(CliCommand::ListRunTypes),
        "-h" | "--help" => Ok(CliCommand::Help),
        other => anyhow::bail!("unrecognised argument `{other}`"),
    }
}

/// Prints the dispatch plan each config would produce, without touching any database.
fn run_validate_command(configs: Vec<String>) -> anyhow::Result<()> {
    let registry = HandlerRegistry::standard();
    let mut failures = 0usize;

    for path in &configs {
        let config = match ClientConfig::from_path(path) {
            Ok(config) => config,
            Err(err) => {
                failures += 1;
                eprintln!("{path}: {err}");
                continue;
            }
        };

        let handler = registry.contains(config.run_type);
        if config.run_type == RunType::Unknown {
            warn!(config = %path, "run type is not recognised; no handler will be created");
        }

        let plan = json!({
            "config": path,
            "run_type": config.run_type.as_str(),
            "handler": handler,
            "upload_to_config_db": config.upload_to_config_db,
            "test": config.test,
            "writes_to_db": handler && config.upload_to_config_db && !config.test,
            "required_partition": config.partition,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&plan).context("failed to render plan")?
        );
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} config(s) failed to load", configs.len());
    }
    Ok(())
}

fn print_run_types() {
    let registry = HandlerRegistry::standard();
    for run_type in RunType::ALL {
        let status = if registry.contains(run_type) {
            "handler"
        } else if run_type == RunType::Unknown {
            "warns"
        } else {
            "idle"
        };
        println!("{:<20} {status}", run_type.as_str());
    }
}

fn print_help() {
    println!(
        "Usage: commissioning <COMMAND>\n\n\
         Commands:\n  \
           validate <CONFIG>...   Print the dispatch plan for each session config\n  \
           --list-run-types       List run types and whether they map to a handler\n  \
           -h, --help             Show this help"
    );
}
