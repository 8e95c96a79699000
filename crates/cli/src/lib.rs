pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use bundlewise_core::chrono::{DateTime, Utc};
use bundlewise_core::config::{ConfigOverrides, LogFormat};
use clap::{Args, Parser, Subcommand};

use commands::doctor::DoctorArgs;
use commands::mine::MineArgs;

#[derive(Debug, Parser)]
#[command(
    name = "bundlewise",
    about = "Bundlewise frequently-bought-together miner",
    long_about = "Mine order history for product bundles, inspect configuration, and check readiness.",
    after_help = "Examples:\n  bundlewise mine --input orders.json\n  bundlewise mine --input orders.json --output bundles.json --shop north\n  bundlewise doctor --json --input orders.json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Explicit config file (defaults to bundlewise.toml)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Mine bundle suggestions from a JSON order export")]
    Mine(MineCommand),
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, order input, and output target readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Order export to check")]
        input: Option<PathBuf>,
        #[arg(long, help = "Suggestion file that `mine` would write")]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct MineCommand {
    #[arg(long, help = "JSON array of orders")]
    input: PathBuf,
    #[arg(long, help = "Write suggestions into this JSON file instead of stdout")]
    output: Option<PathBuf>,
    #[arg(long, help = "Shop whose orders are mined")]
    shop: Option<String>,
    #[arg(long, help = "Only orders at or after this RFC 3339 timestamp")]
    since: Option<DateTime<Utc>>,
    #[arg(long, help = "Only orders at or before this RFC 3339 timestamp")]
    until: Option<DateTime<Utc>>,
    #[arg(long)]
    min_support: Option<f64>,
    #[arg(long)]
    min_confidence: Option<f64>,
    #[arg(long)]
    min_lift: Option<f64>,
    #[arg(long)]
    max_per_product: Option<usize>,
    #[arg(long)]
    max_level: Option<usize>,
    #[arg(long)]
    max_basket_size: Option<usize>,
    #[arg(long)]
    log_level: Option<String>,
    #[arg(long, value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

impl MineCommand {
    fn into_args(self, config_path: Option<PathBuf>) -> MineArgs {
        MineArgs {
            input: self.input,
            output: self.output,
            shop: self.shop,
            since: self.since,
            until: self.until,
            config_path,
            overrides: ConfigOverrides {
                min_support: self.min_support,
                min_confidence: self.min_confidence,
                min_lift: self.min_lift,
                max_per_product: self.max_per_product,
                max_level: self.max_level,
                max_basket_size: self.max_basket_size,
                log_level: self.log_level,
                log_format: self.log_format,
            },
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse::<LogFormat>().map_err(|error| error.to_string())
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Mine(mine) => commands::mine::run(mine.into_args(cli.config)),
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(cli.config),
        },
        Command::Doctor { json, input, output } => {
            commands::doctor::run(DoctorArgs { json, config_path: cli.config, input, output })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
