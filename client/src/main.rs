use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;

use disperse_client::{
    config::{self, Config},
    logging, CallSpec, DistributionSummary, InputMode, Session, TokenSnapshot,
};
use disperse_types::{Address, U256};

/// Validates and plans batch distributions of the native coin or a token.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used if omitted.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validates a recipient list and prints its summary as JSON.
    Validate(DistributionArgs),
    /// Prints the contract calls a distribution would submit, in order, as JSON.
    Plan(DistributionArgs),
    /// Prints the default configuration as TOML.
    GenerateConfig,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Every line is `address amount`.
    List,
    /// Every line is an address, all receive `--amount`.
    Global,
}

impl From<Mode> for InputMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::List => InputMode::List,
            Mode::Global => InputMode::Global,
        }
    }
}

#[derive(Debug, Args)]
struct DistributionArgs {
    /// File with one recipient per line, or `-` for stdin.
    #[arg(long, short, default_value = "-")]
    input: String,

    /// How amounts are supplied.
    #[arg(long, value_enum, default_value_t = Mode::List)]
    mode: Mode,

    /// Amount every recipient receives in global mode.
    #[arg(long, required_if_eq("mode", "global"))]
    amount: Option<String>,

    /// Token contract address. The native coin is distributed if omitted.
    #[arg(long)]
    token: Option<String>,

    /// Number of decimals of the token.
    #[arg(long, requires = "token")]
    decimals: Option<u8>,

    /// Symbol of the token.
    #[arg(long, requires = "token")]
    symbol: Option<String>,

    /// Allowance already granted to the distributor, in base units. Zero if omitted.
    #[arg(long, requires = "token")]
    allowance: Option<String>,
}

#[derive(Serialize)]
struct PlannedCall {
    function: &'static str,
    target: Address,
    value: U256,
    calldata: String,
    call: CallSpec,
}

impl From<CallSpec> for PlannedCall {
    fn from(call: CallSpec) -> Self {
        PlannedCall {
            function: call.function_signature(),
            target: call.target(),
            value: call.value(),
            calldata: format!("0x{}", hex::encode(call.calldata())),
            call,
        }
    }
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read recipients from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read recipients from {}", input))
    }
}

/// Builds a session for `args` and parses the recipients into it.
fn prepare(config: &Config, args: &DistributionArgs) -> anyhow::Result<Session> {
    let mut session = Session::new(config.distributor.native_decimals);
    if let Some(token) = &args.token {
        session.select_token(token);
        let token = session.active_token()?;
        let decimals = match args.decimals {
            Some(decimals) => decimals,
            None => bail!("--decimals is required when distributing a token"),
        };
        let allowance = match &args.allowance {
            Some(allowance) => U256::from_dec_str(allowance.trim())
                .map_err(|error| anyhow::anyhow!("invalid allowance '{}': {:?}", allowance, error))?,
            None => U256::zero(),
        };
        session.apply_token_snapshot(
            token,
            TokenSnapshot {
                symbol: args.symbol.clone().unwrap_or_else(|| "TOKEN".to_string()),
                decimals,
                allowance,
            },
        );
    }
    session.set_input_mode(args.mode.into());

    let text = read_input(&args.input)?;
    session.parse(&text, args.amount.as_deref())?;
    Ok(session)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_from_file(path)?,
        None => Config::default(),
    };
    logging::init_with_config(&config.log)?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Command::Validate(args) => {
            let summary: DistributionSummary = prepare(&config, &args)?.summary()?;
            print_json(&summary)
        }
        Command::Plan(args) => {
            let calls: Vec<PlannedCall> = prepare(&config, &args)?
                .plan(config.distributor.contract_address)?
                .into_iter()
                .map(PlannedCall::from)
                .collect();
            print_json(&calls)
        }
        Command::GenerateConfig => {
            print!("{}", config::to_string(&config)?);
            Ok(())
        }
    }
}
