//! # Supabase remote procedure probe
//!
//! A throw-away diagnostic for the dashboard statistics functions. Reads the project url and
//! service role key from the environment, calls `get_daily_message_stats` and then
//! `get_top_users_by_messages`, and prints the row count plus the first row of each.
//!
//! ## Usage Examples
//!
//! Run both calls with the default guild, a 30 day window and `America/Sao_Paulo`:
//! ```bash
//! rpc-probe
//! ```
//!
//! Point the probe at another guild and window:
//! ```bash
//! rpc-probe check --guild-id 1234 --days 7 --limit 5 --start-date 2026-01-01
//! ```
//!
//! Call an arbitrary function:
//! ```bash
//! rpc-probe call get_daily_voice_stats -p "p_guild_id='1327836427915886643'" -p p_days=30
//! ```
//!
//! A missing or template configuration ends the run with exit status 1 before anything is
//! sent. Errors returned by the remote side are printed and do not change the exit status.
use std::io;
use std::process::exit;

use clap::Parser;
use cli::{Command, LogLevel, Opts};
use config::EnvSnapshot;
use env_logger::Env;
use error::ProbeError;
use log::{debug, info};
use probe::{Probe, ProbeSettings};
use rpc_client::{models::RpcInvocation, RpcClient};

mod cli;
mod config;
mod error;
mod probe;

#[tokio::main]
async fn main() {
    let opts: Opts = Opts::parse();

    configure_logging(&opts); // Handles the -v option

    if let Err(err) = run(opts).await {
        eprintln!("{err}");
        exit(1);
    }
}

async fn run(opts: Opts) -> Result<(), ProbeError> {
    config::load_env_file(opts.env_file.as_deref())?;

    let snapshot = EnvSnapshot::from_env();
    for line in snapshot.presence_lines() {
        println!("{line}");
    }
    let cfg = snapshot.into_configuration()?;

    // Requests are only sent from here on
    let client = RpcClient::from(&cfg)?;
    info!("Client bound to {}", client.host());

    let mut probe = Probe::new(&client, io::stdout());
    match opts.cmd.unwrap_or_else(|| Command::Check(cli::Check::default())) {
        Command::Check(check) => {
            let settings: ProbeSettings = check.into();
            settings.validate()?;
            let outcomes = probe.run(&settings).await?;
            debug!("Outcomes: {outcomes:?}");
        }
        Command::Call(call) => {
            let invocation: RpcInvocation = call.into();
            let outcome = probe.invoke(&invocation).await?;
            debug!("Outcome: {outcome:?}");
        }
    }
    Ok(())
}

fn configure_logging(opts: &Opts) {
    // If nothing else was specified in RUST_LOG, use 'warn'. Logs go to stderr, the report to
    // stdout.
    env_logger::Builder::from_env(Env::default().default_filter_or(opts.verbosity.map_or(
        "warn",
        |lvl| match lvl {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        },
    )))
    .target(env_logger::Target::Stderr)
    .init();
    debug!("Logging started");
}
