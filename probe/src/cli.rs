use std::{
    fmt::{self, Formatter},
    path::PathBuf,
};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rpc_client::models::{ParamValue, RpcInvocation};

use crate::probe::{
    parse_key_val, ProbeSettings, DEFAULT_DAYS, DEFAULT_GUILD_ID, DEFAULT_LIMIT, DEFAULT_TIMEZONE,
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub(crate) enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
/// Supabase remote procedure probe - call the dashboard statistics functions and show what
/// comes back
///
/// The project url and service role key are read from `NEXT_PUBLIC_SUPABASE_URL` and
/// `SUPABASE_SERVICE_ROLE_KEY`. A `.env` file in the current directory, or any parent, is
/// loaded first.
///
/// Without a subcommand `check` is run with its default arguments.
#[command(author, version, about)] // Read from Cargo.toml
pub(crate) struct Opts {
    #[command(subcommand)]
    pub cmd: Option<Command>,

    #[arg(global = true, short, long)]
    pub verbosity: Option<LogLevel>,

    /// Load variables from this file instead of searching for `.env`
    #[arg(global = true, long)]
    pub env_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Call get_daily_message_stats followed by get_top_users_by_messages
    Check(Check),
    /// Call any remote procedure with the given parameters
    Call(Call),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub(crate) struct Check {
    /// Guild (Discord server) id, passed on as text
    #[arg(short, long, default_value = DEFAULT_GUILD_ID)]
    pub guild_id: String,
    /// Size of the window in days
    #[arg(short, long, default_value_t = DEFAULT_DAYS)]
    pub days: u32,
    /// IANA time zone used to bucket the daily stats
    #[arg(short, long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,
    /// Maximum number of users returned by get_top_users_by_messages
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: u32,
    /// First day of the window, i.e. 2026-01-01. Omit to let the server decide.
    #[arg(short, long)]
    pub start_date: Option<NaiveDate>,
}

impl Default for Check {
    fn default() -> Self {
        ProbeSettings::default().into()
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct Call {
    /// Name of the remote procedure
    pub name: String,
    /// Named parameter as key=value, repeat as needed.
    ///
    /// `null` is sent as null and integers as numbers; quote a value to force text:
    ///     -p "p_guild_id='1327836427915886643'" -p p_days=30
    #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
    pub params: Vec<(String, ParamValue)>,
}

impl From<Check> for ProbeSettings {
    fn from(val: Check) -> Self {
        ProbeSettings {
            guild_id: val.guild_id,
            days: val.days,
            timezone: val.timezone,
            limit: val.limit,
            start_date: val.start_date,
        }
    }
}

impl From<ProbeSettings> for Check {
    fn from(val: ProbeSettings) -> Self {
        Check {
            guild_id: val.guild_id,
            days: val.days,
            timezone: val.timezone,
            limit: val.limit,
            start_date: val.start_date,
        }
    }
}

impl From<Call> for RpcInvocation {
    fn from(val: Call) -> Self {
        val.params
            .into_iter()
            .fold(RpcInvocation::new(val.name), |inv, (k, v)| inv.param(k, v))
    }
}
