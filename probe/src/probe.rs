use std::io::Write;

use chrono::NaiveDate;
use chrono_tz::Tz;
use log::{debug, error};
use rpc_client::{
    models::{ParamValue, RpcInvocation},
    RemoteProcedures,
};

use crate::error::ProbeError;

pub(crate) const DAILY_MESSAGE_STATS: &str = "get_daily_message_stats";
pub(crate) const TOP_USERS_BY_MESSAGES: &str = "get_top_users_by_messages";

pub(crate) const DEFAULT_GUILD_ID: &str = "1327836427915886643";
pub(crate) const DEFAULT_DAYS: u32 = 30;
pub(crate) const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";
pub(crate) const DEFAULT_LIMIT: u32 = 10;

/// Arguments shared by the two dashboard procedures
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProbeSettings {
    pub guild_id: String,
    pub days: u32,
    pub timezone: String,
    pub limit: u32,
    pub start_date: Option<NaiveDate>,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        ProbeSettings {
            guild_id: DEFAULT_GUILD_ID.to_string(),
            days: DEFAULT_DAYS,
            timezone: DEFAULT_TIMEZONE.to_string(),
            limit: DEFAULT_LIMIT,
            start_date: None,
        }
    }
}

impl ProbeSettings {
    pub fn validate(&self) -> Result<(), ProbeError> {
        if self.timezone.parse::<Tz>().is_err() {
            return Err(ProbeError::InvalidTimezone(self.timezone.clone()));
        }
        if self.guild_id.trim().is_empty() {
            return Err(ProbeError::BadParameter("guild id must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn daily_message_stats(&self) -> RpcInvocation {
        RpcInvocation::new(DAILY_MESSAGE_STATS)
            .param("p_guild_id", self.guild_id.as_str())
            .param("p_days", self.days)
            .param("p_timezone", self.timezone.as_str())
            .param("p_start_date", self.start_date)
    }

    pub fn top_users_by_messages(&self) -> RpcInvocation {
        RpcInvocation::new(TOP_USERS_BY_MESSAGES)
            .param("p_guild_id", self.guild_id.as_str())
            .param("p_days", self.days)
            .param("p_limit", self.limit)
            .param("p_start_date", self.start_date)
    }
}

/// What happened to a single remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallOutcome {
    Rows(usize),
    Failed(String),
}

/// Runs invocations against `remote`, reporting each result on `out`.
pub(crate) struct Probe<'a, R, W> {
    remote: &'a R,
    out: W,
}

impl<'a, R, W> Probe<'a, R, W>
where
    R: RemoteProcedures + Sync,
    W: Write,
{
    pub fn new(remote: &'a R, out: W) -> Self {
        Probe { remote, out }
    }

    /// Invokes a single procedure. A failed call is reported and returned, never propagated;
    /// only a failure to write the report is an error.
    pub async fn invoke(&mut self, invocation: &RpcInvocation) -> Result<CallOutcome, ProbeError> {
        writeln!(self.out, "\n--- Calling {} ---", invocation.name)?;
        debug!("Invoking {invocation}");

        match self.remote.rpc(invocation).await {
            Ok(rows) => {
                writeln!(self.out, "Returned {} rows", rows.len())?;
                if let Some(first) = rows.first() {
                    writeln!(self.out, "{first}")?;
                }
                Ok(CallOutcome::Rows(rows.len()))
            }
            Err(err) => {
                error!("{} failed: {err}", invocation.name);
                writeln!(self.out, "Error: {err}")?;
                Ok(CallOutcome::Failed(err.to_string()))
            }
        }
    }

    /// Daily message stats first, then the top users, each awaited before the next starts.
    pub async fn run(&mut self, settings: &ProbeSettings) -> Result<Vec<CallOutcome>, ProbeError> {
        writeln!(self.out, "Testing RPC for guild: {}", settings.guild_id)?;
        let daily = self.invoke(&settings.daily_message_stats()).await?;
        let top_users = self.invoke(&settings.top_users_by_messages()).await?;
        Ok(vec![daily, top_users])
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Parses `key=value`, as given to `--param`
pub(crate) fn parse_key_val(s: &str) -> Result<(String, ParamValue), ProbeError> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| ProbeError::BadParameter(format!("expected key=value, found '{s}'")))?;
    if key.trim().is_empty() {
        return Err(ProbeError::BadParameter(format!("missing parameter name in '{s}'")));
    }
    // Infallible
    let value = value.parse::<ParamValue>().unwrap_or(ParamValue::Null);
    Ok((key.trim().to_string(), value))
}
