use std::{
    collections::BTreeMap,
    fmt::{self, Formatter},
    str::FromStr,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Value of a single named parameter passed to a remote procedure
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Integer(i64),
    Date(NaiveDate),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Integer(n) => write!(f, "{n}"),
            ParamValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ParamValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(value: NaiveDate) -> Self {
        ParamValue::Date(value)
    }
}

impl<T> From<Option<T>> for ParamValue
where
    T: Into<ParamValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// Parses the textual form used on the command line.
///
/// `null` gives [`ParamValue::Null`], anything that parses as an `i64` gives an integer, and
/// everything else is text. Wrap a value in single or double quotes to force text, which is
/// needed for numeric identifiers: `'1327836427915886643'`.
impl FromStr for ParamValue {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let quoted = s.len() >= 2
            && ((s.starts_with('\'') && s.ends_with('\'')) || (s.starts_with('"') && s.ends_with('"')));
        if quoted {
            return Ok(ParamValue::Text(s[1..s.len() - 1].to_string()));
        }
        if s == "null" {
            return Ok(ParamValue::Null);
        }
        Ok(s.parse::<i64>()
            .map_or_else(|_| ParamValue::Text(s.to_string()), ParamValue::Integer))
    }
}

/// A named remote procedure together with its named arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RpcInvocation {
    pub name: String,
    pub params: BTreeMap<String, ParamValue>,
}

impl RpcInvocation {
    pub fn new<N: Into<String>>(name: N) -> Self {
        RpcInvocation {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn param<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.params.insert(key.into(), value.into());
        self
    }

    /// The JSON object posted as the request body
    #[allow(clippy::missing_errors_doc)]
    pub fn body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.params)
    }
}

impl fmt::Display for RpcInvocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{k} => {v}"))
            .collect();
        write!(f, "{}({})", self.name, args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_keeps_types_and_nulls() {
        let start: Option<NaiveDate> = None;
        let inv = RpcInvocation::new("get_daily_message_stats")
            .param("p_guild_id", "1327836427915886643")
            .param("p_days", 30_i64)
            .param("p_timezone", "America/Sao_Paulo")
            .param("p_start_date", start);

        assert_eq!(
            inv.body().unwrap(),
            json!({
                "p_guild_id": "1327836427915886643",
                "p_days": 30,
                "p_timezone": "America/Sao_Paulo",
                "p_start_date": null
            })
        );
    }

    #[test]
    fn date_serializes_as_iso_day() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let inv = RpcInvocation::new("f").param("p_start_date", Some(day));
        assert_eq!(inv.body().unwrap(), json!({ "p_start_date": "2026-01-01" }));
    }

    #[test]
    fn parse_command_line_values() {
        assert_eq!("null".parse::<ParamValue>().unwrap(), ParamValue::Null);
        assert_eq!("30".parse::<ParamValue>().unwrap(), ParamValue::Integer(30));
        assert_eq!(
            "America/Sao_Paulo".parse::<ParamValue>().unwrap(),
            ParamValue::Text("America/Sao_Paulo".into())
        );
        assert_eq!(
            "'1327836427915886643'".parse::<ParamValue>().unwrap(),
            ParamValue::Text("1327836427915886643".into())
        );
        assert_eq!("\"null\"".parse::<ParamValue>().unwrap(), ParamValue::Text("null".into()));
    }

    #[test]
    fn display_reads_like_a_call() {
        let inv = RpcInvocation::new("get_top_users_by_messages")
            .param("p_limit", 10_i64)
            .param("p_guild_id", "42");
        assert_eq!(inv.to_string(), "get_top_users_by_messages(p_guild_id => '42', p_limit => 10)");
    }
}
