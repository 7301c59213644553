//!
//! `rpc_client` invokes remote procedures exposed by the REST layer of a managed
//! Postgres database (Supabase / PostgREST), i.e. `POST /rest/v1/rpc/<name>`.
//!
//! The rows returned are kept as raw JSON; their shape is owned by the remote side.
use std::{
    error::Error,
    fmt::{self, Formatter},
};

use async_trait::async_trait;
use config::RpcClientConfiguration;
use log::debug;
use models::RpcInvocation;
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::{ParseError, Url};

pub mod config;
pub mod models;

pub use reqwest::StatusCode;

type Result<T> = std::result::Result<T, RpcError>;

/// Header carrying the project API key, required alongside the bearer token
const API_KEY_HEADER: &str = "apikey";

/// Error payload returned by PostgREST for a failed call
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
    /// The response body exactly as it arrived, empty when built locally
    #[serde(skip)]
    pub raw: String,
}

impl ErrorBody {
    /// Parses the response body, falling back to the raw text as the message
    fn from_response(body: &str) -> ErrorBody {
        let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_else(|_| ErrorBody {
            message: body.to_string(),
            ..ErrorBody::default()
        });
        ErrorBody {
            raw: body.to_string(),
            ..parsed
        }
    }
}

/// Writes the body as received; a locally built body is written as JSON.
impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.raw.is_empty() {
            return f.write_str(&self.raw);
        }
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[derive(Debug)]
pub enum RpcError {
    InvalidConfiguration(String),
    Unauthorized(ErrorBody),
    NotFound { url: String, body: ErrorBody },
    InvalidProcedureName(String),
    Fault { code: StatusCode, body: ErrorBody },
    RequestError(reqwest::Error),
    SerializationError(serde_json::error::Error),
    ParseError(ParseError),
}

#[allow(clippy::enum_glob_use)]
impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        use crate::RpcError::*;

        match self {
            InvalidConfiguration(reason) => write!(f, "Invalid client configuration: {reason}"),
            Unauthorized(body) => write!(f, "Unauthorized: {body}"),
            NotFound { url, body } => write!(f, "Not found: '{url}': {body}"),
            InvalidProcedureName(name) => write!(f, "Invalid procedure name: '{name}'"),
            Fault { code, body } => write!(f, "Remote procedure error ({code}): {body}"),
            RequestError(e) => write!(f, "Internal error in reqwest library: {e}"),
            SerializationError(e) => write!(f, "Could not serialize/deserialize: {e}"),
            ParseError(e) => write!(f, "Could not parse url: {e}"),
        }
    }
}

impl Error for RpcError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RpcError::RequestError(e) => Some(e),
            RpcError::SerializationError(e) => Some(e),
            RpcError::ParseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for RpcError {
    fn from(error: ParseError) -> RpcError {
        RpcError::ParseError(error)
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(error: reqwest::Error) -> RpcError {
        RpcError::RequestError(error)
    }
}

impl From<serde_json::error::Error> for RpcError {
    fn from(error: serde_json::error::Error) -> RpcError {
        RpcError::SerializationError(error)
    }
}

#[derive(Clone)]
pub enum Credentials {
    Anonymous,
    /// Service role key, sent both as `apikey` and as the bearer token
    ServiceKey(String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::ServiceKey(ref key) => request
                .header(API_KEY_HEADER, key.as_str())
                .bearer_auth(key),
        }
    }
}

// Never print the key itself
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => write!(f, "Anonymous"),
            Credentials::ServiceKey(_) => write!(f, "ServiceKey([REDACTED])"),
        }
    }
}

/// Anything able to execute a remote procedure and hand back its rows
#[async_trait]
pub trait RemoteProcedures {
    async fn rpc(&self, invocation: &RpcInvocation) -> Result<Vec<Value>>;
}

#[derive(Clone, Debug)]
pub struct RpcClient {
    host: Url,
    credentials: Credentials,
    pub client: Client,
}

impl RpcClient {
    /// Binds a client to the given host. No network traffic happens here.
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<RpcClient>
    where
        H: Into<String>,
    {
        let mut host = Url::parse(&host.into())?;
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }

        Ok(RpcClient {
            host,
            credentials,
            client: Client::new(),
        })
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn from(cfg: &RpcClientConfiguration) -> Result<RpcClient> {
        if !cfg.has_valid_url() {
            return Err(RpcError::InvalidConfiguration(format!(
                "'{}' is not a usable service url",
                cfg.url
            )));
        }
        if !cfg.has_valid_service_key() {
            return Err(RpcError::InvalidConfiguration(
                "service key is missing or still the template value".to_string(),
            ));
        }
        RpcClient::new(cfg.url.trim(), Credentials::ServiceKey(cfg.service_key.trim().to_string()))
    }

    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Url of the named procedure. The name is added as a single, escaped path segment.
    fn rpc_url(&self, name: &str) -> Result<Url> {
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(RpcError::InvalidProcedureName(name.to_string()));
        }
        let mut url = self.host.join("rest/v1/rpc")?;
        url.path_segments_mut()
            .map_err(|()| {
                RpcError::InvalidConfiguration(format!("'{}' cannot be a base url", self.host))
            })?
            .push(name);
        Ok(url)
    }

    async fn request(&self, method: Method, url: Url, body: Option<Vec<u8>>) -> Result<Value> {
        let mut request = self
            .client
            .request(method, url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        request = self.credentials.apply(request);

        if let Some(body) = body {
            request = request.body(body);
        }
        debug!("request {} {:?}", url, self.credentials);

        let response = request.send().await?;

        let status = response.status();
        let body = &response.text().await?;
        debug!("status {:?} body '{:?}'", status, body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(RpcError::Unauthorized(ErrorBody::from_response(body)))
            }
            StatusCode::NOT_FOUND => Err(RpcError::NotFound {
                url: url.to_string(),
                body: ErrorBody::from_response(body),
            }),
            failed if !failed.is_success() => Err(RpcError::Fault {
                code: status,
                body: ErrorBody::from_response(body),
            }),
            _ => {
                let data = if body.trim().is_empty() { "null" } else { body };
                Ok(serde_json::from_str::<Value>(data)?)
            }
        }
    }

    /// Invokes the named procedure, returning its rows.
    ///
    /// A scalar result becomes a single row, `null` or an empty body no rows at all.
    #[allow(clippy::missing_errors_doc)]
    pub async fn call(&self, invocation: &RpcInvocation) -> Result<Vec<Value>> {
        let url = self.rpc_url(&invocation.name)?;
        let data = serde_json::to_vec(&invocation.body()?)?;
        let value = self.request(Method::POST, url, Some(data)).await?;
        Ok(match value {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }
}

#[async_trait]
impl RemoteProcedures for RpcClient {
    async fn rpc(&self, invocation: &RpcInvocation) -> Result<Vec<Value>> {
        self.call(invocation).await
    }
}
