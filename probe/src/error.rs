use std::{io, path::PathBuf};

use rpc_client::RpcError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Missing valid env vars ({0}). Please check .env file location.")]
    ConfigurationMissing(String),
    #[error("Missing valid env vars: {0}. Please check .env file location.")]
    PlaceholderConfiguration(String),
    #[error("Unable to load environment file {path:?}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("Unknown time zone '{0}', expected an IANA name like 'America/Sao_Paulo'")]
    InvalidTimezone(String),
    #[error("Could not make sense of parameter: {0}")]
    BadParameter(String),
    #[error("Unable to create rpc client: {0}")]
    Client(#[from] RpcError),
    #[error("Unable to write report: {0}")]
    Output(#[from] io::Error),
}
