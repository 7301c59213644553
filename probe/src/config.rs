//! Reads the endpoint and service key from the process environment.
//!
//! A `.env` file is loaded first, if one can be found, so values already exported in the
//! shell take precedence over the file.
use std::path::Path;

use log::{debug, info};
use rpc_client::config::{RpcClientConfiguration, SUPABASE_SERVICE_ROLE_KEY, SUPABASE_URL};

use crate::error::ProbeError;

/// Loads `path`, or searches for `.env` from the current directory upwards when no path is
/// given. Only an explicitly named file is required to exist.
pub(crate) fn load_env_file(path: Option<&Path>) -> Result<(), ProbeError> {
    match path {
        Some(path) => {
            dotenvy::from_path(path).map_err(|source| ProbeError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
            info!("Loaded environment from {}", path.display());
        }
        None => match dotenvy::dotenv() {
            Ok(found) => info!("Loaded environment from {}", found.display()),
            Err(e) => debug!("No .env file loaded: {e}"),
        },
    }
    Ok(())
}

/// The raw values as found in the environment, before any validation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct EnvSnapshot {
    pub url: Option<String>,
    pub service_key: Option<String>,
}

impl EnvSnapshot {
    /// Captures the two variables using `lookup`. Blank values count as absent.
    pub fn capture<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        EnvSnapshot {
            url: read(SUPABASE_URL),
            service_key: read(SUPABASE_SERVICE_ROLE_KEY),
        }
    }

    pub fn from_env() -> Self {
        EnvSnapshot::capture(|name| std::env::var(name).ok())
    }

    /// One status line per variable, never including the value
    pub fn presence_lines(&self) -> Vec<String> {
        let found = |v: &Option<String>| if v.is_some() { "Found" } else { "Missing" };
        vec![
            format!("URL: {}", found(&self.url)),
            format!("Key: {}", found(&self.service_key)),
        ]
    }

    /// Fails fast when a value is missing or still holds the template placeholder.
    pub fn into_configuration(self) -> Result<RpcClientConfiguration, ProbeError> {
        let missing: Vec<&str> = [
            (SUPABASE_URL, self.url.is_none()),
            (SUPABASE_SERVICE_ROLE_KEY, self.service_key.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();
        if !missing.is_empty() {
            return Err(ProbeError::ConfigurationMissing(missing.join(", ")));
        }

        let cfg = RpcClientConfiguration::new(
            self.url.unwrap_or_default(),
            self.service_key.unwrap_or_default(),
        );
        if !cfg.has_valid_url() {
            return Err(ProbeError::PlaceholderConfiguration(format!(
                "{SUPABASE_URL} is not a usable project url"
            )));
        }
        if !cfg.has_valid_service_key() {
            return Err(ProbeError::PlaceholderConfiguration(format!(
                "{SUPABASE_SERVICE_ROLE_KEY} still holds the template value"
            )));
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn snapshot(vars: &[(&str, &str)]) -> EnvSnapshot {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvSnapshot::capture(|name| map.get(name).cloned())
    }

    #[test]
    fn both_absent_is_missing() {
        let snap = snapshot(&[]);
        assert_eq!(snap.presence_lines(), vec!["URL: Missing", "Key: Missing"]);
        match snap.into_configuration() {
            Err(ProbeError::ConfigurationMissing(names)) => {
                assert!(names.contains(SUPABASE_URL));
                assert!(names.contains(SUPABASE_SERVICE_ROLE_KEY));
            }
            other => panic!("Expected missing configuration, got {other:?}"),
        }
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let snap = snapshot(&[(SUPABASE_URL, "https://abc.supabase.co"), (SUPABASE_SERVICE_ROLE_KEY, "  ")]);
        assert_eq!(snap.presence_lines(), vec!["URL: Found", "Key: Missing"]);
        assert!(matches!(
            snap.into_configuration(),
            Err(ProbeError::ConfigurationMissing(names)) if names == SUPABASE_SERVICE_ROLE_KEY
        ));
    }

    #[test]
    fn placeholder_url_is_rejected() {
        let snap = snapshot(&[
            (SUPABASE_URL, "https://your-project.supabase.co"),
            (SUPABASE_SERVICE_ROLE_KEY, "eyJhbGciOiJIUzI1NiJ9.payload.sig"),
        ]);
        assert!(matches!(
            snap.into_configuration(),
            Err(ProbeError::PlaceholderConfiguration(_))
        ));
    }

    #[test]
    fn placeholder_key_is_rejected() {
        let snap = snapshot(&[(SUPABASE_URL, "https://abc.supabase.co"), (SUPABASE_SERVICE_ROLE_KEY, "your-key")]);
        assert!(matches!(
            snap.into_configuration(),
            Err(ProbeError::PlaceholderConfiguration(_))
        ));
    }

    #[test]
    fn valid_values_become_configuration() {
        let snap = snapshot(&[(SUPABASE_URL, "https://abc.supabase.co"), (SUPABASE_SERVICE_ROLE_KEY, "service-key")]);
        let cfg = snap.into_configuration().unwrap();
        assert_eq!(cfg.url, "https://abc.supabase.co");
        assert_eq!(cfg.service_key, "service-key");
    }

    #[test]
    fn explicit_env_file_must_exist() {
        let mut path = std::env::temp_dir();
        path.push("rpc-probe-does-not-exist.env");
        assert!(matches!(
            load_env_file(Some(&path)),
            Err(ProbeError::EnvFile { .. })
        ));
    }
}
