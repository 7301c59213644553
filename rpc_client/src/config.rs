use url::Url;

/// Names the environment variable holding the address of the remote service
pub const SUPABASE_URL: &str = "NEXT_PUBLIC_SUPABASE_URL";
/// Names the environment variable holding the service role key
pub const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Substring found in the sample project URL handed out in templates
pub const PLACEHOLDER_PROJECT: &str = "your-project";

#[derive(Debug, PartialEq, Clone)]
pub struct RpcClientConfiguration {
    pub url: String,
    pub service_key: String,
}

impl Default for RpcClientConfiguration {
    fn default() -> Self {
        RpcClientConfiguration {
            url: "https://your-project.supabase.co".into(),
            service_key: "your-key".into(),
        }
    }
}

impl RpcClientConfiguration {
    #[must_use]
    pub fn new<U, K>(url: U, service_key: K) -> Self
    where
        U: Into<String>,
        K: Into<String>,
    {
        RpcClientConfiguration {
            url: url.into(),
            service_key: service_key.into(),
        }
    }

    /// Is the url present, parseable as http(s) and not the sample project?
    #[must_use]
    pub fn has_valid_url(&self) -> bool {
        let url = self.url.trim();
        if url.is_empty() || url.contains(PLACEHOLDER_PROJECT) {
            return false;
        }
        matches!(Url::parse(url), Ok(u) if u.scheme() == "http" || u.scheme() == "https")
    }

    /// Does the key look like something other than the template value?
    #[must_use]
    pub fn has_valid_service_key(&self) -> bool {
        let key = self.service_key.trim();
        !(key.is_empty() || key == RpcClientConfiguration::default().service_key)
    }
}
