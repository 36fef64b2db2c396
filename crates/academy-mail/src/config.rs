//! Mail relay configuration, loaded from environment variables.

use academy_core::NotifyError;
use std::env;

/// Mail relay settings
#[derive(Clone)]
pub struct MailConfig {
    /// Relay endpoint that accepts `{from, to, subject, html}`
    pub api_url: String,

    /// Bearer key for the relay
    pub api_key: String,

    /// Sender address
    pub from: String,
}

impl MailConfig {
    /// Reads `MAIL_API_URL`, `MAIL_API_KEY` and `MAIL_FROM`.
    ///
    /// `Ok(None)` when none are set (log-only mode); a partial set is an error.
    pub fn from_env() -> Result<Option<Self>, NotifyError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>, NotifyError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (url, key, from) = (get("MAIL_API_URL"), get("MAIL_API_KEY"), get("MAIL_FROM"));
        match (url, key, from) {
            (None, None, None) => Ok(None),
            (Some(api_url), Some(api_key), Some(from)) => {
                if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
                    return Err(NotifyError::Transport(
                        "MAIL_API_URL must be an http(s) URL".to_string(),
                    ));
                }
                Ok(Some(Self {
                    api_url,
                    api_key,
                    from,
                }))
            }
            _ => Err(NotifyError::Transport(
                "MAIL_API_URL, MAIL_API_KEY and MAIL_FROM must be set together".to_string(),
            )),
        }
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            from: from.into(),
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}
