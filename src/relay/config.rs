//! Configuration for the session relay
//!
//! Credentials come from the environment; timings default to the values the
//! interview page uses and can be shortened for tests.

use crate::problem::Problem;
use crate::service::vapi::DEFAULT_BASE_URL;
use crate::{MocktalkError, Result};
use std::time::Duration;

pub const API_KEY_VAR: &str = "VAPI_API_KEY";
pub const ASSISTANT_ID_VAR: &str = "VAPI_ASSISTANT_ID";
pub const BASE_URL_VAR: &str = "VAPI_BASE_URL";

/// Configuration for the relay and its voice service
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Voice service credential
    pub api_key: Option<String>,

    /// Assistant that plays the interviewer
    pub assistant_id: Option<String>,

    /// Voice service API root
    pub base_url: String,

    /// Quiet period before a code update is broadcast
    pub debounce_window: Duration,

    /// Delay between call start and the initial context message
    pub settle_delay: Duration,

    /// Problem shared with the interviewer
    pub problem: Problem,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            assistant_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            debounce_window: Duration::from_secs(10),
            settle_delay: Duration::from_millis(500),
            problem: Problem::default(),
        }
    }
}

impl RelayConfig {
    /// Read credentials from `VAPI_API_KEY`, `VAPI_ASSISTANT_ID` and the
    /// optional `VAPI_BASE_URL`. Missing values are left unset and reported
    /// by `validate`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        config.api_key = non_empty(API_KEY_VAR);
        config.assistant_id = non_empty(ASSISTANT_ID_VAR);
        if let Some(base_url) = non_empty(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        config
    }

    /// Set both credentials
    pub fn with_credentials(
        mut self,
        api_key: impl Into<String>,
        assistant_id: impl Into<String>,
    ) -> Self {
        self.api_key = Some(api_key.into());
        self.assistant_id = Some(assistant_id.into());
        self
    }

    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_problem(mut self, problem: Problem) -> Self {
        self.problem = problem;
        self
    }

    /// Check that both credentials are present
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push(API_KEY_VAR);
        }
        if self.assistant_id.is_none() {
            missing.push(ASSISTANT_ID_VAR);
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MocktalkError::ConfigError(format!(
                "missing {}",
                missing.join(", ")
            )))
        }
    }
}
