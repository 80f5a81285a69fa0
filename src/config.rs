//! Everything a [crate::Robot] needs to know up front.

use crate::robot::auth::{to_webhook_url, AccessToken};
use std::{collections::HashMap, env, fmt, time::Duration};
use url::Url;

/// The webhook endpoint if `$ROBOT_WEBHOOK` isn't set.
pub const DEFAULT_WEBHOOK: &str = "https://oapi.dingtalk.com/robot/send";

#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// Including the access token.
    pub webhook: Url,
    /// Phone numbers to mention when a message fails.
    pub admin_mobiles: Vec<String>,
    /// Sent with every request. `Content-Type` and `charset` are always
    /// overridden.
    pub headers: HashMap<String, String>,
    /// Applies to each request as a whole. Unset means no timeout.
    pub timeout: Option<Duration>,
}

impl RobotConfig {
    pub fn new(webhook: Url) -> Self {
        RobotConfig {
            webhook,
            admin_mobiles: Vec::new(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn admin_mobiles<I, T>(mut self, xs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.admin_mobiles = xs.into_iter().map(|x| x.to_string()).collect();
        self
    }

    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn timeout(mut self, t: Duration) -> Self {
        self.timeout = Some(t);
        self
    }

    /// Read configuration from the environment:
    ///
    /// - `$ROBOT_TOKEN`, required.
    /// - `$ROBOT_WEBHOOK`, defaulting to [DEFAULT_WEBHOOK].
    /// - `$ROBOT_ADMIN_MOBILES`, comma separated.
    /// - `$ROBOT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|k| env::var(k).ok())
    }

    fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = var("ROBOT_TOKEN")
            .filter(|x| !x.trim().is_empty())
            .map(AccessToken)
            .ok_or(ConfigError::MissingVar("ROBOT_TOKEN"))?;

        let base = var("ROBOT_WEBHOOK").unwrap_or_else(|| DEFAULT_WEBHOOK.into());
        let base = Url::parse(&base).map_err(ConfigError::InvalidUrl)?;

        let mut config = RobotConfig::new(to_webhook_url(&base, &token));

        if let Some(xs) = var("ROBOT_ADMIN_MOBILES") {
            config = config.admin_mobiles(parse_list(&xs));
        }

        if let Some(x) = var("ROBOT_TIMEOUT_SECS") {
            let secs: u64 = x
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(x.to_owned()))?;
            config = config.timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// Split a comma separated list, ignoring blank entries.
///
/// ```
/// # use dingbot::config::parse_list;
/// assert_eq!(parse_list(" 1, ,2,"), vec!["1", "2"]);
/// ```
pub fn parse_list(xs: &str) -> Vec<&str> {
    xs.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidUrl(url::ParseError),
    InvalidTimeout(String),
    InvalidHeader(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            ConfigError::MissingVar(k) => format!("Missing ${} environment variable", k),
            ConfigError::InvalidUrl(e) => format!("Invalid webhook URL: {}", e),
            ConfigError::InvalidTimeout(x) => format!("Invalid timeout: {}", x),
            ConfigError::InvalidHeader(k) => format!("Invalid header: {}", k),
        };

        write!(f, "{}", x)
    }
}

impl std::error::Error for ConfigError {}
