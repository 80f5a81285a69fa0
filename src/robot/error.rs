use crate::config::ConfigError;
use std::fmt;

/// A message was rejected before it ever reached the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was empty or whitespace-only.
    Blank(&'static str),
    NoValidButtons,
    NoValidCards,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            ValidationError::Blank(field) => format!("{} is empty", field),
            ValidationError::NoValidButtons => "ActionCard has no valid buttons".into(),
            ValidationError::NoValidCards => "FeedCard has no valid cards".into(),
        };

        write!(f, "{}", x)
    }
}

/// Sum type representing every way a send can fail outright. Errors the
/// endpoint reports in its response body aren't represented here; see
/// [super::api::RobotResponse].
#[derive(Debug)]
pub enum RobotError {
    Validation(ValidationError),
    Connection(reqwest::Error),
    Timeout(reqwest::Error),
    Request(reqwest::Error),
    Config(ConfigError),
}

impl From<ValidationError> for RobotError {
    fn from(e: ValidationError) -> Self {
        RobotError::Validation(e)
    }
}

impl From<ConfigError> for RobotError {
    fn from(e: ConfigError) -> Self {
        RobotError::Config(e)
    }
}

impl From<reqwest::Error> for RobotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RobotError::Timeout(e)
        } else if e.is_connect() {
            RobotError::Connection(e)
        } else {
            RobotError::Request(e)
        }
    }
}

impl fmt::Display for RobotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            RobotError::Validation(e) => format!("Invalid message: {}", e),
            RobotError::Connection(e) => format!("Robot API connection failed: {:?}", e),
            RobotError::Timeout(e) => format!("Robot API request timed out: {:?}", e),
            RobotError::Request(e) => format!("Robot API request failed: {:?}", e),
            RobotError::Config(e) => format!("Invalid robot configuration: {}", e),
        };

        write!(f, "{}", x)
    }
}

impl std::error::Error for RobotError {}

impl RobotError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RobotError::Validation(_))
    }
}
