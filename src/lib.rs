//! Post structured notifications to a group chat robot webhook.
//!
//! Messages are built from [robot::message::Message] variants, validated
//! locally, and delivered by a rate-limited [robot::client::Robot]. Should the
//! endpoint report a failure, the robot follows up with a plaintext notice to
//! the configured administrators in the same chat.

pub mod config;
pub mod robot;

pub use config::{ConfigError, RobotConfig};
pub use robot::{
    api::RobotResponse,
    card::{ActionCard, Button, FeedCard, Orientation},
    client::Robot,
    error::{RobotError, ValidationError},
    mention::Mention,
    message::{Build, Message},
};
