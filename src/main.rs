//! Post a greeting to the configured robot webhook, confirming that the
//! token and endpoint work.
//!
//! See [dingbot::RobotConfig::from_env] for the environment variables read.

use dingbot::{Mention, Robot, RobotConfig};
use dotenvy::dotenv;
use tracing::{error, info, warn};

/// Application entrypoint. Initialises tracing, loads `.env` if present, and
/// sends a single markdown message.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let has_dotenv = dotenv().is_ok();
    if !has_dotenv {
        warn!("No .env found");
    }

    let config = RobotConfig::from_env().expect("Could not read robot configuration");
    let robot = Robot::new(config).expect("Could not initialise robot");

    let res = robot
        .send_markdown(
            "Hello",
            "This is a **markdown** format message",
            Mention::none(),
        )
        .await;

    match res {
        Ok(x) if x.is_ok() => info!("Message sent"),
        Ok(x) => error!("Robot API returned error {}: {}", x.errcode, x.errmsg),
        Err(e) => error!("{}", e),
    }
}
