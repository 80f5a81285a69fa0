//! Supports posting any of the six message variants to a robot webhook.
//!
//! See [client::Robot].

pub mod api;
pub mod auth;
pub mod card;
pub mod client;
pub mod error;
mod limit;
pub mod mention;
pub mod message;
pub mod payload;
