//! Type definitions and the rate-limited transport for the robot webhook.

use super::{error::RobotError, limit::RateLimiter, payload::Payload};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::HashMap, time::Duration};
use tokio::sync::Mutex;
use tracing::{debug, error};
use url::Url;

use crate::config::ConfigError;

/// The robot's response to every request, successful or otherwise. Failure
/// is reported via a nonzero `errcode` rather than the HTTP status.
///
/// ```json
/// {
///     "errcode": 0,
///     "errmsg": "ok"
/// }
/// ```
///
/// ```json
/// {
///     "errcode": 310000,
///     "errmsg": "keywords not in content"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotResponse {
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RobotResponse {
    pub fn is_ok(&self) -> bool {
        self.errcode == 0
    }

    /// Stands in for any response body that can't be decoded.
    pub fn server_error() -> Self {
        RobotResponse {
            errcode: 500,
            errmsg: "Server Error".into(),
            extra: Map::new(),
        }
    }
}

/// Posts payloads to a single webhook, never faster than the endpoint allows.
pub struct Transport {
    http: reqwest::Client,
    webhook: Url,
    headers: HeaderMap,
    limiter: Mutex<RateLimiter>,
}

impl Transport {
    pub fn new(
        webhook: Url,
        extra_headers: &HashMap<String, String>,
        timeout: Option<Duration>,
    ) -> Result<Self, RobotError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }

        Ok(Transport {
            http: builder.build()?,
            webhook,
            headers: to_header_map(extra_headers)?,
            limiter: Mutex::new(RateLimiter::new()),
        })
    }

    /// Post a payload, waiting first if we're sending too fast.
    ///
    /// Only transport failures are returned as errors. A body which can't be
    /// decoded is reported as a [RobotResponse::server_error].
    pub async fn post(&self, payload: &Payload) -> Result<RobotResponse, RobotError> {
        // Held until the request's been made so concurrent sends can't slip
        // past the count between them.
        let mut limiter = self.limiter.lock().await;
        limiter.acquire().await;

        let res = self.request(payload).await?;

        drop(limiter);

        decode(res).await
    }

    /// Post a payload without counting it towards the rate limit. Reserved
    /// for the failure notice, which follows a send that's already counted.
    pub async fn post_unlimited(&self, payload: &Payload) -> Result<RobotResponse, RobotError> {
        let res = self.request(payload).await?;
        decode(res).await
    }

    async fn request(&self, payload: &Payload) -> Result<reqwest::Response, RobotError> {
        self.http
            .post(self.webhook.clone())
            .headers(self.headers.clone())
            .json(payload)
            .send()
            .await
            .map_err(log_transport_err)
    }
}

/// Decode a response whatever its status, as the robot reports errors in
/// the body.
async fn decode(res: reqwest::Response) -> Result<RobotResponse, RobotError> {
    let status = res.status();
    let body = res.text().await.map_err(log_transport_err)?;

    match serde_json::from_str::<RobotResponse>(&body) {
        Ok(x) => {
            debug!("Robot API result: {:?}", x);
            Ok(x)
        }
        Err(e) => {
            error!(
                "Failed to decode robot API response ({}), status: {}, content: {}",
                e, status, body
            );
            Ok(RobotResponse::server_error())
        }
    }
}

fn log_transport_err(e: reqwest::Error) -> RobotError {
    let e = RobotError::from(e);
    error!("{}", e);
    e
}

/// Merge the caller's headers with those every request needs. Ours win on
/// collision, regardless of case.
fn to_header_map(extra: &HashMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::with_capacity(extra.len() + 2);

    for (k, v) in extra {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(k.to_owned()))?;
        let val =
            HeaderValue::from_str(v).map_err(|_| ConfigError::InvalidHeader(k.to_owned()))?;
        headers.insert(name, val);
    }

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("charset"),
        HeaderValue::from_static("utf-8"),
    );

    Ok(headers)
}
