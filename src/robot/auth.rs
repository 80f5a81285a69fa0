//! Helpers around the robot's use of a static access token, which is carried
//! in the webhook's query string rather than a header.

use url::Url;

/// A newtype wrapper around robot access tokens.
#[derive(PartialEq, Eq, Clone)]
pub struct AccessToken(pub String);

/// Append an access token to a webhook base URL, keeping any query pairs
/// already present.
///
/// ```
/// # use dingbot::robot::auth::{to_webhook_url, AccessToken};
/// # use url::Url;
/// let base = Url::parse("https://oapi.dingtalk.com/robot/send").unwrap();
/// let url = to_webhook_url(&base, &AccessToken("abc".into()));
/// assert_eq!(url.as_str(), "https://oapi.dingtalk.com/robot/send?access_token=abc");
/// ```
pub fn to_webhook_url(base: &Url, token: &AccessToken) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("access_token", &token.0);
    url
}
