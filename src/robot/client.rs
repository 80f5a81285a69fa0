//! Send messages to the robot webhook, escalating any failure the endpoint
//! reports to the chat's administrators.

use super::{
    api::{RobotResponse, Transport},
    card::{ActionCard, FeedCard},
    error::RobotError,
    mention::Mention,
    message::{Build, Message},
};
use crate::config::RobotConfig;
use tracing::{debug, error, warn};

/// A client for a single robot webhook. Safe to share between tasks; sends
/// are rate limited across all of them.
pub struct Robot {
    transport: Transport,
    admin_mobiles: Vec<String>,
}

impl Robot {
    pub fn new(config: RobotConfig) -> Result<Self, RobotError> {
        Ok(Robot {
            transport: Transport::new(config.webhook, &config.headers, config.timeout)?,
            admin_mobiles: config.admin_mobiles,
        })
    }

    /// Validate and post a message.
    ///
    /// Invalid messages fail without touching the network. If the endpoint
    /// reports an error, a notice is posted to the administrators before the
    /// original response is returned.
    pub async fn send(&self, msg: &Message) -> Result<RobotResponse, RobotError> {
        let payload = msg.build()?;
        debug!("Sending: {:?}", payload);

        let res = self.transport.post(&payload).await?;

        if !res.is_ok() {
            self.escalate(&res).await;
        }

        Ok(res)
    }

    /// Let the administrators know a message failed. Best effort; whatever
    /// happens here is only logged, and the notice doesn't count towards the
    /// rate limit.
    async fn escalate(&self, failed: &RobotResponse) {
        error!(
            "Robot API returned error {}: {}",
            failed.errcode, failed.errmsg
        );

        let notice = Message::text(
            format!("机器人发送消息失败，原因：{}", failed.errmsg),
            Mention::none().at_all(false).mobiles(&self.admin_mobiles),
        );

        let payload = match notice.build() {
            Ok(x) => x,
            Err(e) => {
                error!("Failed to build failure notice: {}", e);
                return;
            }
        };

        match self.transport.post_unlimited(&payload).await {
            Ok(res) if !res.is_ok() => warn!(
                "Failure notice was rejected too, {}: {}",
                res.errcode, res.errmsg
            ),
            Ok(_) => {}
            Err(e) => error!("Failed to send failure notice: {}", e),
        }
    }

    pub async fn send_text<T: Into<String>>(
        &self,
        content: T,
        mention: Mention,
    ) -> Result<RobotResponse, RobotError> {
        self.send(&Message::text(content, mention)).await
    }

    pub async fn send_image<T: Into<String>>(
        &self,
        pic_url: T,
    ) -> Result<RobotResponse, RobotError> {
        self.send(&Message::image(pic_url)).await
    }

    pub async fn send_link<T, U, V>(
        &self,
        title: T,
        text: U,
        message_url: V,
        pic_url: Option<String>,
    ) -> Result<RobotResponse, RobotError>
    where
        T: Into<String>,
        U: Into<String>,
        V: Into<String>,
    {
        self.send(&Message::link(title, text, message_url, pic_url)).await
    }

    pub async fn send_markdown<T, U>(
        &self,
        title: T,
        text: U,
        mention: Mention,
    ) -> Result<RobotResponse, RobotError>
    where
        T: Into<String>,
        U: Into<String>,
    {
        self.send(&Message::markdown(title, text, mention)).await
    }

    pub async fn send_action_card(&self, card: ActionCard) -> Result<RobotResponse, RobotError> {
        self.send(&Message::ActionCard(card)).await
    }

    pub async fn send_feed_cards(
        &self,
        cards: Vec<FeedCard>,
    ) -> Result<RobotResponse, RobotError> {
        self.send(&Message::FeedCard(cards)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::error::ValidationError;
    use mockito::Matcher;
    use serde_json::json;
    use std::{collections::HashMap, time::Duration};
    use url::Url;

    const OK: &str = r#"{"errcode": 0, "errmsg": "ok"}"#;

    async fn server() -> mockito::ServerGuard {
        mockito::Server::new_async().await
    }

    fn robot(srv: &mockito::ServerGuard) -> Robot {
        let webhook = Url::parse(&format!("{}/robot/send?access_token=tok", srv.url())).unwrap();
        let config = RobotConfig::new(webhook).admin_mobiles(["13800000000"]);

        Robot::new(config).unwrap()
    }

    fn mock_send(srv: &mut mockito::ServerGuard) -> mockito::Mock {
        srv.mock("POST", "/robot/send")
            .match_query(Matcher::UrlEncoded("access_token".into(), "tok".into()))
    }

    #[tokio::test]
    async fn test_send_text() {
        let mut srv = server().await;

        let mock = mock_send(&mut srv)
            .match_header("content-type", "application/json")
            .match_header("charset", "utf-8")
            .match_body(Matcher::Json(json!({
                "msgtype": "text",
                "text": { "content": "hi" },
                "at": { "isAtAll": true, "atMobiles": ["123"] }
            })))
            .with_body(OK)
            .expect(1)
            .create_async()
            .await;

        let res = robot(&srv)
            .send_text("hi", Mention::none().all().mobiles([123]))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(res.is_ok());
        assert_eq!(res.errmsg, "ok");
    }

    #[tokio::test]
    async fn test_caller_headers_sent() {
        let mut srv = server().await;

        let mock = mock_send(&mut srv)
            .match_header("x-trace", "abc")
            .match_header("content-type", "application/json")
            .with_body(OK)
            .create_async()
            .await;

        let webhook = Url::parse(&format!("{}/robot/send?access_token=tok", srv.url())).unwrap();
        let config = RobotConfig::new(webhook).headers(HashMap::from([
            ("X-Trace".to_owned(), "abc".to_owned()),
            ("Content-Type".to_owned(), "text/plain".to_owned()),
        ]));

        Robot::new(config)
            .unwrap()
            .send_image("https://example.com/a.png")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_validation_skips_network() {
        let mut srv = server().await;

        let mock = srv
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let r = robot(&srv);

        let text = r.send_text("   ", Mention::none()).await;
        assert!(matches!(
            text,
            Err(RobotError::Validation(ValidationError::Blank("text")))
        ));

        let link = r.send_link("t", "x", "", None).await;
        assert!(link.unwrap_err().is_validation());

        let card = r
            .send_action_card(ActionCard::new("t", "x").button("", "http://u"))
            .await;
        assert!(matches!(
            card,
            Err(RobotError::Validation(ValidationError::NoValidButtons))
        ));

        let feed = r
            .send_feed_cards(vec![FeedCard::new("t", "", "p"), FeedCard::new("", "u", "p")])
            .await;
        assert!(matches!(
            feed,
            Err(RobotError::Validation(ValidationError::NoValidCards))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_action_card_multi() {
        let mut srv = server().await;

        let mock = mock_send(&mut srv)
            .match_body(Matcher::Json(json!({
                "msgtype": "actionCard",
                "actionCard": {
                    "title": "Deploy",
                    "text": "Ready",
                    "hideAvatar": "0",
                    "btnOrientation": "1",
                    "btns": [
                        { "title": "Approve", "actionURL": "https://example.com/a" },
                        { "title": "Reject", "actionURL": "https://example.com/r" }
                    ]
                }
            })))
            .with_body(OK)
            .create_async()
            .await;

        let card = ActionCard::new("Deploy", "Ready")
            .button("Approve", "https://example.com/a")
            .button("Reject", "https://example.com/r")
            .orientation(crate::robot::card::Orientation::Horizontal);

        robot(&srv).send_action_card(card).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_undecodable_response() {
        let mut srv = server().await;

        let send_mock = mock_send(&mut srv)
            .match_body(Matcher::PartialJson(json!({ "msgtype": "markdown" })))
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        // The synthesised error is escalated like any other.
        let notice_mock = mock_send(&mut srv)
            .match_body(Matcher::PartialJson(json!({
                "msgtype": "text",
                "text": { "content": "机器人发送消息失败，原因：Server Error" }
            })))
            .with_body(OK)
            .expect(1)
            .create_async()
            .await;

        let res = robot(&srv)
            .send_markdown("t", "x", Mention::none())
            .await
            .unwrap();

        send_mock.assert_async().await;
        notice_mock.assert_async().await;
        assert_eq!(res, RobotResponse::server_error());
    }

    #[tokio::test]
    async fn test_escalation() {
        let mut srv = server().await;

        let send_mock = mock_send(&mut srv)
            .match_body(Matcher::PartialJson(json!({ "msgtype": "image" })))
            .with_body(r#"{"errcode": 310000, "errmsg": "keywords not in content"}"#)
            .expect(1)
            .create_async()
            .await;

        let notice_mock = mock_send(&mut srv)
            .match_body(Matcher::Json(json!({
                "msgtype": "text",
                "text": { "content": "机器人发送消息失败，原因：keywords not in content" },
                "at": { "isAtAll": false, "atMobiles": ["13800000000"] }
            })))
            .with_body(OK)
            .expect(1)
            .create_async()
            .await;

        let res = robot(&srv)
            .send_image("https://example.com/a.png")
            .await
            .unwrap();

        send_mock.assert_async().await;
        notice_mock.assert_async().await;
        assert_eq!(res.errcode, 310000);
        assert_eq!(res.errmsg, "keywords not in content");
    }

    #[tokio::test]
    async fn test_escalation_is_not_escalated() {
        let mut srv = server().await;

        // Every post fails, including the notice. Exactly two requests should
        // be made: the message and one notice.
        let mock = mock_send(&mut srv)
            .with_body(r#"{"errcode": 300001, "errmsg": "token is not exist"}"#)
            .expect(2)
            .create_async()
            .await;

        let res = robot(&srv).send_text("hi", Mention::none()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(res.errcode, 300001);
    }

    #[tokio::test]
    async fn test_failed_escalation_keeps_result() {
        let mut srv = server().await;

        let send_mock = mock_send(&mut srv)
            .match_body(Matcher::PartialJson(json!({ "msgtype": "link" })))
            .with_body(r#"{"errcode": 400013, "errmsg": "bad link"}"#)
            .create_async()
            .await;

        let notice_mock = mock_send(&mut srv)
            .match_body(Matcher::PartialJson(json!({ "msgtype": "text" })))
            .with_status(500)
            .with_body("")
            .create_async()
            .await;

        let res = robot(&srv)
            .send_link("t", "x", "https://example.com", None)
            .await
            .unwrap();

        send_mock.assert_async().await;
        notice_mock.assert_async().await;
        assert_eq!(res.errcode, 400013);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shared_between_tasks() {
        let mut srv = server().await;

        let mock = mock_send(&mut srv)
            .with_body(OK)
            .expect(5)
            .create_async()
            .await;

        let r = std::sync::Arc::new(robot(&srv));
        let handles: Vec<_> = (0..5)
            .map(|i| {
                let r = r.clone();
                tokio::spawn(async move {
                    r.send_text(format!("msg {}", i), Mention::none()).await
                })
            })
            .collect();

        for h in handles {
            assert!(h.await.unwrap().unwrap().is_ok());
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_error() {
        // Nothing should be listening on port 1.
        let webhook = Url::parse("http://127.0.0.1:1/robot/send?access_token=tok").unwrap();
        let config = RobotConfig::new(webhook).timeout(Duration::from_secs(5));

        let res = Robot::new(config)
            .unwrap()
            .send_text("hi", Mention::none())
            .await;

        assert!(matches!(res, Err(RobotError::Connection(_))));
    }

    #[tokio::test]
    async fn test_timeout() {
        // Accepted by the OS but never answered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let webhook =
            Url::parse(&format!("http://127.0.0.1:{}/robot/send?access_token=tok", port)).unwrap();
        let config = RobotConfig::new(webhook).timeout(Duration::from_millis(300));

        let res = Robot::new(config)
            .unwrap()
            .send_text("hi", Mention::none())
            .await;

        assert!(matches!(res, Err(RobotError::Timeout(_))));
        drop(listener);
    }

    #[tokio::test]
    async fn test_request_error() {
        let mut srv = server().await;
        let location = format!("{}/robot/send?access_token=tok", srv.url());

        // Redirects forever; the POST is followed up as a GET.
        let mut mocks = Vec::new();
        for method in ["POST", "GET"] {
            let mock = srv
                .mock(method, "/robot/send")
                .match_query(Matcher::Any)
                .with_status(302)
                .with_header("location", &location)
                .create_async()
                .await;
            mocks.push(mock);
        }

        let res = robot(&srv).send_text("hi", Mention::none()).await;

        assert!(matches!(res, Err(RobotError::Request(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_notice_not_rate_limited() {
        let mut srv = server().await;

        let fail_mock = mock_send(&mut srv)
            .match_body(Matcher::PartialJson(json!({ "text": { "content": "fail" } })))
            .with_body(r#"{"errcode": 1, "errmsg": "boom"}"#)
            .expect(1)
            .create_async()
            .await;

        let notice_mock = mock_send(&mut srv)
            .match_body(Matcher::PartialJson(json!({
                "text": { "content": "机器人发送消息失败，原因：boom" }
            })))
            .with_body(OK)
            .expect(1)
            .create_async()
            .await;

        let ok_mock = mock_send(&mut srv)
            .match_body(Matcher::Regex(r#""content":"ok \d+""#.into()))
            .with_body(OK)
            .expect(38)
            .create_async()
            .await;

        let r = robot(&srv);
        let t0 = tokio::time::Instant::now();

        assert_eq!(r.send_text("fail", Mention::none()).await.unwrap().errcode, 1);
        for i in 0..38 {
            let res = r.send_text(format!("ok {}", i), Mention::none()).await;
            assert!(res.unwrap().is_ok());
        }

        // 39 sends of our own; the 40th would be the first to hold off.
        assert!(t0.elapsed() < Duration::from_secs(60));

        fail_mock.assert_async().await;
        notice_mock.assert_async().await;
        ok_mock.assert_async().await;
    }
}
