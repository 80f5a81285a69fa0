//! The wire format of each message variant. These are only ever produced by
//! validating a [super::message::Message], so they're assumed well-formed.
//!
//! <https://open.dingtalk.com/document/robots/custom-robot-access>

use super::{card::Orientation, mention::Mention};
use serde::Serialize;
use serde_with::{serde_as, DisplayFromStr};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "msgtype")]
pub enum Payload {
    #[serde(rename = "text")]
    Text { text: TextContent, at: Mention },
    #[serde(rename = "image")]
    Image { image: ImageContent },
    #[serde(rename = "link")]
    Link { link: LinkContent },
    #[serde(rename = "markdown")]
    Markdown {
        markdown: MarkdownContent,
        at: Mention,
    },
    #[serde(rename = "actionCard")]
    ActionCard {
        #[serde(rename = "actionCard")]
        action_card: ActionCardContent,
    },
    #[serde(rename = "feedCard")]
    FeedCard {
        #[serde(rename = "feedCard")]
        feed_card: FeedCardContent,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageContent {
    #[serde(rename = "picURL")]
    pub pic_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkContent {
    pub text: String,
    pub title: String,
    pub pic_url: String,
    pub message_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownContent {
    pub title: String,
    pub text: String,
}

/// The platform expects both flags as the strings `"0"` or `"1"`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCardContent {
    pub title: String,
    pub text: String,
    #[serde(rename = "hideAvatar")]
    #[serde_as(as = "DisplayFromStr")]
    pub hide_avatar: u8,
    #[serde(rename = "btnOrientation")]
    #[serde_as(as = "DisplayFromStr")]
    pub orientation: Orientation,
    #[serde(flatten)]
    pub buttons: ActionCardButtons,
}

/// A lone button turns the whole card into one clickable action, which the
/// platform lays out differently to a card with a row of buttons.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionCardButtons {
    Single {
        #[serde(rename = "singleTitle")]
        title: String,
        #[serde(rename = "singleURL")]
        url: String,
    },
    Multi {
        btns: Vec<ButtonContent>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonContent {
    pub title: String,
    #[serde(rename = "actionURL")]
    pub action_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedCardContent {
    pub links: Vec<FeedLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedLink {
    pub title: String,
    #[serde(rename = "messageURL")]
    pub message_url: String,
    #[serde(rename = "picURL")]
    pub pic_url: String,
}
