//! Every message variant the robot can post, and the local validation each
//! must pass before it's sent.

use super::{
    card::{ActionCard, FeedCard},
    error::ValidationError,
    mention::Mention,
    payload::*,
};
use tracing::error;

/// Validate something and turn it into its wire format.
pub trait Build {
    type Output;

    fn build(&self) -> Result<Self::Output, ValidationError>;
}

/// A message in any of the supported variants. Nothing is checked until
/// [Build::build] is called, which happens on send.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text {
        content: String,
        mention: Mention,
    },
    Image {
        pic_url: String,
    },
    Link {
        title: String,
        text: String,
        message_url: String,
        /// Empty if there's no picture.
        pic_url: String,
    },
    Markdown {
        title: String,
        text: String,
        mention: Mention,
    },
    ActionCard(ActionCard),
    /// Invalid cards are dropped rather than failing the whole message.
    FeedCard(Vec<FeedCard>),
}

impl Message {
    pub fn text<T: Into<String>>(content: T, mention: Mention) -> Self {
        Message::Text {
            content: content.into(),
            mention,
        }
    }

    pub fn image<T: Into<String>>(pic_url: T) -> Self {
        Message::Image {
            pic_url: pic_url.into(),
        }
    }

    pub fn link<T, U, V>(title: T, text: U, message_url: V, pic_url: Option<String>) -> Self
    where
        T: Into<String>,
        U: Into<String>,
        V: Into<String>,
    {
        Message::Link {
            title: title.into(),
            text: text.into(),
            message_url: message_url.into(),
            pic_url: pic_url.unwrap_or_default(),
        }
    }

    pub fn markdown<T, U>(title: T, text: U, mention: Mention) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Message::Markdown {
            title: title.into(),
            text: text.into(),
            mention,
        }
    }
}

impl Build for Message {
    type Output = Payload;

    fn build(&self) -> Result<Payload, ValidationError> {
        let payload = match self {
            Message::Text { content, mention } => {
                require("text", content)?;

                Payload::Text {
                    text: TextContent {
                        content: content.to_owned(),
                    },
                    at: mention.to_owned(),
                }
            }

            Message::Image { pic_url } => {
                require("image_url", pic_url)?;

                Payload::Image {
                    image: ImageContent {
                        pic_url: pic_url.to_owned(),
                    },
                }
            }

            Message::Link {
                title,
                text,
                message_url,
                pic_url,
            } => {
                require("link title", title)?;
                require("link text", text)?;
                require("link message_url", message_url)?;

                Payload::Link {
                    link: LinkContent {
                        text: text.to_owned(),
                        title: title.to_owned(),
                        pic_url: pic_url.to_owned(),
                        message_url: message_url.to_owned(),
                    },
                }
            }

            Message::Markdown {
                title,
                text,
                mention,
            } => {
                require("markdown title", title)?;
                require("markdown text", text)?;

                Payload::Markdown {
                    markdown: MarkdownContent {
                        title: title.to_owned(),
                        text: text.to_owned(),
                    },
                    at: mention.to_owned(),
                }
            }

            Message::ActionCard(card) => Payload::ActionCard {
                action_card: card.build()?,
            },

            Message::FeedCard(cards) => {
                let links: Vec<FeedLink> = cards.iter().filter_map(|c| c.build().ok()).collect();

                if links.is_empty() {
                    error!("FeedCard has no valid cards");
                    return Err(ValidationError::NoValidCards);
                }

                Payload::FeedCard {
                    feed_card: FeedCardContent { links },
                }
            }
        };

        Ok(payload)
    }
}

/// Fail if `value` is empty or entirely whitespace.
pub(super) fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        error!("{} is empty", field);
        Err(ValidationError::Blank(field))
    } else {
        Ok(())
    }
}
