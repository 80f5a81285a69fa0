//! Card messages: the interactive [ActionCard] and the [FeedCard] list.

use super::{
    error::ValidationError,
    message::{require, Build},
    payload::{ActionCardButtons, ActionCardContent, ButtonContent, FeedLink},
};
use std::fmt;
use tracing::error;

/// How an [ActionCard]'s buttons are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Vertical,
    Horizontal,
}

/// Formats to the platform's numeric code.
///
/// ```
/// # use dingbot::Orientation;
/// assert_eq!(Orientation::Horizontal.to_string(), "1");
/// ```
impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            Orientation::Vertical => "0",
            Orientation::Horizontal => "1",
        };

        write!(f, "{}", x)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub url: String,
}

impl Button {
    pub fn new<T: Into<String>, U: Into<String>>(label: T, url: U) -> Self {
        Button {
            label: label.into(),
            url: url.into(),
        }
    }

    fn is_valid(&self) -> bool {
        !self.label.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// A card with a markdown body and one or more buttons beneath it.
///
/// ```
/// # use dingbot::{ActionCard, Orientation};
/// let card = ActionCard::new("Deploy", "Release **v2** is ready")
///     .button("Approve", "https://example.com/approve")
///     .button("Reject", "https://example.com/reject")
///     .orientation(Orientation::Horizontal);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCard {
    pub title: String,
    /// Markdown.
    pub text: String,
    pub buttons: Vec<Button>,
    pub orientation: Orientation,
    pub hide_avatar: bool,
}

impl ActionCard {
    pub fn new<T: Into<String>, U: Into<String>>(title: T, text: U) -> Self {
        ActionCard {
            title: title.into(),
            text: text.into(),
            buttons: Vec::new(),
            orientation: Orientation::default(),
            hide_avatar: false,
        }
    }

    pub fn button<T: Into<String>, U: Into<String>>(mut self, label: T, url: U) -> Self {
        self.buttons.push(Button::new(label, url));
        self
    }

    pub fn orientation(mut self, o: Orientation) -> Self {
        self.orientation = o;
        self
    }

    pub fn hide_avatar(mut self, hide: bool) -> Self {
        self.hide_avatar = hide;
        self
    }
}

impl Build for ActionCard {
    type Output = ActionCardContent;

    /// Buttons missing a label or URL are silently dropped. What remains
    /// decides the shape of the card.
    fn build(&self) -> Result<ActionCardContent, ValidationError> {
        require("ActionCard title", &self.title)?;
        require("ActionCard text", &self.text)?;

        let mut valid: Vec<&Button> = self.buttons.iter().filter(|b| b.is_valid()).collect();

        let buttons = match valid.len() {
            0 => {
                error!("ActionCard invalid buttons: {:?}", self.buttons);
                return Err(ValidationError::NoValidButtons);
            }
            1 => {
                let b = valid.remove(0);
                ActionCardButtons::Single {
                    title: b.label.to_owned(),
                    url: b.url.to_owned(),
                }
            }
            _ => ActionCardButtons::Multi {
                btns: valid
                    .into_iter()
                    .map(|b| ButtonContent {
                        title: b.label.to_owned(),
                        action_url: b.url.to_owned(),
                    })
                    .collect(),
            },
        };

        Ok(ActionCardContent {
            title: self.title.to_owned(),
            text: self.text.to_owned(),
            hide_avatar: u8::from(self.hide_avatar),
            orientation: self.orientation,
            buttons,
        })
    }
}

/// One entry in a feed card list. All three fields are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCard {
    pub title: String,
    pub message_url: String,
    pub pic_url: String,
}

impl FeedCard {
    pub fn new<T, U, V>(title: T, message_url: U, pic_url: V) -> Self
    where
        T: Into<String>,
        U: Into<String>,
        V: Into<String>,
    {
        FeedCard {
            title: title.into(),
            message_url: message_url.into(),
            pic_url: pic_url.into(),
        }
    }
}

impl Build for FeedCard {
    type Output = FeedLink;

    fn build(&self) -> Result<FeedLink, ValidationError> {
        require("FeedCard title", &self.title)?;
        require("FeedCard message_url", &self.message_url)?;
        require("FeedCard pic_url", &self.pic_url)?;

        Ok(FeedLink {
            title: self.title.to_owned(),
            message_url: self.message_url.to_owned(),
            pic_url: self.pic_url.to_owned(),
        })
    }
}
