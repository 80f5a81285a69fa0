use serde::Serialize;

/// Who to notify alongside a text or markdown message. Every part is
/// optional; an empty mention serialises to an empty `at` block.
///
/// ```
/// # use dingbot::Mention;
/// let m = Mention::none().all().mobiles([13800000000u64]);
/// assert_eq!(m.at_all, Some(true));
/// assert_eq!(m.mobiles, vec!["13800000000".to_owned()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mention {
    /// Omitted from the wire unless set, either way.
    #[serde(rename = "isAtAll", skip_serializing_if = "Option::is_none")]
    pub at_all: Option<bool>,
    #[serde(rename = "atMobiles", skip_serializing_if = "Vec::is_empty")]
    pub mobiles: Vec<String>,
    #[serde(rename = "atDingtalkIds", skip_serializing_if = "Vec::is_empty")]
    pub user_ids: Vec<String>,
}

impl Mention {
    pub fn none() -> Self {
        Self::default()
    }

    /// Notify everyone in the chat.
    pub fn all(self) -> Self {
        self.at_all(true)
    }

    pub fn at_all(mut self, all: bool) -> Self {
        self.at_all = Some(all);
        self
    }

    pub fn mobiles<I, T>(mut self, xs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.mobiles.extend(xs.into_iter().map(|x| x.to_string()));
        self
    }

    /// Platform user IDs, as opposed to phone numbers.
    pub fn user_ids<I, T>(mut self, xs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        self.user_ids.extend(xs.into_iter().map(|x| x.to_string()));
        self
    }
}
