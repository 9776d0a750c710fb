//! The Block Kit fragments the report is assembled from. Only the block
//! types the report actually uses are modeled.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: Text,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    Header {
        text: Text,
    },
    Divider,
    Context {
        elements: Vec<Element>,
    },
}

impl Block {
    pub fn section(text: Text) -> Self {
        Block::Section {
            text,
            accessory: None,
        }
    }

    pub fn header(label: &str) -> Self {
        Block::Header {
            text: Text::plain(label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Text {
    #[serde(rename = "plain_text")]
    Plain { text: String, emoji: bool },
    #[serde(rename = "mrkdwn")]
    Mrkdwn { text: String },
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Text::Plain {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Accessory {
    #[serde(rename = "button")]
    Button {
        text: Text,
        action_id: String,
        url: String,
    },
}

impl Accessory {
    pub fn link_button(label: &str, url: impl Into<String>) -> Self {
        Accessory::Button {
            text: Text::plain(label),
            action_id: "view-message".to_string(),
            url: url.into(),
        }
    }
}

/// Inline pieces of a context block: a status glyph or an avatar image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Element {
    #[serde(rename = "plain_text")]
    Plain { text: String, emoji: bool },
    #[serde(rename = "image")]
    Image { image_url: String, alt_text: String },
}

impl Element {
    pub fn plain(text: impl Into<String>) -> Self {
        Element::Plain {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn avatar(image_url: impl Into<String>) -> Self {
        Element::Image {
            image_url: image_url.into(),
            alt_text: "profile".to_string(),
        }
    }
}
