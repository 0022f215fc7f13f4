use serde::{Deserialize, Serialize};

pub const MIN_SIZE_PERCENT: u8 = 10;
pub const MAX_SIZE_PERCENT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Media shown above a question's text. Sizing is a percentage of the
/// rendering surface's width, kept within [10, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub alignment: MediaAlignment,
    #[serde(default = "default_size_percent")]
    pub size_percent: u8,
}

fn default_size_percent() -> u8 {
    MAX_SIZE_PERCENT
}

impl MediaAttachment {
    pub fn new(kind: MediaKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            alignment: MediaAlignment::default(),
            size_percent: default_size_percent(),
        }
    }

    pub fn set_size_percent(&mut self, percent: u8) {
        self.size_percent = percent.clamp(MIN_SIZE_PERCENT, MAX_SIZE_PERCENT);
    }
}
