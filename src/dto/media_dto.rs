use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::media::{MediaAttachment, MediaKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickedMediaKind {
    Image,
    Video,
    Audio,
    File,
}

/// What the shared media-picker dialog hands back. Generic files are a valid
/// pick elsewhere in the dashboard but cannot be attached to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickedMedia {
    pub url: String,
    pub kind: PickedMediaKind,
}

impl TryFrom<PickedMedia> for MediaAttachment {
    type Error = Error;

    fn try_from(picked: PickedMedia) -> Result<Self> {
        let kind = match picked.kind {
            PickedMediaKind::Image => MediaKind::Image,
            PickedMediaKind::Video => MediaKind::Video,
            PickedMediaKind::Audio => MediaKind::Audio,
            PickedMediaKind::File => return Err(Error::UnsupportedMedia("file".to_string())),
        };
        Ok(MediaAttachment::new(kind, picked.url))
    }
}
