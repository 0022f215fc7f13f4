use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::media::{MediaAlignment, MediaAttachment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
    #[serde(flatten)]
    pub body: QuestionBody,
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultipleChoice,
    FillInBlank,
    DetailedAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionBody {
    SingleChoice { options: Vec<QuestionOption> },
    MultipleChoice { options: Vec<QuestionOption> },
    FillInBlank { correct_answer_text: String },
    DetailedAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: Uuid,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl QuestionOption {
    pub fn blank() -> Self {
        Self {
            id: Uuid::new_v4(),
            text: String::new(),
            is_correct: false,
        }
    }
}

impl Question {
    pub fn new(kind: QuestionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: String::new(),
            points: default_points(),
            media: None,
            body: QuestionBody::seeded(kind),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self.body {
            QuestionBody::SingleChoice { .. } => QuestionKind::SingleChoice,
            QuestionBody::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            QuestionBody::FillInBlank { .. } => QuestionKind::FillInBlank,
            QuestionBody::DetailedAnswer => QuestionKind::DetailedAnswer,
        }
    }

    pub fn options(&self) -> Option<&[QuestionOption]> {
        match &self.body {
            QuestionBody::SingleChoice { options } | QuestionBody::MultipleChoice { options } => {
                Some(options)
            }
            _ => None,
        }
    }

    fn options_mut(&mut self) -> Option<&mut Vec<QuestionOption>> {
        match &mut self.body {
            QuestionBody::SingleChoice { options } | QuestionBody::MultipleChoice { options } => {
                Some(options)
            }
            _ => None,
        }
    }

    /// Switches the question to another kind, carrying the option list over
    /// between the two choice kinds and resetting the body otherwise.
    pub fn change_kind(&mut self, new_kind: QuestionKind) {
        if self.kind() == new_kind {
            return;
        }
        let old = std::mem::replace(&mut self.body, QuestionBody::DetailedAnswer);
        self.body = match (old, new_kind) {
            (
                QuestionBody::SingleChoice { mut options }
                | QuestionBody::MultipleChoice { mut options },
                QuestionKind::MultipleChoice,
            ) => {
                if options.is_empty() {
                    options.push(QuestionOption::blank());
                }
                QuestionBody::MultipleChoice { options }
            }
            (
                QuestionBody::SingleChoice { mut options }
                | QuestionBody::MultipleChoice { mut options },
                QuestionKind::SingleChoice,
            ) => {
                if options.is_empty() {
                    options.push(QuestionOption::blank());
                }
                demote_extra_correct(&mut options);
                QuestionBody::SingleChoice { options }
            }
            (_, kind) => QuestionBody::seeded(kind),
        };
    }

    /// Appends a blank option and returns its id. `None` for kinds that have
    /// no option list.
    pub fn add_option(&mut self) -> Option<Uuid> {
        let options = self.options_mut()?;
        let option = QuestionOption::blank();
        let id = option.id;
        options.push(option);
        Some(id)
    }

    /// Removes an option. Refused (returns false) when the question is not a
    /// choice kind, the id is unknown, or only one option remains.
    pub fn remove_option(&mut self, option_id: Uuid) -> bool {
        let Some(options) = self.options_mut() else {
            return false;
        };
        if options.len() <= 1 {
            return false;
        }
        let before = options.len();
        options.retain(|option| option.id != option_id);
        options.len() < before
    }

    pub fn set_option_text(&mut self, option_id: Uuid, text: impl Into<String>) -> bool {
        let Some(options) = self.options_mut() else {
            return false;
        };
        match options.iter_mut().find(|option| option.id == option_id) {
            Some(option) => {
                option.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Marks an option correct. Single choice keeps radio semantics: the
    /// target becomes the only correct option, and re-toggling it leaves it
    /// selected. Multiple choice flips the flag independently.
    pub fn toggle_correct(&mut self, option_id: Uuid) -> bool {
        match &mut self.body {
            QuestionBody::SingleChoice { options } => {
                if !options.iter().any(|option| option.id == option_id) {
                    return false;
                }
                for option in options.iter_mut() {
                    option.is_correct = option.id == option_id;
                }
                true
            }
            QuestionBody::MultipleChoice { options } => {
                match options.iter_mut().find(|option| option.id == option_id) {
                    Some(option) => {
                        option.is_correct = !option.is_correct;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    pub fn set_correct_answer_text(&mut self, text: impl Into<String>) -> bool {
        match &mut self.body {
            QuestionBody::FillInBlank {
                correct_answer_text,
            } => {
                *correct_answer_text = text.into();
                true
            }
            _ => false,
        }
    }

    pub fn set_points(&mut self, points: u32) {
        self.points = points.max(1);
    }

    pub fn attach_media(&mut self, media: MediaAttachment) {
        self.media = Some(media);
    }

    pub fn clear_media(&mut self) {
        self.media = None;
    }

    /// No-op without an attachment; the alignment controls only render when
    /// one exists.
    pub fn set_media_alignment(&mut self, alignment: MediaAlignment) -> bool {
        match &mut self.media {
            Some(media) => {
                media.alignment = alignment;
                true
            }
            None => false,
        }
    }

    pub fn set_media_size(&mut self, percent: u8) -> bool {
        match &mut self.media {
            Some(media) => {
                media.set_size_percent(percent);
                true
            }
            None => false,
        }
    }

    /// A copy with fresh ids for the question and every option, so the copy
    /// can be edited independently of the original.
    pub fn duplicated(&self) -> Self {
        let mut copy = self.clone();
        copy.id = Uuid::new_v4();
        if let Some(options) = copy.options_mut() {
            for option in options.iter_mut() {
                option.id = Uuid::new_v4();
            }
        }
        copy
    }
}

impl QuestionBody {
    fn seeded(kind: QuestionKind) -> Self {
        match kind {
            QuestionKind::SingleChoice => QuestionBody::SingleChoice {
                options: vec![QuestionOption::blank()],
            },
            QuestionKind::MultipleChoice => QuestionBody::MultipleChoice {
                options: vec![QuestionOption::blank()],
            },
            QuestionKind::FillInBlank => QuestionBody::FillInBlank {
                correct_answer_text: String::new(),
            },
            QuestionKind::DetailedAnswer => QuestionBody::DetailedAnswer,
        }
    }
}

fn demote_extra_correct(options: &mut [QuestionOption]) {
    let mut seen_correct = false;
    for option in options.iter_mut() {
        if option.is_correct {
            if seen_correct {
                option.is_correct = false;
            }
            seen_correct = true;
        }
    }
}
