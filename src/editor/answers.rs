use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use crate::models::question::{Question, QuestionBody};

/// One captured answer. Choice kinds collect option ids, text kinds hold the
/// typed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerDraft {
    Selection(BTreeSet<Uuid>),
    Text(String),
}

/// Answers captured while walking through a preview. Never persisted; the
/// whole sheet is dropped with the preview that owns it.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    answers: HashMap<Uuid, AnswerDraft>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a click on an option. Radio semantics for single choice,
    /// checkbox semantics for multiple choice. Clicks on ids the question
    /// does not own are ignored.
    pub fn select_option(&mut self, question: &Question, option_id: Uuid) {
        let Some(options) = question.options() else {
            return;
        };
        if !options.iter().any(|option| option.id == option_id) {
            return;
        }

        let single = matches!(question.body, QuestionBody::SingleChoice { .. });
        let draft = self
            .answers
            .entry(question.id)
            .or_insert_with(|| AnswerDraft::Selection(BTreeSet::new()));
        if let AnswerDraft::Selection(selected) = draft {
            if single {
                selected.clear();
                selected.insert(option_id);
            } else if !selected.remove(&option_id) {
                selected.insert(option_id);
            }
        }
    }

    /// Stores the typed response for a fill-in-blank or detailed-answer
    /// question. Ignored for choice kinds.
    pub fn set_text(&mut self, question: &Question, text: impl Into<String>) {
        if question.options().is_some() {
            return;
        }
        self.answers
            .insert(question.id, AnswerDraft::Text(text.into()));
    }

    pub fn selected_options(&self, question_id: Uuid) -> Option<&BTreeSet<Uuid>> {
        match self.answers.get(&question_id) {
            Some(AnswerDraft::Selection(selected)) => Some(selected),
            _ => None,
        }
    }

    pub fn text(&self, question_id: Uuid) -> Option<&str> {
        match self.answers.get(&question_id) {
            Some(AnswerDraft::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answers
            .values()
            .filter(|draft| match draft {
                AnswerDraft::Selection(selected) => !selected.is_empty(),
                AnswerDraft::Text(text) => !text.trim().is_empty(),
            })
            .count()
    }
}
