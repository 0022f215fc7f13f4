use tracing::debug;
use uuid::Uuid;

use crate::editor::answers::AnswerSheet;
use crate::editor::countdown::Countdown;
use crate::models::question::Question;
use crate::models::test::Test;
use crate::utils::time::format_clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPhase {
    Running,
    Expired,
}

/// Exam simulation over a frozen snapshot of the draft. Answers live in a
/// disposable sheet and the snapshot never feeds back into the draft, so a
/// preview can be abandoned at any point without side effects.
pub struct PreviewSession {
    questions: Vec<Question>,
    time_limit_minutes: Option<u32>,
    remaining_seconds: Option<u32>,
    phase: PreviewPhase,
    answers: AnswerSheet,
    countdown: Option<Countdown>,
}

impl PreviewSession {
    /// Freezes the draft's questions and settings and, when the test is
    /// timed, starts the countdown immediately.
    pub fn start(test: &Test) -> Self {
        let remaining_seconds = test
            .time_limit_minutes
            .map(|minutes| minutes.saturating_mul(60));
        Self {
            questions: test.questions.clone(),
            time_limit_minutes: test.time_limit_minutes,
            remaining_seconds,
            phase: PreviewPhase::Running,
            answers: AnswerSheet::new(),
            countdown: remaining_seconds.map(|_| Countdown::start()),
        }
    }

    /// Applies one elapsed second. Untimed previews never change phase; timed
    /// ones flip to `Expired` when the clock reaches zero, which also stops
    /// the ticker.
    pub fn tick(&mut self) -> PreviewPhase {
        if self.phase == PreviewPhase::Expired {
            return self.phase;
        }
        let Some(remaining) = self.remaining_seconds else {
            return self.phase;
        };

        let remaining = remaining.saturating_sub(1);
        self.remaining_seconds = Some(remaining);
        if remaining == 0 {
            self.phase = PreviewPhase::Expired;
            self.countdown = None;
            debug!(
                "preview expired after {} minute(s)",
                self.time_limit_minutes.unwrap_or(0)
            );
        }
        self.phase
    }

    /// Waits for the ticker and applies the second it reports. `None` for
    /// untimed previews and after expiry.
    pub async fn wait_tick(&mut self) -> Option<PreviewPhase> {
        let countdown = self.countdown.as_mut()?;
        countdown.next_tick().await?;
        Some(self.tick())
    }

    pub fn phase(&self) -> PreviewPhase {
        self.phase
    }

    pub fn is_expired(&self) -> bool {
        self.phase == PreviewPhase::Expired
    }

    pub fn is_counting(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    /// The timer the taker sees, e.g. `02:59` or `1:00:00`. `None` when the
    /// test has no time limit.
    pub fn remaining_clock(&self) -> Option<String> {
        self.remaining_seconds.map(format_clock)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    /// Click on an option of a choice question. Ignored once the preview has
    /// expired.
    pub fn select_option(&mut self, question_id: Uuid, option_id: Uuid) {
        if self.phase == PreviewPhase::Expired {
            return;
        }
        let Some(question) = self
            .questions
            .iter()
            .find(|question| question.id == question_id)
        else {
            return;
        };
        self.answers.select_option(question, option_id);
    }

    /// Typed response for a text question. Ignored once the preview has
    /// expired.
    pub fn set_text_answer(&mut self, question_id: Uuid, text: impl Into<String>) {
        if self.phase == PreviewPhase::Expired {
            return;
        }
        let Some(question) = self
            .questions
            .iter()
            .find(|question| question.id == question_id)
        else {
            return;
        };
        self.answers.set_text(question, text);
    }
}
