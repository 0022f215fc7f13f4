use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::content;
use crate::dto::test_dto::{SaveTestPayload, TestResponse, TestSettings};
use crate::editor::preview::PreviewSession;
use crate::error::{Error, Result};
use crate::models::question::{Question, QuestionKind};
use crate::models::test::Test;
use crate::services::test_service::TestStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Editing,
    Saving,
    Previewing,
    ReadOnly,
}

/// The live editable draft of one test. Owns the question collection for the
/// duration of the edit; previews borrow a frozen snapshot through
/// [`PreviewSession`] and never write back.
///
/// States: `Editing ⇄ Saving → (ReadOnly | Editing)` and
/// `Editing ⇄ Previewing`. Saving and previewing cannot overlap: both
/// transitions require `Editing`.
pub struct TestAuthoringSession {
    draft: Test,
    // The backend id this draft updates. `None` until the first create
    // succeeds, which is what distinguishes the create flow.
    persisted_id: Option<Uuid>,
    state: SessionState,
    preview: Option<PreviewSession>,
}

impl TestAuthoringSession {
    /// Create flow: a blank draft seeded with one default single-choice
    /// question, ready to edit.
    pub fn create() -> Self {
        Self {
            draft: Test::draft(),
            persisted_id: None,
            state: SessionState::Editing,
            preview: None,
        }
    }

    /// Edit flow: populates the draft from a fetched test. A corrupt
    /// `content` blob is logged and replaced with an empty collection so the
    /// editor still opens.
    pub fn hydrate(response: TestResponse) -> Self {
        let questions = match content::decode(&response.content) {
            Ok(questions) => questions,
            Err(err) => {
                error!("Failed to decode content of test {}: {}", response.id, err);
                Vec::new()
            }
        };
        Self {
            draft: Test {
                id: response.id,
                title: response.name,
                description: response.description,
                passing_score: response.settings.passing_score,
                time_limit_minutes: response.settings.time_limit,
                category_ids: response.category_ids.into_iter().collect(),
                questions,
            },
            persisted_id: Some(response.id),
            state: SessionState::Editing,
            preview: None,
        }
    }

    /// Fetch-then-hydrate convenience for the edit flow.
    pub async fn load<S: TestStore>(id: Uuid, store: &S) -> Result<Self> {
        let response = store.get_test(id).await?;
        Ok(Self::hydrate(response))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn draft(&self) -> &Test {
        &self.draft
    }

    pub fn is_new(&self) -> bool {
        self.persisted_id.is_none()
    }

    pub fn is_read_only(&self) -> bool {
        self.state == SessionState::ReadOnly
    }

    // Optimistic local editing: edits stay allowed while a save is in
    // flight, they just land in the next payload snapshot.
    fn editable(&self) -> bool {
        matches!(self.state, SessionState::Editing | SessionState::Saving)
    }

    // ----- metadata -----

    pub fn set_title(&mut self, title: impl Into<String>) {
        if self.editable() {
            self.draft.title = title.into();
        }
    }

    pub fn set_description(&mut self, description: Option<String>) {
        if self.editable() {
            self.draft.description =
                description.filter(|text| !text.trim().is_empty());
        }
    }

    pub fn set_passing_score(&mut self, score: u32) {
        if self.editable() {
            self.draft.passing_score = score.min(100);
        }
    }

    /// `None` means unlimited. `Some(0)` is normalized to unlimited rather
    /// than producing a limit the backend would reject.
    pub fn set_time_limit_minutes(&mut self, minutes: Option<u32>) {
        if self.editable() {
            self.draft.time_limit_minutes = minutes.filter(|m| *m > 0);
        }
    }

    pub fn add_category(&mut self, category_id: Uuid) {
        if self.editable() {
            self.draft.category_ids.insert(category_id);
        }
    }

    pub fn remove_category(&mut self, category_id: Uuid) {
        if self.editable() {
            self.draft.category_ids.remove(&category_id);
        }
    }

    // ----- question collection -----

    /// Appends a default question and returns its id. `None` when the
    /// session is not editable.
    pub fn add_question(&mut self) -> Option<Uuid> {
        if !self.editable() {
            return None;
        }
        let question = Question::new(QuestionKind::SingleChoice);
        let id = question.id;
        self.draft.questions.push(question);
        Some(id)
    }

    /// Removes a question. Refused when it is the last one: the editor never
    /// shows an empty test.
    pub fn remove_question(&mut self, question_id: Uuid) -> bool {
        if !self.editable() || self.draft.questions.len() <= 1 {
            return false;
        }
        let before = self.draft.questions.len();
        self.draft
            .questions
            .retain(|question| question.id != question_id);
        self.draft.questions.len() < before
    }

    /// Inserts a copy of the question at `index` right after it. The copy
    /// gets a fresh question id and fresh option ids, so the two never alias.
    pub fn duplicate_question(&mut self, index: usize) -> Option<Uuid> {
        if !self.editable() || index >= self.draft.questions.len() {
            return None;
        }
        let copy = self.draft.questions[index].duplicated();
        let id = copy.id;
        self.draft.questions.insert(index + 1, copy);
        Some(id)
    }

    /// Mutable access for the per-question operations (change kind, option
    /// edits, media). `None` for unknown ids or a non-editable session.
    pub fn question_mut(&mut self, question_id: Uuid) -> Option<&mut Question> {
        if !self.editable() {
            return None;
        }
        self.draft
            .questions
            .iter_mut()
            .find(|question| question.id == question_id)
    }

    /// Gates the discard-changes prompt when leaving a create flow with
    /// typed-in content. Never blocks or allows a save.
    pub fn is_dirty(&self) -> bool {
        self.is_new()
            && (!self.draft.title.trim().is_empty()
                || self
                    .draft
                    .questions
                    .iter()
                    .any(|question| !question.text.trim().is_empty()))
    }

    // ----- saving -----

    /// The wire form of the current draft; `content` comes from the codec.
    pub fn build_save_payload(&self) -> Result<SaveTestPayload> {
        Ok(SaveTestPayload {
            name: self.draft.title.trim().to_string(),
            description: self.draft.description.clone(),
            category_ids: self.draft.category_ids.iter().copied().collect(),
            settings: TestSettings {
                passing_score: self.draft.passing_score,
                time_limit: self.draft.time_limit_minutes,
            },
            content: content::encode(&self.draft.questions)?,
        })
    }

    /// Snapshots and validates the draft and transitions `Editing → Saving`.
    /// Refused while another save is in flight, while previewing, or after
    /// the session went read-only; callers disable the save control in those
    /// states anyway.
    pub fn begin_save(&mut self) -> Result<SaveTestPayload> {
        match self.state {
            SessionState::Editing => {}
            SessionState::Saving => {
                return Err(Error::InvalidOperation(
                    "A save is already in progress".to_string(),
                ))
            }
            SessionState::Previewing => {
                return Err(Error::InvalidOperation(
                    "Cannot save while previewing".to_string(),
                ))
            }
            SessionState::ReadOnly => {
                return Err(Error::InvalidOperation(
                    "The session is read-only".to_string(),
                ))
            }
        }
        if self.draft.title.trim().is_empty() {
            return Err(Error::InvalidOperation(
                "A test needs a title before it can be saved".to_string(),
            ));
        }

        let payload = self.build_save_payload()?;
        payload.validate()?;
        self.state = SessionState::Saving;
        Ok(payload)
    }

    /// Applies the backend's verdict. Success on an existing test locks the
    /// session read-only; success on a new test adopts the assigned id and
    /// stays editable so the caller can navigate away. Failure returns to
    /// `Editing` with the draft intact for a retry.
    pub fn complete_save(&mut self, outcome: Result<TestResponse>) -> Result<TestResponse> {
        debug_assert_eq!(self.state, SessionState::Saving);
        match outcome {
            Ok(response) => {
                if self.persisted_id.is_some() {
                    self.state = SessionState::ReadOnly;
                } else {
                    info!("Created test {} ('{}')", response.id, response.name);
                    self.draft.id = response.id;
                    self.persisted_id = Some(response.id);
                    self.state = SessionState::Editing;
                }
                Ok(response)
            }
            Err(err) => {
                warn!("Save failed, draft retained: {}", err);
                self.state = SessionState::Editing;
                Err(err)
            }
        }
    }

    /// Full save round-trip: snapshot, send, apply the outcome. `&mut self`
    /// across the await keeps a second save from starting underneath.
    pub async fn save<S: TestStore>(&mut self, store: &S) -> Result<TestResponse> {
        let payload = self.begin_save()?;
        let outcome = match self.persisted_id {
            Some(id) => store.update_test(id, payload).await,
            None => store.create_test(payload).await,
        };
        self.complete_save(outcome)
    }

    // ----- preview -----

    /// Freezes the draft and enters the exam simulation. Requires `Editing`,
    /// which also rules out starting a preview mid-save.
    pub fn start_preview(&mut self) -> Result<&mut PreviewSession> {
        if self.state != SessionState::Editing {
            return Err(Error::InvalidOperation(
                "Preview can only start from the editor".to_string(),
            ));
        }
        self.state = SessionState::Previewing;
        Ok(self.preview.insert(PreviewSession::start(&self.draft)))
    }

    pub fn preview(&self) -> Option<&PreviewSession> {
        self.preview.as_ref()
    }

    pub fn preview_mut(&mut self) -> Option<&mut PreviewSession> {
        self.preview.as_mut()
    }

    /// Manual exit before the clock runs out. Drops the preview and its
    /// answers and cancels the countdown. Refused once expired: the time's-up
    /// notice can only be dismissed through [`acknowledge_expiry`].
    ///
    /// [`acknowledge_expiry`]: Self::acknowledge_expiry
    pub fn end_preview(&mut self) -> Result<()> {
        let Some(preview) = &self.preview else {
            return Err(Error::InvalidOperation(
                "No preview is active".to_string(),
            ));
        };
        if preview.is_expired() {
            return Err(Error::InvalidOperation(
                "Time is up; the notice must be acknowledged".to_string(),
            ));
        }
        self.preview = None;
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Dismisses the time's-up notice, discarding the captured answers and
    /// returning to the editor.
    pub fn acknowledge_expiry(&mut self) -> Result<()> {
        match &self.preview {
            Some(preview) if preview.is_expired() => {
                self.preview = None;
                self.state = SessionState::Editing;
                Ok(())
            }
            _ => Err(Error::InvalidOperation(
                "The preview has not expired".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_service::MockTestStore;

    fn stored(payload: &SaveTestPayload, id: Uuid) -> TestResponse {
        TestResponse {
            id,
            name: payload.name.clone(),
            description: payload.description.clone(),
            category_ids: payload.category_ids.clone(),
            settings: payload.settings.clone(),
            content: payload.content.clone(),
            created_at: Some(crate::utils::time::now()),
            updated_at: Some(crate::utils::time::now()),
        }
    }

    fn hydrated_session() -> TestAuthoringSession {
        let mut session = TestAuthoringSession::create();
        session.set_title("Алгебра 7");
        let payload = session.build_save_payload().unwrap();
        TestAuthoringSession::hydrate(stored(&payload, Uuid::new_v4()))
    }

    #[test]
    fn create_flow_seeds_one_default_question() {
        let session = TestAuthoringSession::create();
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.is_new());
        let questions = &session.draft().questions;
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].kind(), QuestionKind::SingleChoice);
        let options = questions[0].options().unwrap();
        assert_eq!(options.len(), 1);
        assert!(!options[0].is_correct);
    }

    #[test]
    fn dirty_tracks_title_and_question_text() {
        let mut session = TestAuthoringSession::create();
        assert!(!session.is_dirty());

        session.set_title("  ");
        assert!(!session.is_dirty());

        session.set_title("Geometry");
        assert!(session.is_dirty());

        session.set_title("");
        let id = session.draft().questions[0].id;
        session.question_mut(id).unwrap().text = "What is a ray?".to_string();
        assert!(session.is_dirty());

        // Dirty only ever gates the create flow.
        assert!(!hydrated_session().is_dirty());
    }

    #[test]
    fn remove_question_keeps_at_least_one() {
        let mut session = TestAuthoringSession::create();
        let first = session.draft().questions[0].id;
        assert!(!session.remove_question(first));

        let second = session.add_question().unwrap();
        assert!(session.remove_question(first));
        assert!(!session.remove_question(second));
        assert_eq!(session.draft().questions.len(), 1);
    }

    #[test]
    fn duplicate_inserts_after_with_fresh_ids() {
        let mut session = TestAuthoringSession::create();
        session.add_question();
        let original = session.draft().questions[0].clone();

        let copy_id = session.duplicate_question(0).unwrap();
        let questions = &session.draft().questions;
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[1].id, copy_id);
        assert_ne!(copy_id, original.id);
        assert_ne!(
            questions[1].options().unwrap()[0].id,
            original.options().unwrap()[0].id
        );
        assert_eq!(questions[1].text, original.text);

        assert!(session.duplicate_question(7).is_none());
    }

    #[test]
    fn begin_save_requires_a_title() {
        let mut session = TestAuthoringSession::create();
        assert!(matches!(
            session.begin_save(),
            Err(Error::InvalidOperation(_))
        ));
        assert_eq!(session.state(), SessionState::Editing);

        session.set_title("  Physics intro  ");
        let payload = session.begin_save().unwrap();
        assert_eq!(payload.name, "Physics intro");
        assert_eq!(session.state(), SessionState::Saving);
    }

    #[test]
    fn one_save_in_flight_per_session() {
        let mut session = TestAuthoringSession::create();
        session.set_title("History");
        session.begin_save().unwrap();
        assert!(matches!(
            session.begin_save(),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn edits_during_a_save_land_in_the_next_payload() {
        let mut session = TestAuthoringSession::create();
        session.set_title("Draft v1");
        let snapshot = session.begin_save().unwrap();

        session.set_title("Draft v2");
        assert_eq!(snapshot.name, "Draft v1");

        let response = stored(&snapshot, Uuid::new_v4());
        session.complete_save(Ok(response)).unwrap();
        let next = session.build_save_payload().unwrap();
        assert_eq!(next.name, "Draft v2");
    }

    #[tokio::test]
    async fn create_save_adopts_the_backend_id_and_stays_editable() {
        let mut session = TestAuthoringSession::create();
        session.set_title("Chemistry");
        let backend_id = Uuid::new_v4();

        let mut store = MockTestStore::new();
        store
            .expect_create_test()
            .times(1)
            .returning(move |payload| Ok(stored(&payload, backend_id)));

        let response = session.save(&store).await.unwrap();
        assert_eq!(response.id, backend_id);
        assert_eq!(session.draft().id, backend_id);
        assert!(!session.is_new());
        assert_eq!(session.state(), SessionState::Editing);
    }

    #[tokio::test]
    async fn update_save_goes_read_only() {
        let mut session = hydrated_session();
        let id = session.draft().id;

        let mut store = MockTestStore::new();
        store
            .expect_update_test()
            .times(1)
            .returning(move |id, payload| Ok(stored(&payload, id)));

        let response = session.save(&store).await.unwrap();
        assert_eq!(response.id, id);
        assert!(session.is_read_only());

        // A read-only session refuses further edits and saves.
        assert!(session.add_question().is_none());
        assert!(matches!(
            session.save(&store).await,
            Err(Error::InvalidOperation(_))
        ));
    }

    #[tokio::test]
    async fn failed_save_keeps_the_draft_and_the_editing_state() {
        let mut session = TestAuthoringSession::create();
        session.set_title("Biology");
        session.add_question();

        let mut store = MockTestStore::new();
        store.expect_create_test().times(1).returning(|_| {
            Err(Error::Api {
                status: 503,
                message: "maintenance".to_string(),
            })
        });

        let err = session.save(&store).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 503, .. }));
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.is_new());
        assert_eq!(session.draft().questions.len(), 2);
        assert_eq!(session.draft().title, "Biology");
    }

    #[test]
    fn hydration_recovers_from_corrupt_content() {
        let response = TestResponse {
            id: Uuid::new_v4(),
            name: "Damaged".to_string(),
            description: None,
            category_ids: vec![],
            settings: TestSettings {
                passing_score: 50,
                time_limit: None,
            },
            content: "%%% not a blob %%%".to_string(),
            created_at: None,
            updated_at: None,
        };
        let session = TestAuthoringSession::hydrate(response);
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.draft().questions.is_empty());
    }

    #[test]
    fn preview_and_save_are_mutually_exclusive() {
        let mut session = TestAuthoringSession::create();
        session.set_title("Timed");
        session.start_preview().unwrap();
        assert_eq!(session.state(), SessionState::Previewing);

        assert!(matches!(
            session.begin_save(),
            Err(Error::InvalidOperation(_))
        ));
        assert!(session.start_preview().is_err());

        session.end_preview().unwrap();
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.preview().is_none());
        assert!(session.begin_save().is_ok());
    }

    #[tokio::test]
    async fn expiry_requires_acknowledgment() {
        let mut session = TestAuthoringSession::create();
        session.set_title("Sprint");
        session.set_time_limit_minutes(Some(1));

        assert!(session.acknowledge_expiry().is_err());

        let preview = session.start_preview().unwrap();
        for _ in 0..60 {
            preview.tick();
        }
        assert!(session.preview().unwrap().is_expired());

        // Outside-click dismissal maps to end_preview, which is refused.
        assert!(session.end_preview().is_err());
        assert_eq!(session.state(), SessionState::Previewing);

        session.acknowledge_expiry().unwrap();
        assert_eq!(session.state(), SessionState::Editing);
        assert!(session.preview().is_none());
    }

    #[test]
    fn preview_edits_never_touch_the_draft() {
        let mut session = TestAuthoringSession::create();
        session.set_title("Readonly check");
        let question_id = session.draft().questions[0].id;
        let option_id = session.draft().questions[0].options().unwrap()[0].id;
        let before = session.draft().clone();

        let preview = session.start_preview().unwrap();
        preview.select_option(question_id, option_id);
        assert_eq!(preview.answered_count(), 1);

        // While previewing, authoring mutations are refused.
        assert!(session.add_question().is_none());
        assert!(session.question_mut(question_id).is_none());

        session.end_preview().unwrap();
        assert_eq!(session.draft(), &before);
    }

    #[test]
    fn settings_are_normalized() {
        let mut session = TestAuthoringSession::create();
        session.set_passing_score(250);
        assert_eq!(session.draft().passing_score, 100);

        session.set_time_limit_minutes(Some(0));
        assert_eq!(session.draft().time_limit_minutes, None);

        session.set_description(Some("   ".to_string()));
        assert_eq!(session.draft().description, None);
        session.set_description(Some("Final exam".to_string()));
        assert_eq!(session.draft().description.as_deref(), Some("Final exam"));

        let category = Uuid::new_v4();
        session.add_category(category);
        session.add_category(category);
        assert_eq!(session.draft().category_ids.len(), 1);
        session.remove_category(category);
        assert!(session.draft().category_ids.is_empty());
    }

    #[test]
    fn payload_content_round_trips_the_questions() {
        let mut session = TestAuthoringSession::create();
        session.set_title("Round trip");
        session.add_question();
        let id = session.draft().questions[1].id;
        session
            .question_mut(id)
            .unwrap()
            .change_kind(QuestionKind::FillInBlank);

        let payload = session.build_save_payload().unwrap();
        let decoded = content::decode(&payload.content).unwrap();
        assert_eq!(decoded, session.draft().questions);
    }
}
