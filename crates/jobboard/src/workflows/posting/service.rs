use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use super::domain::{AnnonceType, PostingDraft, WizardStep};
use super::duplication::{
    self, DuplicationError, ExistingPosting, PostingStatus, TemplateFilter, TemplateRepository,
    TemplateRepositoryError,
};
use super::preview::{self, DraftPreview, PreviewSection};
use super::submission::{self, PostingPublisher, SubmissionError, SuccessScreen};
use super::validation::{validate_step, FieldError};
use super::wizard::{WizardEvent, WizardScreen, WizardStore};

/// Identifier of one wizard session held by the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("wizard-{id:06}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardConfig {
    pub submit_delay: Duration,
    /// Sessions untouched for this long are dropped when a new one is created.
    pub session_idle_timeout: Duration,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            submit_delay: Duration::from_millis(1500),
            session_idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

#[derive(Debug)]
struct WizardSession {
    store: WizardStore,
    completed: Option<SuccessScreen>,
    submitting: bool,
    last_touched: Instant,
}

impl WizardSession {
    fn new() -> Self {
        Self {
            store: WizardStore::new(),
            completed: None,
            submitting: false,
            last_touched: Instant::now(),
        }
    }
}

type SessionMap = HashMap<SessionId, WizardSession>;

/// What a call is allowed to do with a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    /// Draft changes. Refused once submitted and while submitting.
    Edit,
    /// Reset, the only way out of a completed session.
    Restart,
}

/// Marks a session as submitting until dropped, even if the submit future is cancelled.
struct InFlight<'a> {
    sessions: &'a Mutex<SessionMap>,
    id: &'a SessionId,
    published: Option<SuccessScreen>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get_mut(self.id) {
            session.submitting = false;
            session.completed = self.published.take();
            session.last_touched = Instant::now();
        }
    }
}

/// Snapshot of a session returned to API callers.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSessionView {
    pub session_id: SessionId,
    pub screen: WizardScreen,
    pub annonce_type: Option<AnnonceType>,
    pub current_step: WizardStep,
    pub step_index: usize,
    pub total_steps: usize,
    pub can_proceed: bool,
    pub draft: PostingDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<SuccessScreen>,
}

impl WizardSessionView {
    fn from_session(id: &SessionId, session: &WizardSession) -> Self {
        let store = &session.store;
        Self {
            session_id: id.clone(),
            screen: store.screen(),
            annonce_type: store.annonce_type(),
            current_step: store.current_step(),
            step_index: store.current_step_index(),
            total_steps: WizardStep::ordered().len(),
            can_proceed: store.can_proceed(),
            draft: store.draft().clone(),
            completed: session.completed.clone(),
        }
    }
}

/// Row of the template selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub title: String,
    pub city: String,
    pub status: PostingStatus,
    pub status_label: &'static str,
    pub created_on: NaiveDate,
    pub question_count: usize,
}

impl TemplateSummary {
    fn from_posting(posting: &ExistingPosting) -> Self {
        Self {
            id: posting.id.clone(),
            title: posting.title.clone(),
            city: posting.city.clone(),
            status: posting.status,
            status_label: posting.status.label(),
            created_on: posting.created_on,
            question_count: posting.questions.len(),
        }
    }
}

/// Service holding wizard sessions and wiring them to templates and the publisher.
pub struct PostingWizardService<T, P> {
    sessions: Mutex<SessionMap>,
    templates: Arc<T>,
    publisher: Arc<P>,
    config: WizardConfig,
}

impl<T, P> PostingWizardService<T, P>
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    pub fn new(templates: Arc<T>, publisher: Arc<P>, config: WizardConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            templates,
            publisher,
            config,
        }
    }

    fn sessions(&self) -> MutexGuard<'_, SessionMap> {
        self.sessions.lock().expect("wizard session mutex poisoned")
    }

    fn with_session<R>(
        &self,
        id: &SessionId,
        access: Access,
        action: impl FnOnce(&mut WizardSession) -> Result<R, WizardServiceError>,
    ) -> Result<R, WizardServiceError> {
        let mut sessions = self.sessions();
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| WizardServiceError::SessionNotFound(id.clone()))?;
        if session.submitting && access != Access::Read {
            return Err(WizardServiceError::SubmissionInProgress(id.clone()));
        }
        if session.completed.is_some() && access == Access::Edit {
            return Err(WizardServiceError::SessionCompleted(id.clone()));
        }
        session.last_touched = Instant::now();
        action(session)
    }

    pub fn create_session(&self) -> WizardSessionView {
        let id = next_session_id();
        let session = WizardSession::new();
        let view = WizardSessionView::from_session(&id, &session);

        let mut sessions = self.sessions();
        let idle = self.config.session_idle_timeout;
        let before = sessions.len();
        sessions.retain(|_, existing| {
            existing.submitting || existing.last_touched.elapsed() < idle
        });
        let evicted = before - sessions.len();
        sessions.insert(id.clone(), session);
        drop(sessions);

        if evicted > 0 {
            debug!(evicted, "dropped idle wizard sessions");
        }
        info!(session_id = %id, "posting wizard session created");
        view
    }

    /// Discards a session and its draft. Refused while a submission is in flight.
    pub fn close_session(&self, id: &SessionId) -> Result<(), WizardServiceError> {
        let mut sessions = self.sessions();
        match sessions.get(id) {
            None => return Err(WizardServiceError::SessionNotFound(id.clone())),
            Some(session) if session.submitting => {
                return Err(WizardServiceError::SubmissionInProgress(id.clone()));
            }
            Some(_) => {}
        }
        sessions.remove(id);
        info!(session_id = %id, "posting wizard session closed");
        Ok(())
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    pub fn get(&self, id: &SessionId) -> Result<WizardSessionView, WizardServiceError> {
        self.with_session(id, Access::Read, |session| {
            Ok(WizardSessionView::from_session(id, session))
        })
    }

    pub fn apply(
        &self,
        id: &SessionId,
        event: WizardEvent,
    ) -> Result<WizardSessionView, WizardServiceError> {
        let access = if matches!(event, WizardEvent::Reset) {
            Access::Restart
        } else {
            Access::Edit
        };
        self.with_session(id, access, |session| {
            debug!(session_id = %id, ?event, "applying wizard event");
            if matches!(event, WizardEvent::Reset) {
                session.completed = None;
            }
            session.store.apply(event);
            Ok(WizardSessionView::from_session(id, session))
        })
    }

    pub fn start_new(&self, id: &SessionId) -> Result<WizardSessionView, WizardServiceError> {
        self.with_session(id, Access::Edit, |session| {
            duplication::start_new(&mut session.store);
            info!(session_id = %id, "starting blank posting");
            Ok(WizardSessionView::from_session(id, session))
        })
    }

    pub fn duplicate(
        &self,
        id: &SessionId,
        posting_id: &str,
    ) -> Result<WizardSessionView, WizardServiceError> {
        let posting = self
            .templates
            .fetch(posting_id)
            .map_err(DuplicationError::from)?
            .ok_or_else(|| DuplicationError::NotFound(posting_id.to_string()))?;

        self.with_session(id, Access::Edit, |session| {
            duplication::duplicate_from(&mut session.store, &posting)?;
            info!(session_id = %id, posting_id, "seeded draft from existing posting");
            Ok(WizardSessionView::from_session(id, session))
        })
    }

    /// Moves forward only when the current step's form validates.
    pub fn advance(
        &self,
        id: &SessionId,
        today: NaiveDate,
    ) -> Result<WizardSessionView, WizardServiceError> {
        self.with_session(id, Access::Edit, |session| {
            if session.store.annonce_type().is_none() {
                return Err(WizardServiceError::TypeNotSelected);
            }
            let step = session.store.current_step();
            let errors = validate_step(step, session.store.draft(), today);
            if !session.store.can_proceed() || !errors.is_empty() {
                debug!(session_id = %id, step = step.id(), errors = errors.len(), "step blocked");
                return Err(WizardServiceError::StepBlocked { step, errors });
            }
            session.store.next_step();
            Ok(WizardSessionView::from_session(id, session))
        })
    }

    pub fn preview(&self, id: &SessionId) -> Result<DraftPreview, WizardServiceError> {
        self.with_session(id, Access::Read, |session| {
            Ok(preview::render_preview(&session.store))
        })
    }

    pub fn edit_section(
        &self,
        id: &SessionId,
        section: PreviewSection,
    ) -> Result<WizardSessionView, WizardServiceError> {
        self.with_session(id, Access::Edit, |session| {
            preview::edit_section(&mut session.store, section);
            Ok(WizardSessionView::from_session(id, session))
        })
    }

    pub fn templates(
        &self,
        filter: &TemplateFilter,
    ) -> Result<Vec<TemplateSummary>, WizardServiceError> {
        let postings = self.templates.list()?;
        Ok(duplication::filter_templates(&postings, filter)
            .into_iter()
            .map(TemplateSummary::from_posting)
            .collect())
    }

    pub fn template_cities(&self) -> Result<Vec<String>, WizardServiceError> {
        Ok(duplication::available_cities(&self.templates.list()?))
    }

    /// Simulated submission. The session lock is released while waiting, and the
    /// session refuses edits and further submits until the publisher answers.
    pub async fn submit(
        &self,
        id: &SessionId,
        today: NaiveDate,
    ) -> Result<SuccessScreen, WizardServiceError> {
        let prepared = self.with_session(id, Access::Edit, |session| {
            let prepared = submission::prepare_submission(&session.store, today)?;
            session.submitting = true;
            Ok(prepared)
        })?;
        let mut in_flight = InFlight {
            sessions: &self.sessions,
            id,
            published: None,
        };

        if !self.config.submit_delay.is_zero() {
            tokio::time::sleep(self.config.submit_delay).await;
        }

        let screen = submission::publish_prepared(self.publisher.as_ref(), &prepared)?;
        in_flight.published = Some(screen.clone());
        Ok(screen)
    }
}

/// Error raised by the wizard service.
#[derive(Debug, thiserror::Error)]
pub enum WizardServiceError {
    #[error("wizard session {0} not found")]
    SessionNotFound(SessionId),
    #[error("wizard session {0} already submitted")]
    SessionCompleted(SessionId),
    #[error("wizard session {0} is being submitted")]
    SubmissionInProgress(SessionId),
    #[error("choose between a new posting and an existing one first")]
    TypeNotSelected,
    #[error("step {} has {} invalid field(s)", .step.id(), .errors.len())]
    StepBlocked {
        step: WizardStep,
        errors: Vec<FieldError>,
    },
    #[error(transparent)]
    Duplication(#[from] DuplicationError),
    #[error(transparent)]
    Templates(#[from] TemplateRepositoryError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
