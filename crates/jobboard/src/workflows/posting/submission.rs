use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    AnnonceType, BaseInformation, JobTypeInformation, Preferences, SalaryInformation, WizardStep,
};
use super::questions::FormattedQuestion;
use super::validation::{validate_step, FieldError};
use super::wizard::WizardStore;

pub const DASHBOARD_PATH: &str = "/recruiter/dashboard";

/// Payload handed to the publisher once the draft passes verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingSubmission {
    pub annonce_type: AnnonceType,
    pub base_information: BaseInformation,
    pub job_type_information: JobTypeInformation,
    pub salary_information: SalaryInformation,
    pub description: String,
    pub preferences: Preferences,
    pub questions: Vec<FormattedQuestion>,
}

impl PostingSubmission {
    pub fn from_store(store: &WizardStore) -> Self {
        let draft = store.draft();
        Self {
            annonce_type: store.annonce_type().unwrap_or(AnnonceType::New),
            base_information: draft.base_information.clone(),
            job_type_information: draft.job_type_information.clone(),
            salary_information: draft.salary_information.clone(),
            description: draft.description.clone(),
            preferences: draft.preferences.clone(),
            questions: store.formatted_questions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPosting {
    pub id: String,
}

/// Terminal screen shown after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessScreen {
    pub posting_id: String,
    pub dashboard_path: &'static str,
    pub posting_path: String,
    pub notice: Notice,
}

impl SuccessScreen {
    fn for_posting(posting: PublishedPosting) -> Self {
        Self {
            posting_path: format!("/recruiter/annonces/{}", posting.id),
            posting_id: posting.id,
            dashboard_path: DASHBOARD_PATH,
            notice: Notice::success("Your posting has been published."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast-style message surfaced to the recruiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }
}

/// Outbound hook receiving finished postings.
pub trait PostingPublisher: Send + Sync {
    fn publish(&self, submission: &PostingSubmission) -> Result<PublishedPosting, PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("publishing rejected: {0}")]
    Rejected(String),
    #[error("publishing service unavailable: {0}")]
    Unavailable(String),
}

/// Accepts every submission and hands out sequential ids.
#[derive(Debug, Default)]
pub struct SimulatedPublisher {
    sequence: AtomicU64,
}

impl PostingPublisher for SimulatedPublisher {
    fn publish(&self, _submission: &PostingSubmission) -> Result<PublishedPosting, PublishError> {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(PublishedPosting {
            id: format!("annonce-{id:06}"),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission is only available from the verification step (currently on {})", .0.id())]
    NotOnVerification(WizardStep),
    #[error("draft has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldError>),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl PublishError {
    pub fn notice(&self) -> Notice {
        match self {
            PublishError::Rejected(reason) => Notice::error(reason.clone()),
            PublishError::Unavailable(_) => {
                Notice::error("The posting could not be published. Please try again.")
            }
        }
    }
}

impl SubmissionError {
    pub fn notice(&self) -> Notice {
        match self {
            SubmissionError::Publish(error) => error.notice(),
            other => Notice::error(other.to_string()),
        }
    }
}

/// Validates the whole draft, waits the simulated delay, then publishes.
///
/// The store is never mutated; on failure the caller stays on verification and may retry.
pub async fn submit<P>(
    store: &WizardStore,
    publisher: &P,
    delay: Duration,
    today: NaiveDate,
) -> Result<SuccessScreen, SubmissionError>
where
    P: PostingPublisher + ?Sized,
{
    let submission = prepare_submission(store, today)?;

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    publish_prepared(publisher, &submission)
}

pub(crate) fn prepare_submission(
    store: &WizardStore,
    today: NaiveDate,
) -> Result<PostingSubmission, SubmissionError> {
    if store.current_step() != WizardStep::Verification {
        return Err(SubmissionError::NotOnVerification(store.current_step()));
    }

    let errors = validate_step(WizardStep::Verification, store.draft(), today);
    if !errors.is_empty() {
        return Err(SubmissionError::Invalid(errors));
    }

    Ok(PostingSubmission::from_store(store))
}

pub(crate) fn publish_prepared<P>(
    publisher: &P,
    submission: &PostingSubmission,
) -> Result<SuccessScreen, SubmissionError>
where
    P: PostingPublisher + ?Sized,
{
    match publisher.publish(submission) {
        Ok(posting) => {
            info!(posting_id = %posting.id, "posting published");
            Ok(SuccessScreen::for_posting(posting))
        }
        Err(error) => {
            warn!(%error, "posting submission failed");
            Err(error.into())
        }
    }
}
