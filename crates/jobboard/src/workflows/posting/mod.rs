//! Recruiter-side job posting ("annonce") creation wizard.
//!
//! The wizard walks a draft through job information, description, preferences,
//! screening questions, and a verification screen before a simulated submission.

pub mod domain;
pub mod duplication;
pub mod preview;
pub mod questions;
pub mod router;
pub mod service;
pub mod submission;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    AnnonceType, BaseInformation, ContractDuration, ContractType, DurationUnit,
    JobTypeInformation, PartTimeDetails, PostingDraft, Preferences, SalaryDisplayType,
    SalaryFrequency, SalaryInformation, WizardStep,
};
pub use duplication::{
    DateRange, DuplicationError, ExistingPosting, PostingStatus, TemplateFilter,
    TemplateRepository, TemplateRepositoryError,
};
pub use preview::{DraftPreview, PreviewSection};
pub use questions::{
    FormattedQuestion, QuestionKind, QuestionOrigin, QuestionType, SelectedQuestion,
    StoredQuestion,
};
pub use router::wizard_router;
pub use service::{
    PostingWizardService, SessionId, TemplateSummary, WizardConfig, WizardServiceError,
    WizardSessionView,
};
pub use submission::{
    Notice, PostingPublisher, PostingSubmission, PublishError, PublishedPosting,
    SimulatedPublisher, SubmissionError, SuccessScreen,
};
pub use validation::FieldError;
pub use wizard::{WizardEvent, WizardScreen, WizardState, WizardStore};
