use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::posting::domain::{
    AnnonceType, BaseInformation, ContractDuration, ContractType, DurationUnit,
    JobTypeInformation, Preferences, SalaryDisplayType, SalaryFrequency, SalaryInformation,
    WizardStep,
};
use crate::workflows::posting::duplication::{
    ExistingPosting, PostingStatus, TemplateRepository, TemplateRepositoryError,
};
use crate::workflows::posting::questions::{QuestionKind, SelectedQuestion, StoredQuestion};
use crate::workflows::posting::service::{PostingWizardService, WizardConfig};
use crate::workflows::posting::submission::{
    PostingPublisher, PostingSubmission, PublishError, PublishedPosting,
};
use crate::workflows::posting::wizard::WizardStore;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn base_information() -> BaseInformation {
    BaseInformation {
        job_title: "Senior Rust developer".to_string(),
        number_of_people: "2".to_string(),
        promotion_location: "Casablanca".to_string(),
    }
}

pub(super) fn job_type_information() -> JobTypeInformation {
    JobTypeInformation {
        contract_types: BTreeSet::from([ContractType::FullTime, ContractType::FixedTerm]),
        fixed_term_duration: Some(ContractDuration {
            value: 12,
            unit: DurationUnit::Months,
        }),
        ..JobTypeInformation::default()
    }
}

pub(super) fn salary_information() -> SalaryInformation {
    SalaryInformation {
        display_type: SalaryDisplayType::Range,
        min_salary: Some(18000),
        max_salary: Some(26000),
        frequency: SalaryFrequency::Monthly,
    }
}

pub(super) fn description() -> String {
    "<p>Join our platform team to build <strong>reliable services</strong> in Rust.</p>\
     <ul><li>Own the job matching pipeline</li><li>Mentor two engineers</li></ul>"
        .to_string()
}

pub(super) fn preferences() -> Preferences {
    Preferences {
        notification_emails: vec!["talent@acme.ma".to_string()],
        require_resume: true,
        allow_candidate_contact: false,
        notify_on_application: true,
        deadline: NaiveDate::from_ymd_opt(2025, 7, 15),
    }
}

pub(super) fn questions() -> Vec<SelectedQuestion> {
    vec![
        SelectedQuestion::custom(
            "custom-1",
            "Which stack have you shipped to production?",
            QuestionKind::Choice {
                options: vec!["Rust".to_string(), "Go".to_string(), "Java".to_string()],
                is_multiple_choices: true,
            },
        )
        .required(),
        SelectedQuestion::custom(
            "custom-2",
            "Experience",
            QuestionKind::Experience {
                answer: "Distributed systems".to_string(),
            },
        ),
    ]
}

/// Store on the verification step with a draft that passes every form.
pub(super) fn verified_store() -> WizardStore {
    let mut store = WizardStore::new();
    store.set_annonce_type(AnnonceType::New);
    store.set_base_information(base_information());
    store.set_job_type_information(job_type_information());
    store.set_salary_information(salary_information());
    store.set_description(description());
    store.set_preferences(preferences());
    store.set_questions(questions());
    store.jump_to_step(WizardStep::Verification);
    store
}

pub(super) fn existing_posting() -> ExistingPosting {
    ExistingPosting {
        id: "posting-42".to_string(),
        title: "Senior Rust developer".to_string(),
        city: "Casablanca".to_string(),
        status: PostingStatus::Closed,
        created_on: NaiveDate::from_ymd_opt(2025, 2, 14).expect("valid date"),
        base_information: base_information(),
        job_type_information: job_type_information(),
        salary_information: salary_information(),
        description: description(),
        preferences: preferences(),
        questions: vec![
            StoredQuestion {
                id: "pq-availability".to_string(),
                question: "When can you start?".to_string(),
                question_type: "choice".to_string(),
                is_required: true,
                predefined: true,
                answer: None,
                options: Some(vec!["Immediately".to_string(), "Within one month".to_string()]),
                is_multiple_choices: Some(false),
            },
            StoredQuestion {
                id: "q-77".to_string(),
                question: "Do you hold a work permit?".to_string(),
                question_type: "yesno".to_string(),
                is_required: false,
                predefined: false,
                answer: None,
                options: None,
                is_multiple_choices: None,
            },
        ],
    }
}

pub(super) fn other_posting() -> ExistingPosting {
    ExistingPosting {
        id: "posting-7".to_string(),
        title: "Payroll accountant".to_string(),
        city: "Rabat".to_string(),
        status: PostingStatus::Active,
        created_on: NaiveDate::from_ymd_opt(2025, 4, 2).expect("valid date"),
        ..existing_posting()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryTemplates {
    pub(super) postings: Arc<Mutex<Vec<ExistingPosting>>>,
}

impl MemoryTemplates {
    pub(super) fn with(postings: Vec<ExistingPosting>) -> Self {
        Self {
            postings: Arc::new(Mutex::new(postings)),
        }
    }
}

impl TemplateRepository for MemoryTemplates {
    fn list(&self) -> Result<Vec<ExistingPosting>, TemplateRepositoryError> {
        Ok(self.postings.lock().expect("template mutex poisoned").clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<ExistingPosting>, TemplateRepositoryError> {
        let guard = self.postings.lock().expect("template mutex poisoned");
        Ok(guard.iter().find(|posting| posting.id == id).cloned())
    }
}

pub(super) struct OfflineTemplates;

impl TemplateRepository for OfflineTemplates {
    fn list(&self) -> Result<Vec<ExistingPosting>, TemplateRepositoryError> {
        Err(TemplateRepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn fetch(&self, _id: &str) -> Result<Option<ExistingPosting>, TemplateRepositoryError> {
        Err(TemplateRepositoryError::Unavailable("catalog offline".to_string()))
    }
}

/// Fails the first `failures` publish attempts, then accepts.
#[derive(Default)]
pub(super) struct FlakyPublisher {
    pub(super) failures: usize,
    attempts: AtomicUsize,
    published: Mutex<Vec<PostingSubmission>>,
}

impl FlakyPublisher {
    pub(super) fn failing(failures: usize) -> Self {
        Self {
            failures,
            ..Self::default()
        }
    }

    pub(super) fn published(&self) -> Vec<PostingSubmission> {
        self.published.lock().expect("publisher mutex poisoned").clone()
    }
}

impl PostingPublisher for FlakyPublisher {
    fn publish(&self, submission: &PostingSubmission) -> Result<PublishedPosting, PublishError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(PublishError::Unavailable("gateway timeout".to_string()));
        }
        self.published
            .lock()
            .expect("publisher mutex poisoned")
            .push(submission.clone());
        Ok(PublishedPosting {
            id: format!("annonce-{}", attempt + 1),
        })
    }
}

pub(super) fn instant_config() -> WizardConfig {
    WizardConfig {
        submit_delay: Duration::ZERO,
        ..WizardConfig::default()
    }
}

pub(super) fn build_service(
    failures: usize,
) -> (
    PostingWizardService<MemoryTemplates, FlakyPublisher>,
    Arc<FlakyPublisher>,
) {
    build_service_with(failures, instant_config())
}

pub(super) fn build_service_with(
    failures: usize,
    config: WizardConfig,
) -> (
    PostingWizardService<MemoryTemplates, FlakyPublisher>,
    Arc<FlakyPublisher>,
) {
    let templates = Arc::new(MemoryTemplates::with(vec![existing_posting(), other_posting()]));
    let publisher = Arc::new(FlakyPublisher::failing(failures));
    let service = PostingWizardService::new(templates, publisher.clone(), config);
    (service, publisher)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
