use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use jobboard::workflows::posting::{
    BaseInformation, ContractDuration, ContractType, DurationUnit, ExistingPosting,
    JobTypeInformation, PartTimeDetails, PostingStatus, Preferences, SalaryDisplayType,
    SalaryFrequency, SalaryInformation, StoredQuestion, TemplateRepository,
    TemplateRepositoryError,
};
use jobboard::workflows::search::JobListing;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Posting catalog served to the duplicate flow; seeded at start-up.
#[derive(Clone)]
pub(crate) struct InMemoryTemplateRepository {
    postings: Arc<RwLock<Vec<ExistingPosting>>>,
}

impl InMemoryTemplateRepository {
    pub(crate) fn seeded() -> Self {
        Self::with_postings(sample_postings())
    }

    pub(crate) fn with_postings(postings: Vec<ExistingPosting>) -> Self {
        Self {
            postings: Arc::new(RwLock::new(postings)),
        }
    }
}

impl TemplateRepository for InMemoryTemplateRepository {
    fn list(&self) -> Result<Vec<ExistingPosting>, TemplateRepositoryError> {
        let guard = self.postings.read().expect("template lock poisoned");
        Ok(guard.clone())
    }

    fn fetch(&self, id: &str) -> Result<Option<ExistingPosting>, TemplateRepositoryError> {
        let guard = self.postings.read().expect("template lock poisoned");
        Ok(guard.iter().find(|posting| posting.id == id).cloned())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("sample dates are valid")
}

fn stored(id: &str, question: &str, question_type: &str, predefined: bool) -> StoredQuestion {
    StoredQuestion {
        id: id.to_string(),
        question: question.to_string(),
        question_type: question_type.to_string(),
        is_required: false,
        predefined,
        answer: None,
        options: None,
        is_multiple_choices: None,
    }
}

pub(crate) fn sample_postings() -> Vec<ExistingPosting> {
    let backend = ExistingPosting {
        id: "posting-1001".to_string(),
        title: "Backend engineer (Rust)".to_string(),
        city: "Casablanca".to_string(),
        status: PostingStatus::Closed,
        created_on: date(2025, 3, 10),
        base_information: BaseInformation {
            job_title: "Backend engineer (Rust)".to_string(),
            number_of_people: "2".to_string(),
            promotion_location: "Casablanca".to_string(),
        },
        job_type_information: JobTypeInformation {
            contract_types: BTreeSet::from([ContractType::FullTime]),
            ..JobTypeInformation::default()
        },
        salary_information: SalaryInformation {
            display_type: SalaryDisplayType::Range,
            min_salary: Some(20000),
            max_salary: Some(28000),
            frequency: SalaryFrequency::Monthly,
        },
        description: "<p>We are hiring engineers to build the <strong>matching engine</strong> \
                      behind our job board, with ownership of APIs and data pipelines.</p>"
            .to_string(),
        preferences: Preferences {
            notification_emails: vec!["hiring@jobboard.example".to_string()],
            require_resume: true,
            allow_candidate_contact: true,
            notify_on_application: true,
            deadline: None,
        },
        questions: vec![
            StoredQuestion {
                is_required: true,
                options: Some(vec![
                    "Immediately".to_string(),
                    "Within one month".to_string(),
                    "Within three months".to_string(),
                ]),
                is_multiple_choices: Some(false),
                ..stored("pq-availability", "When can you start?", "choice", true)
            },
            StoredQuestion {
                answer: Some("Rust in production".to_string()),
                ..stored("q-501", "Experience", "experience", false)
            },
            stored("q-502", "Have you contributed to open source?", "yesno", false),
        ],
    };

    let support = ExistingPosting {
        id: "posting-1002".to_string(),
        title: "Customer support agent".to_string(),
        city: "Rabat".to_string(),
        status: PostingStatus::Active,
        created_on: date(2025, 5, 2),
        base_information: BaseInformation {
            job_title: "Customer support agent".to_string(),
            number_of_people: "4".to_string(),
            promotion_location: "Rabat".to_string(),
        },
        job_type_information: JobTypeInformation {
            contract_types: BTreeSet::from([ContractType::PartTime, ContractType::Interim]),
            part_time: Some(PartTimeDetails {
                hours_per_week: 24,
                schedule: Some("Mornings".to_string()),
            }),
            interim_duration: Some(ContractDuration {
                value: 6,
                unit: DurationUnit::Months,
            }),
            ..JobTypeInformation::default()
        },
        salary_information: SalaryInformation {
            display_type: SalaryDisplayType::Fixed,
            min_salary: Some(6500),
            max_salary: None,
            frequency: SalaryFrequency::Monthly,
        },
        description: "<p>Help candidates and recruiters get the most out of the platform by \
                      answering chat and phone requests.</p>"
            .to_string(),
        preferences: Preferences {
            notification_emails: vec!["support-lead@jobboard.example".to_string()],
            require_resume: false,
            allow_candidate_contact: false,
            notify_on_application: true,
            deadline: None,
        },
        questions: vec![stored(
            "pq-motivation",
            "Why do you want to join us?",
            "open",
            true,
        )],
    };

    let intern = ExistingPosting {
        id: "posting-1003".to_string(),
        title: "Data analyst intern".to_string(),
        city: "Tangier".to_string(),
        status: PostingStatus::Expired,
        created_on: date(2024, 11, 18),
        base_information: BaseInformation {
            job_title: "Data analyst intern".to_string(),
            number_of_people: "1".to_string(),
            promotion_location: "Tangier".to_string(),
        },
        job_type_information: JobTypeInformation {
            contract_types: BTreeSet::from([ContractType::Internship]),
            internship_duration: Some(ContractDuration {
                value: 4,
                unit: DurationUnit::Months,
            }),
            ..JobTypeInformation::default()
        },
        salary_information: SalaryInformation {
            display_type: SalaryDisplayType::Negotiable,
            ..SalaryInformation::default()
        },
        description: "<p>Join the analytics team for a four month internship covering \
                      dashboards, SQL, and experiment analysis.</p>"
            .to_string(),
        preferences: Preferences::default(),
        questions: Vec::new(),
    };

    vec![backend, support, intern]
}

pub(crate) fn sample_job_listings() -> Vec<JobListing> {
    let listing = |id: &str, title: &str, company: &str, city: &str, contract, posted_on| JobListing {
        id: id.to_string(),
        title: title.to_string(),
        company: company.to_string(),
        city: city.to_string(),
        contract_types: BTreeSet::from([contract]),
        posted_on,
    };

    vec![
        listing(
            "job-201",
            "Rust developer",
            "Atlas Fintech",
            "Casablanca",
            ContractType::FullTime,
            date(2025, 5, 28),
        ),
        listing(
            "job-202",
            "Frontend developer",
            "Medina Labs",
            "Rabat",
            ContractType::Freelance,
            date(2025, 5, 20),
        ),
        listing(
            "job-203",
            "Developer apprentice",
            "Atlas Fintech",
            "Casablanca",
            ContractType::Apprenticeship,
            date(2025, 5, 14),
        ),
        listing(
            "job-204",
            "Warehouse operator",
            "Nord Logistics",
            "Tangier",
            ContractType::Interim,
            date(2025, 4, 30),
        ),
        listing(
            "job-205",
            "Payroll accountant",
            "Medina Labs",
            "Casablanca",
            ContractType::FixedTerm,
            date(2025, 4, 12),
        ),
    ]
}
