use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{plain_text, ContractType, PostingDraft, SalaryDisplayType, WizardStep};
use super::questions::QuestionKind;

pub const MIN_TITLE_LENGTH: usize = 3;
pub const MIN_DESCRIPTION_LENGTH: usize = 50;
pub const MAX_PART_TIME_HOURS: u8 = 35;
pub const MIN_CHOICE_OPTIONS: usize = 2;

/// Inline error attached to a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Runs the form validation owned by `step`. Verification re-checks every step.
pub fn validate_step(step: WizardStep, draft: &PostingDraft, today: NaiveDate) -> Vec<FieldError> {
    match step {
        WizardStep::JobInformation => validate_job_information(draft),
        WizardStep::DescriptionAnnonce => validate_description(draft),
        WizardStep::Preferences => validate_preferences(draft, today),
        WizardStep::Questions => validate_questions(draft),
        WizardStep::Verification => {
            let mut errors = validate_job_information(draft);
            errors.extend(validate_description(draft));
            errors.extend(validate_preferences(draft, today));
            errors.extend(validate_questions(draft));
            errors
        }
    }
}

pub fn validate_job_information(draft: &PostingDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let base = &draft.base_information;

    if base.job_title.trim().chars().count() < MIN_TITLE_LENGTH {
        errors.push(FieldError::new(
            "base_information.job_title",
            format!("job title must be at least {MIN_TITLE_LENGTH} characters"),
        ));
    }

    match base.number_of_people.trim().parse::<u32>() {
        Ok(count) if count > 0 => {}
        _ => errors.push(FieldError::new(
            "base_information.number_of_people",
            "number of people must be a positive whole number",
        )),
    }

    if base.promotion_location.trim().is_empty() {
        errors.push(FieldError::new(
            "base_information.promotion_location",
            "promotion location is required",
        ));
    }

    let job_type = &draft.job_type_information;
    if job_type.contract_types.is_empty() {
        errors.push(FieldError::new(
            "job_type_information.contract_types",
            "select at least one contract type",
        ));
    }

    if job_type.includes(ContractType::PartTime) {
        match &job_type.part_time {
            Some(details) if (1..=MAX_PART_TIME_HOURS).contains(&details.hours_per_week) => {}
            _ => errors.push(FieldError::new(
                "job_type_information.part_time.hours_per_week",
                format!("part-time hours must be between 1 and {MAX_PART_TIME_HOURS}"),
            )),
        }
    }

    let durations = [
        (
            ContractType::Interim,
            job_type.interim_duration,
            "job_type_information.interim_duration",
        ),
        (
            ContractType::FixedTerm,
            job_type.fixed_term_duration,
            "job_type_information.fixed_term_duration",
        ),
        (
            ContractType::Internship,
            job_type.internship_duration,
            "job_type_information.internship_duration",
        ),
    ];
    for (contract, duration, field) in durations {
        if !job_type.includes(contract) {
            continue;
        }
        match duration {
            Some(duration) if duration.value > 0 => {}
            _ => errors.push(FieldError::new(
                field,
                format!("{} contracts need a duration", contract.label()),
            )),
        }
    }

    errors.extend(validate_salary(draft));
    errors
}

fn validate_salary(draft: &PostingDraft) -> Vec<FieldError> {
    let salary = &draft.salary_information;
    let mut errors = Vec::new();

    for (amount, field) in [
        (salary.min_salary, "salary_information.min_salary"),
        (salary.max_salary, "salary_information.max_salary"),
    ] {
        if amount == Some(0) {
            errors.push(FieldError::new(field, "salary must be a positive amount"));
        }
    }

    match salary.display_type {
        SalaryDisplayType::Negotiable => {}
        SalaryDisplayType::Fixed => {
            if salary.min_salary.is_none() {
                errors.push(FieldError::new(
                    "salary_information.min_salary",
                    "a fixed salary needs an amount",
                ));
            }
        }
        SalaryDisplayType::Range => match (salary.min_salary, salary.max_salary) {
            (Some(min), Some(max)) if max > min => {}
            (Some(_), Some(_)) => errors.push(FieldError::new(
                "salary_information.max_salary",
                "maximum salary must be greater than minimum salary",
            )),
            _ => errors.push(FieldError::new(
                "salary_information",
                "a salary range needs both a minimum and a maximum",
            )),
        },
    }

    errors
}

pub fn validate_description(draft: &PostingDraft) -> Vec<FieldError> {
    let length = plain_text(&draft.description).chars().count();
    if length < MIN_DESCRIPTION_LENGTH {
        return vec![FieldError::new(
            "description",
            format!("description must contain at least {MIN_DESCRIPTION_LENGTH} characters of text"),
        )];
    }
    Vec::new()
}

pub fn validate_preferences(draft: &PostingDraft, today: NaiveDate) -> Vec<FieldError> {
    let preferences = &draft.preferences;
    let mut errors = Vec::new();

    for (position, email) in preferences.notification_emails.iter().enumerate() {
        if !is_valid_email(email) {
            errors.push(FieldError::new(
                format!("preferences.notification_emails[{position}]"),
                format!("'{}' is not a valid email address", email.trim()),
            ));
        }
    }

    if preferences.notify_on_application && preferences.notification_emails.is_empty() {
        errors.push(FieldError::new(
            "preferences.notification_emails",
            "add at least one email to receive application notifications",
        ));
    }

    if let Some(deadline) = preferences.deadline {
        if deadline < today {
            errors.push(FieldError::new(
                "preferences.deadline",
                "deadline cannot be in the past",
            ));
        }
    }

    errors
}

pub fn validate_questions(draft: &PostingDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (position, selected) in draft.questions.iter().enumerate() {
        let prefix = format!("questions[{position}]");
        match &selected.kind {
            QuestionKind::Experience { answer } => {
                if answer.trim().is_empty() {
                    errors.push(FieldError::new(
                        format!("{prefix}.answer"),
                        "experience questions need a skill or field",
                    ));
                }
            }
            QuestionKind::Choice { options, .. } => {
                if selected.question.trim().is_empty() {
                    errors.push(FieldError::new(
                        format!("{prefix}.question"),
                        "question text is required",
                    ));
                }
                let filled = options.iter().filter(|option| !option.trim().is_empty()).count();
                if filled < MIN_CHOICE_OPTIONS || filled != options.len() {
                    errors.push(FieldError::new(
                        format!("{prefix}.options"),
                        format!("choice questions need at least {MIN_CHOICE_OPTIONS} non-empty options"),
                    ));
                }
            }
            QuestionKind::Open | QuestionKind::YesNo => {
                if selected.question.trim().is_empty() {
                    errors.push(FieldError::new(
                        format!("{prefix}.question"),
                        "question text is required",
                    ));
                }
            }
        }
    }

    errors
}

pub fn is_valid_email(raw: &str) -> bool {
    let email = raw.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}
