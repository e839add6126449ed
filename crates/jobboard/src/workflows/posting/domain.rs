use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::questions::SelectedQuestion;

/// Ordered wizard steps. The pointer held by the wizard is always one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    JobInformation,
    DescriptionAnnonce,
    Preferences,
    Questions,
    Verification,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::JobInformation,
            Self::DescriptionAnnonce,
            Self::Preferences,
            Self::Questions,
            Self::Verification,
        ]
    }

    pub const fn first() -> Self {
        Self::JobInformation
    }

    pub const fn last() -> Self {
        Self::Verification
    }

    pub const fn index(self) -> usize {
        match self {
            Self::JobInformation => 0,
            Self::DescriptionAnnonce => 1,
            Self::Preferences => 2,
            Self::Questions => 3,
            Self::Verification => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ordered().get(index).copied()
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::JobInformation => "job-information",
            Self::DescriptionAnnonce => "description-annonce",
            Self::Preferences => "preferences",
            Self::Questions => "questions",
            Self::Verification => "verification",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::JobInformation => "Job information",
            Self::DescriptionAnnonce => "Description",
            Self::Preferences => "Preferences",
            Self::Questions => "Screening questions",
            Self::Verification => "Verification",
        }
    }
}

/// How the draft was started. `None` on the wizard means the type-selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnonceType {
    New,
    Duplicate,
}

impl AnnonceType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New posting",
            Self::Duplicate => "Duplicated posting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    FullTime,
    PartTime,
    FixedTerm,
    Interim,
    Internship,
    Freelance,
    Apprenticeship,
}

impl ContractType {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::FullTime,
            Self::PartTime,
            Self::FixedTerm,
            Self::Interim,
            Self::Internship,
            Self::Freelance,
            Self::Apprenticeship,
        ]
    }

    pub const fn id(self) -> &'static str {
        match self {
            Self::FullTime => "full_time",
            Self::PartTime => "part_time",
            Self::FixedTerm => "fixed_term",
            Self::Interim => "interim",
            Self::Internship => "internship",
            Self::Freelance => "freelance",
            Self::Apprenticeship => "apprenticeship",
        }
    }

    /// Accepts the wire id, with `-` tolerated in place of `_`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ordered()
            .into_iter()
            .find(|contract| contract.id() == normalized)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullTime => "Full-time (CDI)",
            Self::PartTime => "Part-time",
            Self::FixedTerm => "Fixed-term (CDD)",
            Self::Interim => "Interim",
            Self::Internship => "Internship",
            Self::Freelance => "Freelance",
            Self::Apprenticeship => "Apprenticeship",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Days,
    Weeks,
    Months,
}

impl DurationUnit {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDuration {
    pub value: u16,
    pub unit: DurationUnit,
}

impl ContractDuration {
    pub fn describe(&self) -> String {
        format!("{} {}", self.value, self.unit.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartTimeDetails {
    pub hours_per_week: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseInformation {
    pub job_title: String,
    pub number_of_people: String,
    pub promotion_location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTypeInformation {
    #[serde(default)]
    pub contract_types: BTreeSet<ContractType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_time: Option<PartTimeDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interim_duration: Option<ContractDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_term_duration: Option<ContractDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internship_duration: Option<ContractDuration>,
}

impl JobTypeInformation {
    pub fn includes(&self, contract: ContractType) -> bool {
        self.contract_types.contains(&contract)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryDisplayType {
    #[default]
    Range,
    Fixed,
    Negotiable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryFrequency {
    Hourly,
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl SalaryFrequency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hourly => "per hour",
            Self::Daily => "per day",
            Self::Weekly => "per week",
            Self::Monthly => "per month",
            Self::Yearly => "per year",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryInformation {
    pub display_type: SalaryDisplayType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_salary: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_salary: Option<u32>,
    pub frequency: SalaryFrequency,
}

impl SalaryInformation {
    pub fn describe(&self) -> String {
        match (self.display_type, self.min_salary, self.max_salary) {
            (SalaryDisplayType::Negotiable, _, _) => "Negotiable".to_string(),
            (SalaryDisplayType::Range, Some(min), Some(max)) => {
                format!("{min} - {max} {}", self.frequency.label())
            }
            (SalaryDisplayType::Fixed, Some(amount), _) => {
                format!("{amount} {}", self.frequency.label())
            }
            _ => "Not specified".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub notification_emails: Vec<String>,
    #[serde(default)]
    pub require_resume: bool,
    #[serde(default)]
    pub allow_candidate_contact: bool,
    #[serde(default)]
    pub notify_on_application: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
}

/// The in-progress posting authored through the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingDraft {
    pub base_information: BaseInformation,
    pub job_type_information: JobTypeInformation,
    pub salary_information: SalaryInformation,
    pub description: String,
    pub preferences: Preferences,
    pub questions: Vec<SelectedQuestion>,
}

/// Strips markup from the rich-text description and collapses whitespace.
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        // last, so an escaped entity such as `&amp;lt;` stays literal
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
