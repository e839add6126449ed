use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    AnnonceType, BaseInformation, JobTypeInformation, PostingDraft, Preferences,
    SalaryInformation,
};
use super::questions::{QuestionConversionError, SelectedQuestion, StoredQuestion};
use super::wizard::WizardStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    Active,
    Draft,
    Closed,
    Expired,
}

impl PostingStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Draft => "Draft",
            Self::Closed => "Closed",
            Self::Expired => "Expired",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "draft" => Some(Self::Draft),
            "closed" => Some(Self::Closed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// A previously created posting that can seed a new draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingPosting {
    pub id: String,
    pub title: String,
    pub city: String,
    pub status: PostingStatus,
    pub created_on: NaiveDate,
    pub base_information: BaseInformation,
    pub job_type_information: JobTypeInformation,
    pub salary_information: SalaryInformation,
    pub description: String,
    pub preferences: Preferences,
    #[serde(default)]
    pub questions: Vec<StoredQuestion>,
}

/// Inclusive bounds on `created_on`; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Criteria of the "use an existing posting" selection list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub statuses: Vec<PostingStatus>,
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub created: DateRange,
}

impl TemplateFilter {
    pub fn matches(&self, posting: &ExistingPosting) -> bool {
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                posting.title.to_lowercase().contains(&term)
                    || posting.city.to_lowercase().contains(&term)
            }
        };

        let status_ok = self.statuses.is_empty() || self.statuses.contains(&posting.status);
        let city_ok = self.cities.is_empty()
            || self
                .cities
                .iter()
                .any(|city| city.trim().eq_ignore_ascii_case(posting.city.trim()));

        search_ok && status_ok && city_ok && self.created.contains(posting.created_on)
    }
}

pub fn filter_templates<'a>(
    postings: &'a [ExistingPosting],
    filter: &TemplateFilter,
) -> Vec<&'a ExistingPosting> {
    postings.iter().filter(|posting| filter.matches(posting)).collect()
}

/// Distinct cities offered by the city multi-select, sorted.
pub fn available_cities(postings: &[ExistingPosting]) -> Vec<String> {
    let mut cities: Vec<String> = postings.iter().map(|posting| posting.city.clone()).collect();
    cities.sort_by_key(|city| city.to_lowercase());
    cities.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    cities
}

/// Source of existing postings for the duplicate flow.
pub trait TemplateRepository: Send + Sync {
    fn list(&self) -> Result<Vec<ExistingPosting>, TemplateRepositoryError>;
    fn fetch(&self, id: &str) -> Result<Option<ExistingPosting>, TemplateRepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateRepositoryError {
    #[error("template source unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DuplicationError {
    #[error("posting {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Question(#[from] QuestionConversionError),
    #[error(transparent)]
    Repository(#[from] TemplateRepositoryError),
}

/// Starts a blank draft.
pub fn start_new(store: &mut WizardStore) {
    store.reset();
    store.set_annonce_type(AnnonceType::New);
}

/// Builds the draft a duplicate of `posting` starts from.
pub fn draft_from_posting(posting: &ExistingPosting) -> Result<PostingDraft, DuplicationError> {
    let questions = posting
        .questions
        .iter()
        .map(SelectedQuestion::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PostingDraft {
        base_information: posting.base_information.clone(),
        job_type_information: posting.job_type_information.clone(),
        salary_information: posting.salary_information.clone(),
        description: posting.description.clone(),
        preferences: posting.preferences.clone(),
        questions,
    })
}

/// Resets the wizard and seeds every draft slice from `posting`.
///
/// The store is left untouched when a stored question cannot be converted.
pub fn duplicate_from(
    store: &mut WizardStore,
    posting: &ExistingPosting,
) -> Result<(), DuplicationError> {
    let draft = draft_from_posting(posting)?;

    store.reset();
    store.set_base_information(draft.base_information);
    store.set_job_type_information(draft.job_type_information);
    store.set_salary_information(draft.salary_information);
    store.set_description(draft.description);
    store.set_preferences(draft.preferences);
    store.set_questions(draft.questions);
    store.set_annonce_type(AnnonceType::Duplicate);
    Ok(())
}
