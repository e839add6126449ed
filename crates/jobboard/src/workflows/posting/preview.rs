use serde::{Deserialize, Serialize};

use super::domain::{plain_text, AnnonceType, PostingDraft, SalaryDisplayType, WizardStep};
use super::questions::{QuestionKind, SelectedQuestion};
use super::wizard::WizardStore;

/// Sections of the verification screen, each editable through its own step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewSection {
    JobInformation,
    Description,
    Preferences,
    Questions,
}

impl PreviewSection {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::JobInformation,
            Self::Description,
            Self::Preferences,
            Self::Questions,
        ]
    }

    pub const fn edit_step(self) -> WizardStep {
        match self {
            Self::JobInformation => WizardStep::JobInformation,
            Self::Description => WizardStep::DescriptionAnnonce,
            Self::Preferences => WizardStep::Preferences,
            Self::Questions => WizardStep::Questions,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::JobInformation => "Job information",
            Self::Description => "Job description",
            Self::Preferences => "Application preferences",
            Self::Questions => "Screening questions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSectionView {
    pub section: PreviewSection,
    pub title: &'static str,
    pub edit_step: WizardStep,
    pub entries: Vec<PreviewEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftPreview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annonce_type: Option<AnnonceType>,
    pub sections: Vec<PreviewSectionView>,
}

impl DraftPreview {
    pub fn section(&self, section: PreviewSection) -> Option<&PreviewSectionView> {
        self.sections.iter().find(|view| view.section == section)
    }
}

pub fn render_preview(store: &WizardStore) -> DraftPreview {
    let draft = store.draft();
    let sections = PreviewSection::ordered()
        .into_iter()
        .map(|section| PreviewSectionView {
            section,
            title: section.label(),
            edit_step: section.edit_step(),
            entries: section_entries(section, draft),
        })
        .collect();

    DraftPreview {
        annonce_type: store.annonce_type(),
        sections,
    }
}

/// Edit affordance of a preview section: one direct jump, no gating.
pub fn edit_section(store: &mut WizardStore, section: PreviewSection) {
    store.jump_to_step(section.edit_step());
}

fn entry(label: &str, value: impl Into<String>) -> PreviewEntry {
    PreviewEntry {
        label: label.to_string(),
        value: value.into(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn section_entries(section: PreviewSection, draft: &PostingDraft) -> Vec<PreviewEntry> {
    match section {
        PreviewSection::JobInformation => job_information_entries(draft),
        PreviewSection::Description => vec![entry("Description", plain_text(&draft.description))],
        PreviewSection::Preferences => {
            let preferences = &draft.preferences;
            let emails = if preferences.notification_emails.is_empty() {
                "None".to_string()
            } else {
                preferences.notification_emails.join(", ")
            };
            vec![
                entry("Notification emails", emails),
                entry("Resume required", yes_no(preferences.require_resume)),
                entry(
                    "Candidates may contact you",
                    yes_no(preferences.allow_candidate_contact),
                ),
                entry(
                    "Notify on each application",
                    yes_no(preferences.notify_on_application),
                ),
                entry(
                    "Deadline",
                    preferences
                        .deadline
                        .map(|date| date.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "None".to_string()),
                ),
            ]
        }
        PreviewSection::Questions => draft.questions.iter().map(question_entry).collect(),
    }
}

fn job_information_entries(draft: &PostingDraft) -> Vec<PreviewEntry> {
    let base = &draft.base_information;
    let job_type = &draft.job_type_information;

    let contracts = job_type
        .contract_types
        .iter()
        .map(|contract| contract.label())
        .collect::<Vec<_>>()
        .join(", ");

    let mut entries = vec![
        entry("Job title", base.job_title.trim()),
        entry("Number of people", base.number_of_people.trim()),
        entry("Promotion location", base.promotion_location.trim()),
        entry("Contract types", contracts),
    ];

    if let Some(part_time) = &job_type.part_time {
        let mut value = format!("{} hours per week", part_time.hours_per_week);
        if let Some(schedule) = part_time.schedule.as_deref().filter(|s| !s.trim().is_empty()) {
            value.push_str(&format!(" ({})", schedule.trim()));
        }
        entries.push(entry("Part-time schedule", value));
    }

    for (label, duration) in [
        ("Interim duration", job_type.interim_duration),
        ("Fixed-term duration", job_type.fixed_term_duration),
        ("Internship duration", job_type.internship_duration),
    ] {
        if let Some(duration) = duration {
            entries.push(entry(label, duration.describe()));
        }
    }

    let salary = &draft.salary_information;
    let salary_label = match salary.display_type {
        SalaryDisplayType::Range => "Salary range",
        SalaryDisplayType::Fixed => "Fixed salary",
        SalaryDisplayType::Negotiable => "Salary",
    };
    entries.push(entry(salary_label, salary.describe()));
    entries
}

fn question_entry(selected: &SelectedQuestion) -> PreviewEntry {
    let mut value = selected.question_type().label().to_string();
    if let QuestionKind::Choice {
        options,
        is_multiple_choices,
    } = &selected.kind
    {
        let mode = if *is_multiple_choices {
            "several answers"
        } else {
            "one answer"
        };
        value = format!("{value} ({mode}): {}", options.join(" / "));
    }
    if selected.is_required {
        value.push_str(" - required");
    }

    PreviewEntry {
        label: selected.display_text().to_string(),
        value,
    }
}
