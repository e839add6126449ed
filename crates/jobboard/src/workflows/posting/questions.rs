use serde::{Deserialize, Serialize};

/// Kind tag shared by selected, stored, and formatted questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Experience,
    Open,
    Choice,
    #[serde(rename = "yesno")]
    YesNo,
}

impl QuestionType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Experience => "Experience",
            Self::Open => "Open answer",
            Self::Choice => "Multiple choice",
            Self::YesNo => "Yes / No",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "experience" => Some(Self::Experience),
            "open" => Some(Self::Open),
            "choice" => Some(Self::Choice),
            "yesno" | "yes_no" => Some(Self::YesNo),
            _ => None,
        }
    }
}

/// Per-kind payload. Options only exist on the choice variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// The recruiter types the skill or domain into the answer field.
    Experience { answer: String },
    Open,
    #[serde(rename = "yesno")]
    YesNo,
    Choice {
        options: Vec<String>,
        is_multiple_choices: bool,
    },
}

impl QuestionKind {
    pub const fn question_type(&self) -> QuestionType {
        match self {
            Self::Experience { .. } => QuestionType::Experience,
            Self::Open => QuestionType::Open,
            Self::YesNo => QuestionType::YesNo,
            Self::Choice { .. } => QuestionType::Choice,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOrigin {
    Predefined,
    Custom,
}

/// A screening question attached to the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedQuestion {
    pub id: String,
    pub question: String,
    pub is_required: bool,
    pub origin: QuestionOrigin,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl SelectedQuestion {
    pub fn from_predefined(entry: &PredefinedQuestion) -> Self {
        let kind = match entry.question_type {
            QuestionType::Experience => QuestionKind::Experience {
                answer: String::new(),
            },
            QuestionType::Open => QuestionKind::Open,
            QuestionType::YesNo => QuestionKind::YesNo,
            QuestionType::Choice => QuestionKind::Choice {
                options: entry
                    .default_options
                    .iter()
                    .map(|option| option.to_string())
                    .collect(),
                is_multiple_choices: false,
            },
        };

        Self {
            id: entry.id.to_string(),
            question: entry.question.to_string(),
            is_required: false,
            origin: QuestionOrigin::Predefined,
            kind,
        }
    }

    pub fn custom(id: impl Into<String>, question: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            is_required: false,
            origin: QuestionOrigin::Custom,
            kind,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Text shown to candidates; experience questions read from the answer field.
    pub fn display_text(&self) -> &str {
        match &self.kind {
            QuestionKind::Experience { answer } if !answer.trim().is_empty() => answer.trim(),
            _ => self.question.as_str(),
        }
    }
}

/// Entry of the fixed question catalog offered to recruiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PredefinedQuestion {
    pub id: &'static str,
    pub question: &'static str,
    pub question_type: QuestionType,
    pub default_options: &'static [&'static str],
}

pub fn predefined_catalog() -> &'static [PredefinedQuestion] {
    const CATALOG: &[PredefinedQuestion] = &[
        PredefinedQuestion {
            id: "pq-experience",
            question: "How many years of experience do you have in this field?",
            question_type: QuestionType::Experience,
            default_options: &[],
        },
        PredefinedQuestion {
            id: "pq-driving-licence",
            question: "Do you hold a valid driving licence?",
            question_type: QuestionType::YesNo,
            default_options: &[],
        },
        PredefinedQuestion {
            id: "pq-availability",
            question: "When can you start?",
            question_type: QuestionType::Choice,
            default_options: &["Immediately", "Within one month", "Within three months"],
        },
        PredefinedQuestion {
            id: "pq-education",
            question: "What is your highest level of education?",
            question_type: QuestionType::Choice,
            default_options: &["Baccalaureate", "Bac+2", "Bac+3", "Bac+5", "Doctorate"],
        },
        PredefinedQuestion {
            id: "pq-relocation",
            question: "Are you willing to relocate?",
            question_type: QuestionType::YesNo,
            default_options: &[],
        },
        PredefinedQuestion {
            id: "pq-motivation",
            question: "Why are you interested in this position?",
            question_type: QuestionType::Open,
            default_options: &[],
        },
    ];

    CATALOG
}

pub fn find_predefined(id: &str) -> Option<&'static PredefinedQuestion> {
    predefined_catalog().iter().find(|entry| entry.id == id)
}

/// Submission-ready representation of a selected question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FormattedQuestion {
    Predefined {
        question_id: String,
        is_required: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_multiple_choices: Option<bool>,
    },
    Custom {
        #[serde(rename = "type")]
        question_type: QuestionType,
        question: String,
        is_required: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_multiple_choices: Option<bool>,
    },
}

pub fn format_questions(questions: &[SelectedQuestion]) -> Vec<FormattedQuestion> {
    questions.iter().map(format_question).collect()
}

fn format_question(selected: &SelectedQuestion) -> FormattedQuestion {
    let (options, is_multiple_choices) = match &selected.kind {
        QuestionKind::Choice {
            options,
            is_multiple_choices,
        } => (Some(options.clone()), Some(*is_multiple_choices)),
        QuestionKind::Experience { .. } | QuestionKind::Open | QuestionKind::YesNo => (None, None),
    };

    match (&selected.kind, selected.origin) {
        // Experience questions are free text even when picked from the catalog.
        (QuestionKind::Experience { answer }, _) => FormattedQuestion::Custom {
            question_type: QuestionType::Experience,
            question: answer.trim().to_string(),
            is_required: selected.is_required,
            options: None,
            is_multiple_choices: None,
        },
        (_, QuestionOrigin::Predefined) => FormattedQuestion::Predefined {
            question_id: selected.id.clone(),
            is_required: selected.is_required,
            options,
            is_multiple_choices,
        },
        (kind, QuestionOrigin::Custom) => FormattedQuestion::Custom {
            question_type: kind.question_type(),
            question: selected.question.trim().to_string(),
            is_required: selected.is_required,
            options,
            is_multiple_choices,
        },
    }
}

/// Question as stored on an existing posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub predefined: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_multiple_choices: Option<bool>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuestionConversionError {
    #[error("question {id} has unknown type '{question_type}'")]
    UnknownType { id: String, question_type: String },
}

impl TryFrom<&StoredQuestion> for SelectedQuestion {
    type Error = QuestionConversionError;

    fn try_from(stored: &StoredQuestion) -> Result<Self, Self::Error> {
        let question_type = QuestionType::parse(&stored.question_type).ok_or_else(|| {
            QuestionConversionError::UnknownType {
                id: stored.id.clone(),
                question_type: stored.question_type.clone(),
            }
        })?;

        let kind = match question_type {
            QuestionType::Experience => QuestionKind::Experience {
                answer: stored.answer.clone().unwrap_or_default(),
            },
            QuestionType::Open => QuestionKind::Open,
            QuestionType::YesNo => QuestionKind::YesNo,
            QuestionType::Choice => QuestionKind::Choice {
                options: stored.options.clone().unwrap_or_default(),
                is_multiple_choices: stored.is_multiple_choices.unwrap_or(false),
            },
        };

        let origin = if stored.predefined {
            QuestionOrigin::Predefined
        } else {
            QuestionOrigin::Custom
        };

        Ok(Self {
            id: stored.id.clone(),
            question: stored.question.clone(),
            is_required: stored.is_required,
            origin,
            kind,
        })
    }
}
