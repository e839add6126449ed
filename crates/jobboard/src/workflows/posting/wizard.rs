//! Step sequencer for the posting creation wizard.
//!
//! `dispatch` is the pure transition function; `WizardStore` owns one state and
//! exposes the setter/navigation operations the step forms call.

use serde::{Deserialize, Serialize};

use super::domain::{
    AnnonceType, BaseInformation, JobTypeInformation, PostingDraft, Preferences,
    SalaryInformation, WizardStep,
};
use super::questions::{format_questions, FormattedQuestion, SelectedQuestion};

/// Screen currently shown to the recruiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", content = "step", rename_all = "snake_case")]
pub enum WizardScreen {
    TypeSelection,
    Step(WizardStep),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardState {
    pub annonce_type: Option<AnnonceType>,
    pub current_step: WizardStep,
    pub draft: PostingDraft,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            annonce_type: None,
            current_step: WizardStep::first(),
            draft: PostingDraft::default(),
        }
    }
}

impl WizardState {
    pub fn screen(&self) -> WizardScreen {
        match self.annonce_type {
            None => WizardScreen::TypeSelection,
            Some(_) => WizardScreen::Step(self.current_step),
        }
    }

    pub fn current_step_index(&self) -> usize {
        self.current_step.index()
    }
}

/// Every way the wizard state can change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WizardEvent {
    SetAnnonceType(AnnonceType),
    SetBaseInformation(BaseInformation),
    SetJobTypeInformation(JobTypeInformation),
    SetSalaryInformation(SalaryInformation),
    SetDescription(String),
    SetPreferences(Preferences),
    SetQuestions(Vec<SelectedQuestion>),
    NextStep,
    PreviousStep,
    /// Moves straight to a step without consulting `can_proceed`.
    JumpToStep(WizardStep),
    Reset,
}

/// Pure transition: applies `event` to `state` and returns the new state.
pub fn dispatch(state: WizardState, event: WizardEvent) -> WizardState {
    let mut next = state;
    match event {
        WizardEvent::SetAnnonceType(annonce_type) => next.annonce_type = Some(annonce_type),
        WizardEvent::SetBaseInformation(data) => next.draft.base_information = data,
        WizardEvent::SetJobTypeInformation(data) => next.draft.job_type_information = data,
        WizardEvent::SetSalaryInformation(data) => next.draft.salary_information = data,
        WizardEvent::SetDescription(data) => next.draft.description = data,
        WizardEvent::SetPreferences(data) => next.draft.preferences = data,
        WizardEvent::SetQuestions(data) => next.draft.questions = data,
        WizardEvent::NextStep => {
            let index = (next.current_step.index() + 1).min(WizardStep::last().index());
            next.current_step = WizardStep::from_index(index).unwrap_or(WizardStep::last());
        }
        WizardEvent::PreviousStep => {
            let index = next.current_step.index().saturating_sub(1);
            next.current_step = WizardStep::from_index(index).unwrap_or(WizardStep::first());
        }
        WizardEvent::JumpToStep(step) => next.current_step = step,
        WizardEvent::Reset => next = WizardState::default(),
    }
    next
}

/// Lightweight gate used by the step navigation buttons.
pub fn can_proceed(state: &WizardState) -> bool {
    let draft = &state.draft;
    match state.current_step {
        WizardStep::JobInformation => {
            let base = &draft.base_information;
            !base.job_title.trim().is_empty()
                && !base.number_of_people.trim().is_empty()
                && !base.promotion_location.trim().is_empty()
                && !draft.job_type_information.contract_types.is_empty()
        }
        WizardStep::DescriptionAnnonce => !draft.description.trim().is_empty(),
        WizardStep::Preferences | WizardStep::Questions | WizardStep::Verification => true,
    }
}

/// Owner of a single wizard session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardStore {
    state: WizardState,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn draft(&self) -> &PostingDraft {
        &self.state.draft
    }

    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    pub fn annonce_type(&self) -> Option<AnnonceType> {
        self.state.annonce_type
    }

    pub fn screen(&self) -> WizardScreen {
        self.state.screen()
    }

    pub fn apply(&mut self, event: WizardEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = dispatch(state, event);
    }

    /// Sets the discriminator only; callers reset first when starting over.
    pub fn set_annonce_type(&mut self, annonce_type: AnnonceType) {
        self.apply(WizardEvent::SetAnnonceType(annonce_type));
    }

    pub fn set_base_information(&mut self, data: BaseInformation) {
        self.apply(WizardEvent::SetBaseInformation(data));
    }

    pub fn set_job_type_information(&mut self, data: JobTypeInformation) {
        self.apply(WizardEvent::SetJobTypeInformation(data));
    }

    pub fn set_salary_information(&mut self, data: SalaryInformation) {
        self.apply(WizardEvent::SetSalaryInformation(data));
    }

    pub fn set_description(&mut self, data: impl Into<String>) {
        self.apply(WizardEvent::SetDescription(data.into()));
    }

    pub fn set_preferences(&mut self, data: Preferences) {
        self.apply(WizardEvent::SetPreferences(data));
    }

    pub fn set_questions(&mut self, data: Vec<SelectedQuestion>) {
        self.apply(WizardEvent::SetQuestions(data));
    }

    pub fn next_step(&mut self) {
        self.apply(WizardEvent::NextStep);
    }

    pub fn previous_step(&mut self) {
        self.apply(WizardEvent::PreviousStep);
    }

    /// Moves the pointer directly. Validation of the skipped steps is not consulted,
    /// so the draft may be valid up to a later step while an earlier one is edited.
    pub fn jump_to_step(&mut self, step: WizardStep) {
        self.apply(WizardEvent::JumpToStep(step));
    }

    pub fn can_proceed(&self) -> bool {
        can_proceed(&self.state)
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index()
    }

    pub fn reset(&mut self) {
        self.apply(WizardEvent::Reset);
    }

    pub fn formatted_questions(&self) -> Vec<FormattedQuestion> {
        format_questions(&self.state.draft.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::posting::domain::ContractType;
    use crate::workflows::posting::questions::QuestionKind;

    fn filled_store() -> WizardStore {
        let mut store = WizardStore::new();
        store.set_annonce_type(AnnonceType::New);
        store.set_base_information(BaseInformation {
            job_title: "Data analyst".to_string(),
            number_of_people: "1".to_string(),
            promotion_location: "Rabat".to_string(),
        });
        let mut job_type = JobTypeInformation::default();
        job_type.contract_types.insert(ContractType::FullTime);
        store.set_job_type_information(job_type);
        store
    }

    #[test]
    fn next_step_clamps_at_last_step() {
        for repeats in 0..10 {
            let mut store = WizardStore::new();
            for _ in 0..repeats {
                store.next_step();
            }
            let expected = repeats.min(WizardStep::last().index());
            assert_eq!(store.current_step_index(), expected);
        }
    }

    #[test]
    fn previous_step_clamps_at_first_step() {
        let mut store = WizardStore::new();
        store.previous_step();
        assert_eq!(store.current_step(), WizardStep::JobInformation);

        store.next_step();
        store.next_step();
        store.previous_step();
        assert_eq!(store.current_step(), WizardStep::DescriptionAnnonce);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut store = filled_store();
        store.set_description("<p>Some text</p>");
        store.set_questions(vec![SelectedQuestion::custom(
            "c-1",
            "Why us?",
            QuestionKind::Open,
        )]);
        store.next_step();
        store.next_step();

        store.reset();
        assert_eq!(store, WizardStore::new());
        assert_eq!(store.screen(), WizardScreen::TypeSelection);
    }

    #[test]
    fn job_information_gate_requires_every_field() {
        let store = filled_store();
        assert!(store.can_proceed());

        let mut missing_location = store.clone();
        missing_location.set_base_information(BaseInformation {
            promotion_location: "   ".to_string(),
            ..store.draft().base_information.clone()
        });
        assert!(!missing_location.can_proceed());

        let mut no_contract = store.clone();
        no_contract.set_job_type_information(JobTypeInformation::default());
        assert!(!no_contract.can_proceed());
    }

    #[test]
    fn description_gate_rejects_blank_text() {
        let mut store = filled_store();
        store.next_step();
        assert!(!store.can_proceed());
        store.set_description("   ");
        assert!(!store.can_proceed());
        store.set_description("<p>Hello</p>");
        assert!(store.can_proceed());
    }

    #[test]
    fn other_steps_are_permissive() {
        let mut store = WizardStore::new();
        store.jump_to_step(WizardStep::Preferences);
        assert!(store.can_proceed());
        store.jump_to_step(WizardStep::Questions);
        assert!(store.can_proceed());
    }

    #[test]
    fn jump_is_a_single_transition() {
        let state = WizardState {
            annonce_type: Some(AnnonceType::New),
            current_step: WizardStep::Verification,
            draft: PostingDraft::default(),
        };

        let next = dispatch(state, WizardEvent::JumpToStep(WizardStep::Preferences));
        assert_eq!(next.current_step, WizardStep::Preferences);
        assert_eq!(next.screen(), WizardScreen::Step(WizardStep::Preferences));
    }

    #[test]
    fn setters_overwrite_whole_slices() {
        let mut store = filled_store();
        store.set_base_information(BaseInformation {
            job_title: "Designer".to_string(),
            ..BaseInformation::default()
        });
        assert_eq!(store.draft().base_information.promotion_location, "");
        assert_eq!(store.annonce_type(), Some(AnnonceType::New));
    }

    #[test]
    fn events_round_trip_through_json() {
        let event: WizardEvent = serde_json::from_str(
            r#"{"event":"jump_to_step","data":"preferences"}"#,
        )
        .expect("parses");
        assert_eq!(event, WizardEvent::JumpToStep(WizardStep::Preferences));

        let reset: WizardEvent = serde_json::from_str(r#"{"event":"reset"}"#).expect("parses");
        assert_eq!(reset, WizardEvent::Reset);
    }
}
