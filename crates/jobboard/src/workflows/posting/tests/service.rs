use super::common::*;
use crate::workflows::posting::domain::{AnnonceType, BaseInformation, WizardStep};
use crate::workflows::posting::duplication::{
    self, DuplicationError, PostingStatus, TemplateFilter, TemplateRepository,
};
use crate::workflows::posting::preview::PreviewSection;
use crate::workflows::posting::questions::{QuestionKind, QuestionOrigin, QuestionType, StoredQuestion};
use crate::workflows::posting::service::{
    PostingWizardService, SessionId, WizardConfig, WizardServiceError,
};
use crate::workflows::posting::submission::{PostingPublisher, SimulatedPublisher};
use crate::workflows::posting::wizard::{WizardEvent, WizardScreen, WizardStore};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn duplicating_copies_every_slice_and_converts_questions() {
    let posting = existing_posting();
    let mut store = WizardStore::new();
    store.set_base_information(BaseInformation {
        job_title: "Leftover".to_string(),
        ..BaseInformation::default()
    });
    store.jump_to_step(WizardStep::Questions);

    duplication::duplicate_from(&mut store, &posting).expect("duplicates");

    let draft = store.draft();
    assert_eq!(store.annonce_type(), Some(AnnonceType::Duplicate));
    assert_eq!(store.current_step(), WizardStep::JobInformation);
    assert_eq!(draft.base_information, posting.base_information);
    assert_eq!(draft.job_type_information, posting.job_type_information);
    assert_eq!(draft.salary_information, posting.salary_information);
    assert_eq!(draft.description, posting.description);
    assert_eq!(draft.preferences, posting.preferences);

    assert_eq!(draft.questions.len(), 2);
    let availability = &draft.questions[0];
    assert_eq!(availability.id, "pq-availability");
    assert_eq!(availability.question, "When can you start?");
    assert!(availability.is_required);
    assert_eq!(availability.origin, QuestionOrigin::Predefined);
    assert_eq!(
        availability.kind,
        QuestionKind::Choice {
            options: vec!["Immediately".to_string(), "Within one month".to_string()],
            is_multiple_choices: false,
        }
    );

    let permit = &draft.questions[1];
    assert_eq!(permit.id, "q-77");
    assert_eq!(permit.question_type(), QuestionType::YesNo);
    assert!(!permit.is_required);
}

#[test]
fn failed_question_conversion_leaves_store_untouched() {
    let mut posting = existing_posting();
    posting.questions.push(StoredQuestion {
        id: "q-bad".to_string(),
        question: "Rate yourself".to_string(),
        question_type: "slider".to_string(),
        is_required: false,
        predefined: false,
        answer: None,
        options: None,
        is_multiple_choices: None,
    });

    let mut store = verified_store();
    let before = store.clone();
    let result = duplication::duplicate_from(&mut store, &posting);

    assert!(matches!(result, Err(DuplicationError::Question(_))));
    assert_eq!(store, before);
}

#[test]
fn start_new_resets_previous_draft() {
    let mut store = verified_store();
    duplication::start_new(&mut store);

    assert_eq!(store.annonce_type(), Some(AnnonceType::New));
    assert_eq!(store.current_step(), WizardStep::JobInformation);
    assert!(store.draft().questions.is_empty());
    assert_eq!(store.screen(), WizardScreen::Step(WizardStep::JobInformation));
}

#[test]
fn advance_refuses_invalid_step_and_keeps_pointer() {
    let (service, _) = build_service(0);
    let session = service.create_session();
    let id = session.session_id;

    match service.advance(&id, today()) {
        Err(WizardServiceError::TypeNotSelected) => {}
        other => panic!("expected type selection error, got {other:?}"),
    }

    service.start_new(&id).expect("starts");
    service
        .apply(
            &id,
            WizardEvent::SetBaseInformation(BaseInformation {
                job_title: "QA".to_string(),
                number_of_people: "zero".to_string(),
                promotion_location: "Fes".to_string(),
            }),
        )
        .expect("applies");

    match service.advance(&id, today()) {
        Err(WizardServiceError::StepBlocked { step, errors }) => {
            assert_eq!(step, WizardStep::JobInformation);
            let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
            assert!(fields.contains(&"base_information.job_title"));
            assert!(fields.contains(&"base_information.number_of_people"));
            assert!(fields.contains(&"job_type_information.contract_types"));
        }
        other => panic!("expected blocked step, got {other:?}"),
    }

    let view = service.get(&id).expect("session exists");
    assert_eq!(view.current_step, WizardStep::JobInformation);
}

#[test]
fn advance_walks_a_valid_draft_to_verification() {
    let (service, _) = build_service(0);
    let id = service.create_session().session_id;
    service.duplicate(&id, "posting-42").expect("duplicates");
    service
        .apply(&id, WizardEvent::SetQuestions(questions()))
        .expect("questions set");

    for expected in [
        WizardStep::DescriptionAnnonce,
        WizardStep::Preferences,
        WizardStep::Questions,
        WizardStep::Verification,
    ] {
        let view = service.advance(&id, today()).expect("step validates");
        assert_eq!(view.current_step, expected);
    }

    let view = service.advance(&id, today()).expect("clamped at verification");
    assert_eq!(view.current_step, WizardStep::Verification);
    assert_eq!(view.step_index, 4);
}

#[test]
fn edit_from_verification_is_a_single_jump() {
    let (service, _) = build_service(0);
    let id = service.create_session().session_id;
    service.start_new(&id).expect("starts");
    service
        .apply(&id, WizardEvent::JumpToStep(WizardStep::Verification))
        .expect("jumps");

    let view = service
        .edit_section(&id, PreviewSection::Preferences)
        .expect("edits");
    assert_eq!(view.current_step, WizardStep::Preferences);
}

#[test]
fn duplicate_of_unknown_posting_is_not_found() {
    let (service, _) = build_service(0);
    let id = service.create_session().session_id;

    match service.duplicate(&id, "posting-404") {
        Err(WizardServiceError::Duplication(DuplicationError::NotFound(posting_id))) => {
            assert_eq!(posting_id, "posting-404");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn templates_are_filtered_and_summarised() {
    let (service, _) = build_service(0);
    let filter = TemplateFilter {
        statuses: vec![PostingStatus::Active],
        ..TemplateFilter::default()
    };

    let summaries = service.templates(&filter).expect("lists templates");
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, "posting-7");
    assert_eq!(summaries[0].status_label, "Active");
    assert_eq!(summaries[0].question_count, 2);
}

#[test]
fn template_outage_is_reported() {
    let service = PostingWizardService::new(
        Arc::new(OfflineTemplates),
        Arc::new(SimulatedPublisher::default()),
        instant_config(),
    );

    assert!(matches!(
        service.templates(&TemplateFilter::default()),
        Err(WizardServiceError::Templates(_))
    ));
}

#[test]
fn unknown_session_is_reported() {
    let (service, _) = build_service(0);
    match service.get(&SessionId("wizard-missing".to_string())) {
        Err(WizardServiceError::SessionNotFound(id)) => assert_eq!(id.0, "wizard-missing"),
        other => panic!("expected missing session, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_submission_stays_on_verification_and_retry_succeeds() {
    let (service, publisher) = build_service(1);
    let id = service.create_session().session_id;
    service.duplicate(&id, "posting-42").expect("duplicates");
    service
        .apply(&id, WizardEvent::SetQuestions(questions()))
        .expect("questions set");
    service
        .apply(&id, WizardEvent::JumpToStep(WizardStep::Verification))
        .expect("jumps");

    let first = service.submit(&id, today()).await;
    assert!(matches!(first, Err(WizardServiceError::Submission(_))));
    let view = service.get(&id).expect("session exists");
    assert_eq!(view.current_step, WizardStep::Verification);
    assert!(view.completed.is_none());

    let screen = service.submit(&id, today()).await.expect("retry succeeds");
    assert_eq!(screen.posting_path, format!("/recruiter/annonces/{}", screen.posting_id));
    assert_eq!(publisher.published().len(), 1);
    assert_eq!(publisher.published()[0].annonce_type, AnnonceType::Duplicate);

    match service.apply(&id, WizardEvent::NextStep) {
        Err(WizardServiceError::SessionCompleted(_)) => {}
        other => panic!("expected completed session, got {other:?}"),
    }

    let reset = service.apply(&id, WizardEvent::Reset).expect("reset allowed");
    assert!(reset.completed.is_none());
    assert_eq!(reset.screen, WizardScreen::TypeSelection);
}

fn verified_session<T, P>(service: &PostingWizardService<T, P>) -> SessionId
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    let id = service.create_session().session_id;
    service.duplicate(&id, "posting-42").expect("duplicates");
    service
        .apply(&id, WizardEvent::SetQuestions(questions()))
        .expect("questions set");
    service
        .apply(&id, WizardEvent::JumpToStep(WizardStep::Verification))
        .expect("jumps");
    id
}

fn slow_config() -> WizardConfig {
    WizardConfig {
        submit_delay: Duration::from_millis(1500),
        ..WizardConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_submits_publish_once() {
    let (service, publisher) = build_service_with(0, slow_config());
    let id = verified_session(&service);

    let (first, second) = tokio::join!(service.submit(&id, today()), service.submit(&id, today()));

    let screen = first.expect("first submit publishes");
    match second {
        Err(WizardServiceError::SubmissionInProgress(busy)) => assert_eq!(busy, id),
        other => panic!("expected submission in progress, got {other:?}"),
    }
    assert_eq!(publisher.published().len(), 1);
    let completed = service.get(&id).expect("session").completed.expect("completed");
    assert_eq!(completed.posting_id, screen.posting_id);
}

#[tokio::test(start_paused = true)]
async fn session_is_frozen_while_submitting_and_released_on_failure() {
    let (service, publisher) = build_service_with(1, slow_config());
    let id = verified_session(&service);

    let (outcome, (reset, close, read)) = tokio::join!(service.submit(&id, today()), async {
        (
            service.apply(&id, WizardEvent::Reset),
            service.close_session(&id),
            service.get(&id),
        )
    });

    assert!(matches!(reset, Err(WizardServiceError::SubmissionInProgress(_))));
    assert!(matches!(close, Err(WizardServiceError::SubmissionInProgress(_))));
    assert_eq!(read.expect("reads stay open").current_step, WizardStep::Verification);
    assert!(matches!(outcome, Err(WizardServiceError::Submission(_))));

    let view = service.get(&id).expect("session");
    assert_eq!(view.current_step, WizardStep::Verification);
    assert!(view.completed.is_none());

    service.submit(&id, today()).await.expect("retry publishes");
    assert_eq!(publisher.published().len(), 1);
}

#[test]
fn closed_session_is_gone() {
    let (service, _) = build_service(0);
    let id = service.create_session().session_id;
    service.close_session(&id).expect("closes");

    assert!(matches!(
        service.get(&id),
        Err(WizardServiceError::SessionNotFound(_))
    ));
    assert!(matches!(
        service.close_session(&id),
        Err(WizardServiceError::SessionNotFound(_))
    ));
    assert_eq!(service.session_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn idle_sessions_are_dropped_when_a_new_one_starts() {
    let (service, _) = build_service(0);
    let stale = service.create_session().session_id;
    tokio::time::advance(Duration::from_secs(20 * 60)).await;
    let active = service.create_session().session_id;
    tokio::time::advance(Duration::from_secs(15 * 60)).await;
    service.get(&active).expect("active session");

    service.create_session();

    assert!(matches!(
        service.get(&stale),
        Err(WizardServiceError::SessionNotFound(_))
    ));
    assert!(service.get(&active).is_ok());
    assert_eq!(service.session_count(), 2);
}
