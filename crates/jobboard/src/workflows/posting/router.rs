use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::AnnonceType;
use super::duplication::{
    DateRange, DuplicationError, PostingStatus, TemplateFilter, TemplateRepository,
};
use super::preview::PreviewSection;
use super::questions::predefined_catalog;
use super::service::{PostingWizardService, SessionId, WizardServiceError};
use super::submission::{PostingPublisher, SubmissionError};
use super::wizard::WizardEvent;

type SharedService<T, P> = Arc<PostingWizardService<T, P>>;

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub annonce_type: AnnonceType,
}

#[derive(Debug, Deserialize)]
pub struct DuplicateRequest {
    pub posting_id: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub section: PreviewSection,
}

/// Query string of the template list: `status` and `city` are comma separated.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl TemplateQuery {
    pub fn into_filter(self) -> Result<TemplateFilter, String> {
        let statuses = split_list(self.status.as_deref())
            .into_iter()
            .map(|raw| {
                PostingStatus::parse(&raw).ok_or_else(|| format!("unknown posting status '{raw}'"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TemplateFilter {
            search: self.search,
            statuses,
            cities: split_list(self.city.as_deref()),
            created: DateRange {
                from: self.from,
                to: self.to,
            },
        })
    }
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Router builder exposing the posting wizard over HTTP.
pub fn wizard_router<T, P>(service: SharedService<T, P>) -> Router
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    Router::new()
        .route("/api/v1/annonces/templates", get(templates_handler::<T, P>))
        .route(
            "/api/v1/annonces/templates/cities",
            get(template_cities_handler::<T, P>),
        )
        .route("/api/v1/annonces/questions/predefined", get(predefined_handler))
        .route("/api/v1/annonces/wizard", post(create_handler::<T, P>))
        .route(
            "/api/v1/annonces/wizard/:session_id",
            get(session_handler::<T, P>).delete(close_handler::<T, P>),
        )
        .route(
            "/api/v1/annonces/wizard/:session_id/events",
            post(event_handler::<T, P>),
        )
        .route(
            "/api/v1/annonces/wizard/:session_id/start",
            post(start_handler::<T, P>),
        )
        .route(
            "/api/v1/annonces/wizard/:session_id/duplicate",
            post(duplicate_handler::<T, P>),
        )
        .route(
            "/api/v1/annonces/wizard/:session_id/advance",
            post(advance_handler::<T, P>),
        )
        .route(
            "/api/v1/annonces/wizard/:session_id/preview",
            get(preview_handler::<T, P>),
        )
        .route(
            "/api/v1/annonces/wizard/:session_id/edit",
            post(edit_handler::<T, P>),
        )
        .route(
            "/api/v1/annonces/wizard/:session_id/submit",
            post(submit_handler::<T, P>),
        )
        .with_state(service)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn respond<V: serde::Serialize>(
    status: StatusCode,
    result: Result<V, WizardServiceError>,
) -> Response {
    match result {
        Ok(view) => (status, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: WizardServiceError) -> Response {
    match &error {
        WizardServiceError::SessionNotFound(_)
        | WizardServiceError::Duplication(DuplicationError::NotFound(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        WizardServiceError::SessionCompleted(_)
        | WizardServiceError::SubmissionInProgress(_)
        | WizardServiceError::TypeNotSelected => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        WizardServiceError::StepBlocked { step, errors } => {
            let payload = json!({
                "error": error.to_string(),
                "step": step,
                "field_errors": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        WizardServiceError::Submission(SubmissionError::Invalid(errors)) => {
            let payload = json!({
                "error": error.to_string(),
                "field_errors": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        WizardServiceError::Submission(SubmissionError::NotOnVerification(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        WizardServiceError::Submission(SubmissionError::Publish(publish)) => {
            let payload = json!({
                "error": error.to_string(),
                "notice": publish.notice(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        WizardServiceError::Duplication(DuplicationError::Question(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        WizardServiceError::Duplication(DuplicationError::Repository(_))
        | WizardServiceError::Templates(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn templates_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Query(query): Query<TemplateQuery>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    match query.into_filter() {
        Ok(filter) => respond(StatusCode::OK, service.templates(&filter)),
        Err(message) => {
            let payload = json!({ "error": message });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn template_cities_handler<T, P>(
    State(service): State<SharedService<T, P>>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    respond(StatusCode::OK, service.template_cities())
}

pub(crate) async fn predefined_handler() -> Response {
    axum::Json(predefined_catalog()).into_response()
}

pub(crate) async fn create_handler<T, P>(State(service): State<SharedService<T, P>>) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    (StatusCode::CREATED, axum::Json(service.create_session())).into_response()
}

pub(crate) async fn session_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    respond(StatusCode::OK, service.get(&SessionId(session_id)))
}

pub(crate) async fn close_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    match service.close_session(&SessionId(session_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn event_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
    axum::Json(event): axum::Json<WizardEvent>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    respond(StatusCode::OK, service.apply(&SessionId(session_id), event))
}

pub(crate) async fn start_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<StartRequest>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    let id = SessionId(session_id);
    match request.annonce_type {
        AnnonceType::New => respond(StatusCode::OK, service.start_new(&id)),
        AnnonceType::Duplicate => {
            let payload = json!({
                "error": "duplicated postings start from /duplicate with a posting_id",
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn duplicate_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<DuplicateRequest>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.duplicate(&SessionId(session_id), &request.posting_id),
    )
}

pub(crate) async fn advance_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    respond(StatusCode::OK, service.advance(&SessionId(session_id), today()))
}

pub(crate) async fn preview_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    respond(StatusCode::OK, service.preview(&SessionId(session_id)))
}

pub(crate) async fn edit_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<EditRequest>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    respond(
        StatusCode::OK,
        service.edit_section(&SessionId(session_id), request.section),
    )
}

pub(crate) async fn submit_handler<T, P>(
    State(service): State<SharedService<T, P>>,
    Path(session_id): Path<String>,
) -> Response
where
    T: TemplateRepository + 'static,
    P: PostingPublisher + 'static,
{
    let result = service.submit(&SessionId(session_id), today()).await;
    respond(StatusCode::CREATED, result)
}
