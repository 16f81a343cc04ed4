use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AdDraft, AdEdit, AdId, AiReanalysis};
use super::repository::{AdRepository, RepositoryError};
use super::service::{OfferResearchService, OfferServiceError};

/// Router builder exposing the offer research corpus over HTTP.
pub fn offer_router<R>(service: Arc<OfferResearchService<R>>) -> Router
where
    R: AdRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/offers/ads",
            get(list_handler::<R>).post(import_handler::<R>),
        )
        .route("/api/v1/offers/ads/batch", post(batch_handler::<R>))
        .route(
            "/api/v1/offers/ads/:ad_id",
            put(edit_handler::<R>)
                .get(get_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route(
            "/api/v1/offers/ads/:ad_id/analysis",
            post(analysis_handler::<R>),
        )
        .route(
            "/api/v1/offers/ads/:ad_id/reference",
            post(reference_handler::<R>),
        )
        .route(
            "/api/v1/offers/ads/:ad_id/explain",
            get(explain_handler::<R>),
        )
        .route("/api/v1/offers/recalculate", post(recalculate_handler::<R>))
        .route("/api/v1/offers/detect", post(detect_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetectRequest {
    pub(crate) text: String,
}

fn error_response(error: OfferServiceError) -> Response {
    let status = match &error {
        OfferServiceError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
        OfferServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, OfferServiceError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(State(service): State<Arc<OfferResearchService<R>>>) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::OK, service.list())
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    Path(ad_id): Path<String>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::OK, service.get(&AdId(ad_id)))
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    axum::Json(draft): axum::Json<AdDraft>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::CREATED, service.import_ad(draft))
}

pub(crate) async fn batch_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    axum::Json(drafts): axum::Json<Vec<AdDraft>>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::OK, service.import_batch(drafts))
}

pub(crate) async fn edit_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    Path(ad_id): Path<String>,
    axum::Json(edit): axum::Json<AdEdit>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::OK, service.edit_ad(&AdId(ad_id), edit))
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    Path(ad_id): Path<String>,
) -> Response
where
    R: AdRepository + 'static,
{
    match service.delete_ad(&AdId(ad_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn analysis_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    Path(ad_id): Path<String>,
    axum::Json(analysis): axum::Json<AiReanalysis>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.apply_ai_analysis(&AdId(ad_id), &analysis),
    )
}

pub(crate) async fn reference_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    Path(ad_id): Path<String>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::OK, service.toggle_reference(&AdId(ad_id)))
}

pub(crate) async fn explain_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    Path(ad_id): Path<String>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::OK, service.explain(&AdId(ad_id)))
}

pub(crate) async fn recalculate_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
) -> Response
where
    R: AdRepository + 'static,
{
    respond(StatusCode::OK, service.recalculate_all())
}

pub(crate) async fn detect_handler<R>(
    State(service): State<Arc<OfferResearchService<R>>>,
    axum::Json(request): axum::Json<DetectRequest>,
) -> Response
where
    R: AdRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.detect(&request.text))).into_response()
}
