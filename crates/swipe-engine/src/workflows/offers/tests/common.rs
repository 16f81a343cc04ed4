use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::offers::domain::{AdDraft, AdId, AdStatus, ImportedAd};
use crate::workflows::offers::repository::{AdRepository, InMemoryAdRepository, RepositoryError};
use crate::workflows::offers::scoring::ScoringEngine;
use crate::workflows::offers::{offer_router, OfferResearchService};

/// Copy hitting every field role, a price, a guarantee and numbers: intrinsic score 100.
pub(super) const VALIDATED_COPY: &str = "Perca 10kg em 21 dias com o Método Seca Turbo. \
Mais de 5 mil alunas comprovado. Garantia de 30 dias ou dinheiro de volta. \
Por apenas R$ 97. Compre agora.";

/// Promise plus mechanism only; shares most of its vocabulary with [`VALIDATED_COPY`].
pub(super) const WEAK_COPY: &str = "Perca 10kg em 21 dias com o Método Seca Turbo";

pub(super) const WORKED_EXAMPLE: &str =
    "Perca 10kg em 21 dias! Garantido ou seu dinheiro de volta. Compre agora.";

pub(super) const UNRELATED_COPY: &str =
    "Curso de violão para iniciantes. Aprenda acordes básicos no seu ritmo. Saiba mais.";

pub(super) fn imported_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::standard().expect("standard engine builds")
}

pub(super) fn draft(page: &str, text: &str) -> AdDraft {
    AdDraft {
        page_or_advertiser: Some(page.to_string()),
        main_text: Some(text.to_string()),
        ..AdDraft::default()
    }
}

/// Stored ad with no analysis yet.
pub(super) fn ad(id: &str, text: &str) -> ImportedAd {
    let mut draft = draft("Nutri Max", text);
    draft.platform = Some("facebook".to_string());
    ImportedAd::from_draft(AdId::from(id), draft, imported_at())
}

pub(super) fn inactive_ad(id: &str, text: &str) -> ImportedAd {
    let mut ad = ad(id, text);
    ad.status = AdStatus::Inactive;
    ad
}

pub(super) fn long_running_ad(id: &str, text: &str, days: i64) -> ImportedAd {
    let mut ad = ad(id, text);
    let start: NaiveDate = (imported_at() - Duration::days(days)).date_naive();
    ad.start_date = Some(start);
    ad
}

pub(super) fn memory_service(ads: Vec<ImportedAd>) -> OfferResearchService<InMemoryAdRepository> {
    let repository = InMemoryAdRepository::with_ads(ads).expect("unique ids");
    OfferResearchService::new(Arc::new(repository), engine())
}

pub(super) fn router_with(ads: Vec<ImportedAd>) -> axum::Router {
    offer_router(Arc::new(memory_service(ads)))
}

/// Repository whose backend is down.
pub(super) struct UnavailableRepository;

impl AdRepository for UnavailableRepository {
    fn get_ads(&self) -> Result<Vec<ImportedAd>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn add_ad(&self, _ad: ImportedAd) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn update_ad(&self, _ad: ImportedAd) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn delete_ad(&self, _id: &AdId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }

    fn save_ads(&self, _ads: Vec<ImportedAd>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("disk offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
