//! End-to-end scenarios for the offer research workflow through the public service facade,
//! the JSON file store, and the HTTP router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::Value;
use swipe_engine::workflows::offers::ingest::{parse_csv, parse_csv_path};
use swipe_engine::workflows::offers::{
    offer_router, AdRepository, AdStatus, JsonFileAdRepository, OfferResearchService,
    ScoringEngine, NOT_DETECTED,
};
use tower::ServiceExt;

const EXPORT: &[u8] = include_bytes!("../fixtures/ad_library_export.csv");

fn file_service(path: &std::path::Path) -> OfferResearchService<JsonFileAdRepository> {
    OfferResearchService::new(
        Arc::new(JsonFileAdRepository::new(path)),
        ScoringEngine::standard().expect("standard engine builds"),
    )
}

#[test]
fn csv_export_imports_once_and_persists() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = dir.path().join("ads.json");
    let service = file_service(&store);

    let drafts = parse_csv(EXPORT).expect("export parses");
    assert_eq!(drafts.len(), 7);

    let summary = service.import_batch(drafts.clone()).expect("first import");
    assert_eq!(summary.imported.len(), 5);
    assert_eq!(summary.skipped_duplicates, 1);
    assert_eq!(summary.skipped_empty, 1);

    let again = service.import_batch(drafts).expect("second import");
    assert!(again.imported.is_empty());
    assert_eq!(again.skipped_duplicates, 6);

    let reopened = file_service(&store);
    let ads = reopened.list().expect("list");
    assert_eq!(ads.len(), 5);
    assert!(ads.iter().all(|ad| ad.overall_score <= 100 && ad.risk_score <= 100));
}

#[test]
fn imported_ads_carry_detection_and_compliance() {
    let dir = tempfile::tempdir().expect("temp dir");
    let service = file_service(&dir.path().join("ads.json"));
    service
        .import_batch(parse_csv_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/fixtures/ad_library_export.csv"
        ))
        .expect("fixture parses"))
        .expect("import");

    let ads = service.list().expect("list");
    let renda = ads
        .iter()
        .find(|ad| ad.page_or_advertiser == "Renda Pro")
        .expect("renda ad imported");
    assert!(renda.compliance_alerts.contains(&"Financial promise".to_string()));
    assert!(renda.compliance_alerts.contains(&"Personal data request".to_string()));
    assert!(renda.compliance_alerts.contains(&"Artificial urgency".to_string()));
    assert!(renda.risk_score >= 70);

    let leve = ads
        .iter()
        .find(|ad| ad.page_or_advertiser == "Protocolo Leve")
        .expect("leve ad imported");
    assert_eq!(leve.status, AdStatus::Inactive);
    assert_ne!(leve.detected.detected_mechanism, NOT_DETECTED);
    assert!(leve.overall_score > leve.offer_score);

    let violao = ads
        .iter()
        .find(|ad| ad.page_or_advertiser == "Violão Fácil")
        .expect("violao ad imported");
    assert!(violao.compliance_alerts.is_empty());
    assert_eq!(violao.risk_score, 0);
    assert_eq!(violao.overall_score, violao.offer_score);
}

#[test]
fn recalculation_is_idempotent_on_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = dir.path().join("ads.json");
    let service = file_service(&store);
    service
        .import_batch(parse_csv(EXPORT).expect("export parses"))
        .expect("import");

    let first = service.recalculate_all().expect("recalculate");
    let snapshot = std::fs::read_to_string(&store).expect("store written");
    let second = service.recalculate_all().expect("recalculate again");

    assert_eq!(first, second);
    assert_eq!(
        std::fs::read_to_string(&store).expect("store written"),
        snapshot
    );
    assert_eq!(
        service.repository().get_ads().expect("read").len(),
        first.len()
    );
}

#[tokio::test]
async fn http_import_then_list_round_trips_through_file_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let router = offer_router(Arc::new(file_service(&dir.path().join("ads.json"))));

    let payload = serde_json::json!({
        "pageOrAdvertiser": "Nutri Max",
        "mainText": "Perca 10kg em 21 dias! Garantido ou seu dinheiro de volta. Compre agora.",
        "headline": "Antes e depois"
    });
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/offers/ads")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/offers/ads")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    let ads: Value = serde_json::from_slice(&body).expect("json payload");
    let ad = &ads[0];
    assert_eq!(ad["headline"], "Antes e depois");
    assert_eq!(
        ad["complianceAlerts"],
        serde_json::json!(["Health claim", "Guaranteed results", "Before and after"])
    );
    assert_eq!(ad["riskScore"], 90);
}
