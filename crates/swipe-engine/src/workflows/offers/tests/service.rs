use super::common::*;
use crate::workflows::offers::domain::{AdDraft, AdEdit, AdId, AiReanalysis, OfferCard, ScaleScore, NOT_DETECTED};
use crate::workflows::offers::repository::{AdRepository, RepositoryError};
use crate::workflows::offers::{OfferResearchService, OfferServiceError};
use std::sync::Arc;

#[test]
fn import_detects_fields_and_scores_against_corpus() {
    let service = memory_service(vec![]);
    service
        .import_ad(draft("Seca Turbo", VALIDATED_COPY))
        .expect("first import");

    let weak = service
        .import_ad(draft("Seca Turbo", WEAK_COPY))
        .expect("second import");

    assert_eq!(
        weak.detected.detected_promise,
        "Perca 10kg em 21 dias com o Método Seca Turbo"
    );
    assert_eq!(weak.detected.detected_cta, NOT_DETECTED);
    assert!(weak.overall_score > weak.offer_score);
    assert_eq!(weak.compliance_alerts, vec!["Health claim"]);
    assert_eq!(service.list().expect("list").len(), 2);
}

#[test]
fn import_generates_unique_ids() {
    let service = memory_service(vec![]);
    let first = service.import_ad(draft("A", WEAK_COPY)).expect("import");
    let second = service.import_ad(draft("B", WEAK_COPY)).expect("import");
    assert_ne!(first.id, second.id);
    assert!(!first.id.as_str().is_empty());
}

#[test]
fn import_with_existing_id_conflicts() {
    let service = memory_service(vec![ad("a", WEAK_COPY)]);
    let mut duplicate = draft("A", UNRELATED_COPY);
    duplicate.id = Some(AdId::from("a"));

    assert!(matches!(
        service.import_ad(duplicate),
        Err(OfferServiceError::Repository(RepositoryError::Conflict(_)))
    ));
}

#[test]
fn single_import_rescores_existing_ads() {
    let service = memory_service(vec![]);
    let weak = service.import_ad(draft("Seca Turbo", WEAK_COPY)).expect("import weak");
    assert_eq!(weak.overall_score, 48);

    let validated = service
        .import_ad(draft("Outra", VALIDATED_COPY))
        .expect("import validated");

    let stored_weak = service.get(&weak.id).expect("still stored");
    assert_eq!(stored_weak.offer_score, 48);
    assert_eq!(stored_weak.overall_score, 51);
    assert_eq!(service.get(&validated.id).expect("stored"), validated);

    let recalculated = service.recalculate_all().expect("recalculate");
    let recalculated_weak = recalculated
        .iter()
        .find(|ad| ad.id == weak.id)
        .expect("weak ad kept");
    assert_eq!(recalculated_weak.score_card(), stored_weak.score_card());
}

#[test]
fn batch_import_skips_duplicates_and_empty_rows() {
    let service = memory_service(vec![]);
    service
        .import_ad(draft("Nutri Max", WORKED_EXAMPLE))
        .expect("seed");

    let summary = service
        .import_batch(vec![
            draft("nutri max", &WORKED_EXAMPLE.to_uppercase()),
            draft("Seca Turbo", VALIDATED_COPY),
            draft("Seca Turbo", VALIDATED_COPY),
            AdDraft::default(),
        ])
        .expect("batch import");

    assert_eq!(summary.imported.len(), 1);
    assert_eq!(summary.skipped_duplicates, 2);
    assert_eq!(summary.skipped_empty, 1);
    assert_eq!(service.list().expect("list").len(), 2);
}

#[test]
fn batch_import_rescores_existing_ads() {
    let service = memory_service(vec![]);
    let weak = service.import_ad(draft("Seca Turbo", WEAK_COPY)).expect("import");
    assert_eq!(weak.overall_score, weak.offer_score);

    service
        .import_batch(vec![draft("Outra", VALIDATED_COPY)])
        .expect("batch import");

    let rescored = service.get(&weak.id).expect("still stored");
    assert!(rescored.overall_score > rescored.offer_score);
}

#[test]
fn editing_text_redetects_fields() {
    let service = memory_service(vec![]);
    let stored = service.import_ad(draft("Nutri Max", UNRELATED_COPY)).expect("import");
    assert_eq!(stored.compliance_alerts, Vec::<String>::new());

    let edited = service
        .edit_ad(
            &stored.id,
            AdEdit {
                main_text: Some(WORKED_EXAMPLE.to_string()),
                ..AdEdit::default()
            },
        )
        .expect("edit");

    assert_eq!(edited.detected.detected_promise, "Perca 10kg em 21 dias");
    assert_eq!(
        edited.compliance_alerts,
        vec!["Health claim", "Guaranteed results"]
    );
    assert_eq!(edited.risk_score, 70);
}

#[test]
fn editing_missing_ad_is_not_found() {
    let service = memory_service(vec![]);
    assert!(matches!(
        service.edit_ad(&AdId::from("ghost"), AdEdit::default()),
        Err(OfferServiceError::Repository(RepositoryError::NotFound(_)))
    ));
}

#[test]
fn ai_analysis_merges_without_blanking_fields() {
    let mut seeded = ad("a", WEAK_COPY);
    seeded.mechanism = "Manual mechanism".to_string();
    let service = memory_service(vec![seeded]);

    let analysis = AiReanalysis {
        offer_card: OfferCard {
            promise: "Secar 10kg".to_string(),
            mechanism: "   ".to_string(),
            proof: vec!["5 mil alunas".to_string(), "".to_string(), "Estudo".to_string()],
            angle: vec!["Mulheres 30+".to_string(), "Pós-parto".to_string()],
            format: "Desafio de 21 dias".to_string(),
        },
        scale_score: ScaleScore { score_0_100: 142.7 },
    };

    let merged = service
        .apply_ai_analysis(&AdId::from("a"), &analysis)
        .expect("merge");

    assert_eq!(merged.promise_summary, "Secar 10kg");
    assert_eq!(merged.mechanism, "Manual mechanism");
    assert_eq!(merged.proof, "5 mil alunas; Estudo");
    assert_eq!(merged.inferred_audience, "Mulheres 30+, Pós-parto");
    assert_eq!(merged.offer, "Desafio de 21 dias");
    assert_eq!(merged.ai_scale_score, Some(100));
    assert_eq!(merged.display_score(), 100);
}

#[test]
fn toggling_reference_keeps_scores() {
    let service = memory_service(vec![]);
    let stored = service.import_ad(draft("Nutri Max", WORKED_EXAMPLE)).expect("import");

    let pinned = service.toggle_reference(&stored.id).expect("toggle on");
    assert!(pinned.saved_as_reference);
    assert_eq!(pinned.score_card(), stored.score_card());
    assert_eq!(service.references().expect("references").len(), 1);

    let unpinned = service.toggle_reference(&stored.id).expect("toggle off");
    assert!(!unpinned.saved_as_reference);
    assert!(service.references().expect("references").is_empty());
}

#[test]
fn delete_leaves_other_scores_until_recalculated() {
    let service = memory_service(vec![]);
    let strong = service.import_ad(draft("A", VALIDATED_COPY)).expect("import");
    let weak = service.import_ad(draft("B", WEAK_COPY)).expect("import");

    service.delete_ad(&strong.id).expect("delete");
    assert_eq!(service.get(&weak.id).expect("kept"), weak);

    let recalculated = service.recalculate_all().expect("recalculate");
    assert_eq!(recalculated.len(), 1);
    assert_eq!(recalculated[0].overall_score, recalculated[0].offer_score);
}

#[test]
fn recalculate_persists_and_is_stable() {
    let service = memory_service(vec![ad("a", VALIDATED_COPY), ad("b", WEAK_COPY)]);
    let first = service.recalculate_all().expect("recalculate");
    let second = service.recalculate_all().expect("recalculate again");
    assert_eq!(first, second);
    assert_eq!(service.list().expect("list"), first);
}

#[test]
fn explain_reports_corroborating_ads() {
    let service = memory_service(vec![ad("a", VALIDATED_COPY), ad("b", WEAK_COPY)]);
    let breakdown = service.explain(&AdId::from("b")).expect("explain");
    assert_eq!(breakdown.corroborating_ads, vec![AdId::from("a")]);
}

#[test]
fn detect_does_not_touch_the_corpus() {
    let service = memory_service(vec![]);
    let analysis = service.detect(WORKED_EXAMPLE);
    assert_eq!(analysis.detected.detected_cta, "Compre agora");
    assert_eq!(analysis.risk_score, 70);
    assert!(service.list().expect("list").is_empty());
}

#[test]
fn repository_failures_propagate() {
    let service = OfferResearchService::new(Arc::new(UnavailableRepository), engine());
    assert!(matches!(
        service.import_ad(draft("A", WEAK_COPY)),
        Err(OfferServiceError::Repository(RepositoryError::Unavailable(_)))
    ));
    assert!(service.list().is_err());
    assert!(service.repository().get_ads().is_err());
}
