use super::common::*;
use crate::workflows::offers::detection::{detect_fields, FieldDetector, MAX_FIELD_CHARS};
use crate::workflows::offers::domain::NOT_DETECTED;
use crate::workflows::offers::rules::{FieldRole, FieldRule, RuleBook, Trigger};

#[test]
fn empty_text_yields_sentinel_for_every_field() {
    for text in ["", "   ", "...!?\n"] {
        let fields = detect_fields(text);
        assert_eq!(fields.detected_promise, NOT_DETECTED);
        assert_eq!(fields.detected_mechanism, NOT_DETECTED);
        assert_eq!(fields.detected_proof, NOT_DETECTED);
        assert_eq!(fields.detected_cta, NOT_DETECTED);
        assert_eq!(fields.detected_count(), 0);
    }
}

#[test]
fn portuguese_example_detects_promise_and_call_to_action() {
    let fields = detect_fields(WORKED_EXAMPLE);
    assert_eq!(fields.detected_promise, "Perca 10kg em 21 dias");
    assert_eq!(fields.detected_cta, "Compre agora");
    assert_eq!(fields.detected_mechanism, NOT_DETECTED);
}

#[test]
fn detects_every_role_in_rich_copy() {
    let fields = detect_fields(VALIDATED_COPY);
    assert_eq!(
        fields.detected_promise,
        "Perca 10kg em 21 dias com o Método Seca Turbo"
    );
    assert_eq!(
        fields.detected_mechanism,
        "Perca 10kg em 21 dias com o Método Seca Turbo"
    );
    assert_eq!(fields.detected_proof, "Mais de 5 mil alunas comprovado");
    assert_eq!(fields.detected_cta, "Compre agora");
    assert_eq!(fields.detected_count(), 4);
}

#[test]
fn first_matching_segment_wins() {
    let fields = detect_fields("Clique aqui. Compre agora. Saiba mais");
    assert_eq!(fields.detected_cta, "Clique aqui");
}

#[test]
fn detection_is_case_insensitive() {
    let upper = detect_fields("COMPRE AGORA");
    let lower = detect_fields("compre agora");
    assert_eq!(upper.detected_cta, "COMPRE AGORA");
    assert_eq!(lower.detected_cta, "compre agora");
}

#[test]
fn english_copy_is_supported() {
    let fields = detect_fields("Lose 5 pounds in 14 days with this secret method. Shop now");
    assert!(fields.detected_promise.starts_with("Lose 5 pounds"));
    assert!(fields.detected_mechanism.contains("secret method"));
    assert_eq!(fields.detected_cta, "Shop now");
}

#[test]
fn excerpts_never_exceed_the_cap() {
    let body = format!("Compre agora {}", "muito ".repeat(100));
    let fields = detect_fields(&body);
    assert!(fields.detected_cta.chars().count() <= MAX_FIELD_CHARS);
    assert!(fields.detected_cta.starts_with("Compre agora"));
}

#[test]
fn custom_rule_book_replaces_built_in_triggers() {
    let book = RuleBook {
        fields: vec![FieldRule {
            role: FieldRole::CallToAction,
            triggers: vec![Trigger::keyword("subscribe")],
        }],
        ..RuleBook::standard()
    };
    let detector = FieldDetector::from_rule_book(&book).expect("rule book compiles");

    let fields = detector.detect_fields("Compre agora. Subscribe today");
    assert_eq!(fields.detected_cta, "Subscribe today");
    assert_eq!(fields.detected_promise, NOT_DETECTED);
}

#[test]
fn detection_is_deterministic() {
    assert_eq!(detect_fields(VALIDATED_COPY), detect_fields(VALIDATED_COPY));
}
