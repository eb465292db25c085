use super::*;
use serde_json::json;

#[test]
fn parses_key_phrases() {
    let body = json!({
        "documents": [{ "id": "1", "keyPhrases": ["machine learning", "Rust"], "warnings": [] }],
        "errors": [],
        "modelVersion": "2022-10-01"
    })
    .to_string();
    let phrases: Vec<String> = first_document_field(&body, "keyPhrases").unwrap();
    assert_eq!(phrases, vec!["machine learning", "Rust"]);
}

#[test]
fn parses_entities_ignoring_scores() {
    let body = json!({
        "documents": [{
            "id": "1",
            "entities": [
                { "text": "Python", "category": "Skill", "offset": 10, "length": 6, "confidenceScore": 0.93 },
                { "text": "Seattle", "category": "Location", "subcategory": "GPE", "offset": 30, "length": 7, "confidenceScore": 0.88 }
            ],
            "warnings": []
        }],
        "errors": []
    })
    .to_string();
    let entities: Vec<Entity> = first_document_field(&body, "entities").unwrap();
    assert_eq!(
        entities,
        vec![
            Entity { text: "Python".into(), category: "Skill".into() },
            Entity { text: "Seattle".into(), category: "Location".into() },
        ]
    );
}

#[test]
fn document_error_yields_empty() {
    let body = json!({
        "documents": [],
        "errors": [{ "id": "1", "error": { "code": "InvalidArgument", "message": "Document text is empty." } }]
    })
    .to_string();
    let phrases: Vec<String> = first_document_field(&body, "keyPhrases").unwrap();
    assert!(phrases.is_empty());
}

#[test]
fn missing_field_is_parse_error() {
    let body = json!({ "documents": [{ "id": "1" }], "errors": [] }).to_string();
    let err = first_document_field::<Vec<String>>(&body, "keyPhrases").unwrap_err();
    assert!(matches!(err, LanguageError::Parse(_)));
}

#[test]
fn request_body_is_single_document() {
    let body = AnalyzeRequest { documents: [Document { id: DOCUMENT_ID, language: DOCUMENT_LANGUAGE, text: "hello" }] };
    assert_eq!(
        serde_json::to_value(&body).unwrap(),
        json!({ "documents": [{ "id": "1", "language": "en", "text": "hello" }] })
    );
}
