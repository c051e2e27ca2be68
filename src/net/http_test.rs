use super::*;

// =============================================================
// URL construction
// =============================================================

#[test]
fn new_appends_the_canvas_path() {
    let source = HttpSnapshotSource::new("http://localhost:3000").unwrap();
    assert_eq!(source.url, "http://localhost:3000/canvas");
}

#[test]
fn new_tolerates_a_trailing_slash() {
    let source = HttpSnapshotSource::new("https://canvas.example.org/").unwrap();
    assert_eq!(source.url, "https://canvas.example.org/canvas");
}

// =============================================================
// Payload parsing
// =============================================================

#[test]
fn parse_extracts_the_canvas_field() {
    let body = r#"{"canvas":"0123"}"#;
    assert_eq!(parse_snapshot(body).unwrap(), "0123");
}

#[test]
fn parse_ignores_extra_fields() {
    let body = r#"{"canvas":"00","painters":4,"seq":17}"#;
    assert_eq!(parse_snapshot(body).unwrap(), "00");
}

#[test]
fn parse_accepts_an_empty_canvas_string() {
    let body = r#"{"canvas":""}"#;
    assert_eq!(parse_snapshot(body).unwrap(), "");
}

#[test]
fn missing_canvas_field_is_a_payload_error() {
    let err = parse_snapshot(r#"{"seq":17}"#).unwrap_err();
    assert!(matches!(err, FetchError::Payload(_)));
}

#[test]
fn non_json_body_is_a_payload_error() {
    let err = parse_snapshot("<html>busy</html>").unwrap_err();
    assert!(matches!(err, FetchError::Payload(_)));
}

#[test]
fn wrong_canvas_type_is_a_payload_error() {
    let err = parse_snapshot(r#"{"canvas":7}"#).unwrap_err();
    assert!(matches!(err, FetchError::Payload(_)));
}
