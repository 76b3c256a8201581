// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn request() -> StructuredRequest {
    StructuredRequest::new("gpt-4o-mini", json!({ "type": "object" }))
        .system("be terse")
        .user("score this")
}

#[test]
fn body_carries_schema_and_messages() {
    let body = request_body(&request());

    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "score this");
    assert_eq!(body["response_format"]["type"], "json_schema");
    assert_eq!(
        body["response_format"]["json_schema"]["schema"],
        json!({ "type": "object" })
    );
}

#[test]
fn body_omits_empty_system_prompt() {
    let body = request_body(&StructuredRequest::new("m", json!({})).user("hi"));
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
}

#[test]
fn provider_options_are_merged() {
    let body = request_body(&request().options(json!({ "reasoning_effort": "low" })));
    assert_eq!(body["reasoning_effort"], "low");
}

#[test]
fn extracts_object_from_content() {
    let text = r#"{"choices":[{"message":{"content":"{\"score\": 81}"}}]}"#;
    assert_eq!(extract_object(text).unwrap(), json!({ "score": 81 }));
}

#[test]
fn undecodable_body_is_parse_error() {
    assert!(matches!(
        extract_object("<html>bad gateway</html>"),
        Err(ProviderError::Parse(_))
    ));
}

#[test]
fn malformed_content_is_parse_error() {
    let text = r#"{"choices":[{"message":{"content":"{\"score\": "}}]}"#;
    assert!(matches!(extract_object(text), Err(ProviderError::Parse(_))));
}

#[test]
fn missing_content_is_no_object() {
    for text in [
        r#"{"choices":[]}"#,
        r#"{"choices":[{"message":{"content":null}}]}"#,
        r#"{"choices":[{"message":{"content":"  "}}]}"#,
        r#"{"choices":[{"message":{"content":null,"refusal":"no"}}]}"#,
    ] {
        assert!(
            matches!(extract_object(text), Err(ProviderError::NoObject(_))),
            "{text}"
        );
    }
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let provider = OpenAiProvider::with_base_url("key", "http://localhost:8080/v1/");
    assert_eq!(provider.endpoint(), "http://localhost:8080/v1/chat/completions");
}
