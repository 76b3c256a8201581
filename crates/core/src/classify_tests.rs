// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::MatchError;
use yare::parameterized;

#[parameterized(
    explicit_validation = { ProviderError::Validation("score missing".into()), ErrorKind::Validation },
    explicit_no_object = { ProviderError::NoObject("empty completion".into()), ErrorKind::NoObject },
    explicit_timeout = { ProviderError::Timeout("120s".into()), ErrorKind::Timeout },
    explicit_parse = { ProviderError::Parse("eof while parsing".into()), ErrorKind::JsonParse },
    network_refused = { ProviderError::Network("connection refused".into()), ErrorKind::Network },
    network_timeout = { ProviderError::Network("operation timed out".into()), ErrorKind::Timeout },
    generation_schema = { ProviderError::Generation("response did not match schema".into()), ErrorKind::Validation },
    generation_throttled = { ProviderError::Generation("Rate limit reached for requests".into()), ErrorKind::RateLimit },
    generation_other = { ProviderError::Generation("model refused".into()), ErrorKind::Unknown },
)]
fn classifies_provider_variants(err: ProviderError, expected: ErrorKind) {
    assert_eq!(classify(&err), expected);
}

#[parameterized(
    bad_gateway = { 502, "upstream error", ErrorKind::RateLimit },
    unavailable = { 503, "try later", ErrorKind::RateLimit },
    gateway_timeout = { 504, "Gateway Timeout", ErrorKind::Timeout },
    anthropic_overloaded = { 529, "busy", ErrorKind::RateLimit },
    too_many_requests = { 429, "slow down", ErrorKind::RateLimit },
    request_timeout = { 408, "slow client", ErrorKind::Timeout },
    bad_request_invalid = { 400, "invalid model parameter", ErrorKind::Validation },
    server_error_plain = { 500, "internal error", ErrorKind::Unknown },
)]
fn classifies_http_statuses(status: u16, message: &str, expected: ErrorKind) {
    let err = ProviderError::Http {
        status,
        message: message.to_string(),
    };
    assert_eq!(classify(&err), expected);
}

#[parameterized(
    circuit = { "Circuit breaker is OPEN", ErrorKind::CircuitBreaker },
    etimedout = { "connect ETIMEDOUT 10.0.0.1:443", ErrorKind::Timeout },
    econnreset = { "read ECONNRESET", ErrorKind::Network },
    socket = { "socket hang up", ErrorKind::Network },
    overloaded = { "Overloaded", ErrorKind::RateLimit },
    quota = { "You exceeded your current quota", ErrorKind::RateLimit },
    throttled = { "request was throttled", ErrorKind::RateLimit },
    status_in_text = { "status 429 returned", ErrorKind::RateLimit },
    json = { "Unexpected token < in JSON at position 0", ErrorKind::JsonParse },
    syntax = { "SyntaxError: bad control character", ErrorKind::JsonParse },
    zod = { "ZodError: expected number", ErrorKind::Validation },
    unknown = { "something odd happened", ErrorKind::Unknown },
)]
fn classifies_free_form_messages(message: &str, expected: ErrorKind) {
    assert_eq!(classify(&ProviderError::Other(message.to_string())), expected);
}

#[parameterized(
    validation = { ErrorKind::Validation, false },
    circuit = { ErrorKind::CircuitBreaker, false },
    json_parse = { ErrorKind::JsonParse, false },
    no_object = { ErrorKind::NoObject, false },
    timeout = { ErrorKind::Timeout, true },
    rate_limit = { ErrorKind::RateLimit, true },
    network = { ErrorKind::Network, true },
    unknown = { ErrorKind::Unknown, true },
)]
fn retryability_follows_kind(kind: ErrorKind, retryable: bool) {
    assert_eq!(kind.is_retryable(), retryable);
}

#[test]
fn status_codes_at_api_boundary() {
    assert_eq!(ErrorKind::Timeout.http_status(), 504);
    assert_eq!(ErrorKind::RateLimit.http_status(), 429);
    assert_eq!(ErrorKind::Validation.http_status(), 400);
    assert_eq!(ErrorKind::CircuitBreaker.http_status(), 503);
    assert_eq!(ErrorKind::NoObject.http_status(), 422);
}

#[test]
fn match_error_from_provider_error_keeps_status_and_message() {
    let err: MatchError = ProviderError::Http {
        status: 503,
        message: "service unavailable".into(),
    }
    .into();
    assert_eq!(err.kind, ErrorKind::RateLimit);
    assert_eq!(err.status, Some(503));
    assert!(err.message.contains("service unavailable"));
    assert!(err.is_retryable());
}

#[test]
fn error_kind_serializes_snake_case() {
    let json = serde_json::to_string(&ErrorKind::JsonParse).unwrap();
    assert_eq!(json, "\"json_parse\"");
    assert_eq!(ErrorKind::CircuitBreaker.to_string(), "circuit_breaker");
}
