// src/core/report/extract.rs

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::summary::summarize;
use crate::core::error::{ScanError, ScanResult};
use crate::core::models::{FilteredCertificate, FilteredEndpoint, FilteredReport};

/// Suites strictly below this strength (in bits) count as weak.
pub const WEAK_CIPHER_THRESHOLD: f64 = 112.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_YEAR: f64 = 365.25;

// --- Absent-tolerant accessors ---
// The remote schema is only partially documented, so every lookup defaults
// instead of failing: strings to "", numbers to 0, booleans to false.

fn str_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn bool_at(value: &Value, pointer: &str) -> bool {
    value.pointer(pointer).and_then(Value::as_bool).unwrap_or(false)
}

fn f64_at(value: &Value, pointer: &str) -> f64 {
    value.pointer(pointer).and_then(Value::as_f64).unwrap_or(0.0)
}

fn i64_at(value: &Value, pointer: &str) -> i64 {
    value
        .pointer(pointer)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

fn array_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Reduces a raw assessment document, using the wall clock as "now".
pub fn reduce(raw: &[u8]) -> ScanResult<FilteredReport> {
    reduce_at(raw, Utc::now())
}

/// Reduces a raw assessment document into a [`FilteredReport`].
///
/// `now` drives the certificate expiry computation and becomes the report
/// timestamp, so pinning it makes the output fully reproducible.
pub fn reduce_at(raw: &[u8], now: DateTime<Utc>) -> ScanResult<FilteredReport> {
    if raw.is_empty() {
        warn!("Refusing to reduce an empty assessment payload.");
        return Err(ScanError::EmptyInput);
    }

    let document: Value = serde_json::from_slice(raw).map_err(|e| {
        warn!(error = %e, "Assessment payload is not valid JSON.");
        ScanError::MalformedInput(e.to_string())
    })?;

    let mut report = FilteredReport {
        host: str_at(&document, "/host"),
        web_protocol: str_at(&document, "/protocol"),
        endpoints: Vec::new(),
        summary: String::new(),
        timestamp: now,
    };

    report.endpoints = array_at(&document, "/endpoints")
        .iter()
        .map(|endpoint| filter_endpoint(endpoint, now))
        .collect();
    debug!(host = %report.host, endpoints = report.endpoints.len(), "Endpoints extracted.");

    report.summary = summarize(&report);
    info!(host = %report.host, "Assessment report reduced.");
    Ok(report)
}

fn filter_endpoint(endpoint: &Value, now: DateTime<Utc>) -> FilteredEndpoint {
    let suites = array_at(endpoint, "/details/suites/list");

    FilteredEndpoint {
        ip_address: str_at(endpoint, "/ipAddress"),
        status_message: str_at(endpoint, "/statusMessage"),
        grade: str_at(endpoint, "/grade"),
        has_warnings: bool_at(endpoint, "/hasWarnings"),
        is_exceptional: bool_at(endpoint, "/isExceptional"),
        certificate: extract_certificate(endpoint, now),
        protocols: extract_protocols(endpoint),
        negotiated_cipher_strength: suites
            .first()
            .map(|suite| f64_at(suite, "/cipherStrength"))
            .unwrap_or(0.0),
        max_cipher_strength: max_cipher_strength(suites),
        has_weak_ciphers: has_weak_cipher(suites),
        hsts: str_at(endpoint, "/details/hstsPolicy/status"),
        server: str_at(endpoint, "/details/serverSignature"),
        chain_issues: i64_at(endpoint, "/details/chain/issues"),
    }
}

/// Joins each protocol's name and version ("TLS 1.3"), keeping the source order.
fn extract_protocols(endpoint: &Value) -> Vec<String> {
    array_at(endpoint, "/details/protocols")
        .iter()
        .map(|p| format!("{} {}", str_at(p, "/name"), str_at(p, "/version")))
        .collect()
}

fn max_cipher_strength(suites: &[Value]) -> f64 {
    suites
        .iter()
        .map(|suite| f64_at(suite, "/cipherStrength"))
        .fold(0.0, f64::max)
}

fn has_weak_cipher(suites: &[Value]) -> bool {
    suites
        .iter()
        .any(|suite| f64_at(suite, "/cipherStrength") < WEAK_CIPHER_THRESHOLD)
}

fn extract_certificate(endpoint: &Value, now: DateTime<Utc>) -> Option<FilteredCertificate> {
    let cert = endpoint.pointer("/details/cert").filter(|c| c.is_object())?;
    let (validity_years, expires_in_days) = certificate_validity(
        f64_at(cert, "/notBefore"),
        f64_at(cert, "/notAfter"),
        now,
    );

    Some(FilteredCertificate {
        subject: str_at(cert, "/subject"),
        issuer: str_at(cert, "/issuerSubject"),
        validity_years,
        expires_in_days,
    })
}

/// Returns `(validity_years, expires_in_days)` for millisecond epoch timestamps.
///
/// Both values are rounded to one decimal and are `0` when either timestamp is missing.
pub fn certificate_validity(not_before_ms: f64, not_after_ms: f64, now: DateTime<Utc>) -> (f64, f64) {
    if not_before_ms == 0.0 || not_after_ms == 0.0 {
        return (0.0, 0.0);
    }

    let not_before = not_before_ms.trunc();
    let not_after = not_after_ms.trunc();
    let now_ms = now.timestamp_millis() as f64;

    let validity_days = (not_after - not_before) / MILLIS_PER_DAY;
    let validity_years = validity_days / DAYS_PER_YEAR;
    let expires_in_days = (not_after - now_ms) / MILLIS_PER_DAY;

    (round_one_decimal(validity_years), round_one_decimal(expires_in_days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    const DAY_MS: i64 = 86_400_000;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn sample_report(now: DateTime<Utc>) -> Vec<u8> {
        let now_ms = now.timestamp_millis();
        json!({
            "host": "example.com",
            "protocol": "http",
            "status": "READY",
            "endpoints": [{
                "ipAddress": "93.184.216.34",
                "statusMessage": "Ready",
                "grade": "A",
                "hasWarnings": false,
                "isExceptional": false,
                "details": {
                    "cert": {
                        "subject": "CN=example.com",
                        "issuerSubject": "CN=Example CA",
                        "notBefore": now_ms - 265 * DAY_MS,
                        "notAfter": now_ms + 100 * DAY_MS
                    },
                    "protocols": [
                        {"name": "TLS", "version": "1.2"},
                        {"name": "TLS", "version": "1.3"}
                    ],
                    "suites": {
                        "list": [
                            {"name": "TLS_AES_128_GCM_SHA256", "cipherStrength": 128},
                            {"name": "TLS_AES_256_GCM_SHA384", "cipherStrength": 256},
                            {"name": "TLS_RSA_WITH_3DES_EDE_CBC_SHA", "cipherStrength": 112}
                        ]
                    },
                    "hstsPolicy": {"status": "present"},
                    "serverSignature": "ECS (dcb/7F84)",
                    "chain": {"issues": 2}
                }
            }]
        })
        .to_string()
        .into_bytes()
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert_eq!(reduce(b""), Err(ScanError::EmptyInput));
    }

    #[test]
    fn non_json_payload_is_rejected() {
        assert!(matches!(reduce(b"not json"), Err(ScanError::MalformedInput(_))));
    }

    #[test]
    fn endpoint_fields_are_projected() {
        let now = fixed_now();
        let report = reduce_at(&sample_report(now), now).unwrap();

        assert_eq!(report.host, "example.com");
        assert_eq!(report.web_protocol, "http");
        assert_eq!(report.timestamp, now);
        assert_eq!(report.endpoints.len(), 1);

        let ep = &report.endpoints[0];
        assert_eq!(ep.ip_address, "93.184.216.34");
        assert_eq!(ep.status_message, "Ready");
        assert_eq!(ep.grade, "A");
        assert_eq!(ep.protocols, vec!["TLS 1.2", "TLS 1.3"]);
        assert_eq!(ep.negotiated_cipher_strength, 128.0);
        assert_eq!(ep.max_cipher_strength, 256.0);
        // 112 bits is the threshold itself, not below it
        assert!(!ep.has_weak_ciphers);
        assert_eq!(ep.hsts, "present");
        assert_eq!(ep.server, "ECS (dcb/7F84)");
        assert_eq!(ep.chain_issues, 2);

        let cert = ep.certificate.as_ref().unwrap();
        assert_eq!(cert.subject, "CN=example.com");
        assert_eq!(cert.issuer, "CN=Example CA");
        assert_eq!(cert.expires_in_days, 100.0);
        assert_eq!(cert.validity_years, 1.0);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let raw = json!({"host": "bare.example", "endpoints": [{"ipAddress": "10.0.0.1"}]});
        let report = reduce_at(raw.to_string().as_bytes(), fixed_now()).unwrap();
        let ep = &report.endpoints[0];

        assert_eq!(report.web_protocol, "");
        assert_eq!(ep.grade, "");
        assert!(!ep.has_warnings);
        assert!(ep.protocols.is_empty());
        assert_eq!(ep.negotiated_cipher_strength, 0.0);
        assert_eq!(ep.max_cipher_strength, 0.0);
        assert!(!ep.has_weak_ciphers);
        assert_eq!(ep.chain_issues, 0);
        assert!(ep.certificate.is_none());
    }

    #[test]
    fn weak_suite_sets_the_flag() {
        let raw = json!({
            "host": "weak.example",
            "endpoints": [{
                "grade": "F",
                "details": {"suites": {"list": [
                    {"cipherStrength": 40},
                    {"cipherStrength": 128}
                ]}}
            }]
        });
        let report = reduce_at(raw.to_string().as_bytes(), fixed_now()).unwrap();
        let ep = &report.endpoints[0];

        assert!(ep.has_weak_ciphers);
        assert_eq!(ep.negotiated_cipher_strength, 40.0);
        assert_eq!(ep.max_cipher_strength, 128.0);
    }

    #[test]
    fn missing_endpoints_yield_no_information_summary() {
        let raw = json!({"host": "pending.example", "protocol": "http", "status": "READY"});
        let report = reduce_at(raw.to_string().as_bytes(), fixed_now()).unwrap();

        assert!(report.endpoints.is_empty());
        assert!(report.summary.contains("No valid information"));
    }

    #[test]
    fn two_year_certificate_validity() {
        let now = fixed_now();
        let t0 = now.timestamp_millis() - 30 * DAY_MS;
        let not_after = t0 + 730 * DAY_MS;

        let (years, days) = certificate_validity(t0 as f64, not_after as f64, now);

        assert_eq!(years, 2.0);
        assert_eq!(days, 700.0);
    }

    #[test]
    fn expiry_is_rounded_to_one_decimal() {
        let now = fixed_now();
        let now_ms = now.timestamp_millis();
        // 10 days and 6 hours left
        let not_after = now_ms + 10 * DAY_MS + DAY_MS / 4;

        let (_, days) = certificate_validity((now_ms - DAY_MS) as f64, not_after as f64, now);

        assert_eq!(days, 10.3);
    }

    #[test]
    fn zero_timestamps_give_zero_validity() {
        assert_eq!(certificate_validity(0.0, 1_700_000_000_000.0, fixed_now()), (0.0, 0.0));
        assert_eq!(certificate_validity(1_600_000_000_000.0, 0.0, fixed_now()), (0.0, 0.0));
    }

    #[test]
    fn reduction_is_reproducible_with_pinned_now() {
        let now = fixed_now();
        let raw = sample_report(now);

        assert_eq!(reduce_at(&raw, now).unwrap(), reduce_at(&raw, now).unwrap());
    }
}
