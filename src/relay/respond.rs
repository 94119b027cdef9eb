//! Relay outcome rendering.
//!
//! Two output modes, selected by configuration: passthrough re-emits the
//! upstream body and a safe subset of headers; structured wraps status,
//! headers, and body in a JSON (optionally JSONP) envelope.

use axum::body::Body;
use axum::http::{header, HeaderName, HeaderValue};
use axum::response::Response;
use serde_json::{json, Map, Value};

use crate::relay::forward::{RelayOutcome, RelayStatus, ERROR_STATUS};
use crate::relay::input::RelayRequest;

/// Upstream headers re-emitted in passthrough mode.
const FORWARDED_HEADERS: [&str; 3] = ["content-type", "content-language", "set-cookie"];

fn is_forwardable(name: &str) -> bool {
    FORWARDED_HEADERS
        .iter()
        .any(|allowed| name.eq_ignore_ascii_case(allowed))
}

/// Re-emit the raw upstream body plus the whitelisted headers.
///
/// The proxy's own status line stays 200; failure is carried in the body,
/// matching the relay's sentinel-in-band error contract.
pub fn passthrough_response(outcome: RelayOutcome) -> Response {
    let mut response = Response::new(Body::from(outcome.body));

    for (name, value) in &outcome.headers {
        if !is_forwardable(name) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            response.headers_mut().append(name, value);
        }
    }

    response
}

/// Wrap the outcome in the `{headers?, status, contents}` JSON envelope.
pub fn structured_response(
    outcome: &RelayOutcome,
    request: &RelayRequest,
    enable_jsonp: bool,
) -> Response {
    let mut data = Map::new();

    if request.full_headers {
        let mut headers = Map::new();
        for (name, value) in &outcome.headers {
            headers.insert(name.clone(), Value::String(value.clone()));
        }
        data.insert("headers".to_string(), Value::Object(headers));
    }

    let status = match &outcome.status {
        RelayStatus::Upstream(status) if request.full_status => json!({
            "http_code": status.http_code,
            "url": status.url,
            "content_type": status.content_type,
        }),
        RelayStatus::Upstream(status) => json!({ "http_code": status.http_code }),
        RelayStatus::Error => json!({ "http_code": ERROR_STATUS }),
    };
    data.insert("status".to_string(), status);

    // Decode the body as JSON when it parses, else carry the raw text.
    let contents = serde_json::from_str::<Value>(&outcome.body)
        .unwrap_or_else(|_| Value::String(outcome.body.clone()));
    data.insert("contents".to_string(), contents);

    let envelope = Value::Object(data).to_string();
    let payload = match request.callback.as_deref().filter(|_| enable_jsonp) {
        Some(callback) => format!("{}({})", callback, envelope),
        None => envelope,
    };

    let content_type = if request.is_xhr {
        "application/json"
    } else {
        "application/x-javascript"
    };

    let mut response = Response::new(Body::from(payload));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::forward::UpstreamStatus;
    use axum::http::{HeaderMap, Method};
    use std::collections::HashMap;

    fn upstream_outcome() -> RelayOutcome {
        RelayOutcome {
            status: RelayStatus::Upstream(UpstreamStatus {
                http_code: 200,
                url: "https://example.com/data.json".to_string(),
                content_type: Some("application/json".to_string()),
            }),
            headers: vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("server".to_string(), "upstream/1.0".to_string()),
                ("set-cookie".to_string(), "a=1".to_string()),
                ("set-cookie".to_string(), "b=2".to_string()),
                ("content-language".to_string(), "de".to_string()),
            ],
            body: r#"{"answer":42}"#.to_string(),
        }
    }

    fn request_with(params: &[(&str, &str)], xhr: bool) -> RelayRequest {
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut headers = HeaderMap::new();
        if xhr {
            headers.insert(
                "x-requested-with",
                HeaderValue::from_static("XMLHttpRequest"),
            );
        }
        RelayRequest::from_parts(Method::GET, &headers, &params, b"")
    }

    #[test]
    fn test_passthrough_header_whitelist() {
        let response = passthrough_response(upstream_outcome());
        assert_eq!(response.status(), 200);

        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(header::CONTENT_LANGUAGE).unwrap(), "de");
        assert_eq!(
            headers
                .get_all(header::SET_COOKIE)
                .iter()
                .collect::<Vec<_>>()
                .len(),
            2
        );
        assert!(headers.get("server").is_none());
    }

    #[test]
    fn test_structured_minimal_status_and_decoded_body() {
        let request = request_with(&[], true);
        let response = structured_response(&upstream_outcome(), &request, false);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body = body_string(response);
        let envelope: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(envelope["status"], json!({ "http_code": 200 }));
        assert_eq!(envelope["contents"], json!({ "answer": 42 }));
        assert!(envelope.get("headers").is_none());
    }

    #[test]
    fn test_structured_full_headers_and_status() {
        let request = request_with(&[("full_headers", "1"), ("full_status", "1")], false);
        let response = structured_response(&upstream_outcome(), &request, false);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/x-javascript"
        );

        let envelope: Value = serde_json::from_str(&body_string(response)).unwrap();
        assert_eq!(envelope["status"]["http_code"], 200);
        assert_eq!(envelope["status"]["url"], "https://example.com/data.json");
        assert_eq!(envelope["headers"]["server"], "upstream/1.0");
    }

    #[test]
    fn test_structured_error_sentinel() {
        let outcome = RelayOutcome {
            status: RelayStatus::Error,
            headers: Vec::new(),
            body: "ERROR: url not specified".to_string(),
        };
        let request = request_with(&[], true);
        let envelope: Value =
            serde_json::from_str(&body_string(structured_response(&outcome, &request, false)))
                .unwrap();
        assert_eq!(envelope["status"]["http_code"], "ERROR");
        assert_eq!(envelope["contents"], "ERROR: url not specified");
    }

    #[test]
    fn test_jsonp_wrapping_requires_config_and_callback() {
        let outcome = upstream_outcome();

        let request = request_with(&[("callback", "handle")], false);
        let wrapped = body_string(structured_response(&outcome, &request, true));
        assert!(wrapped.starts_with("handle("));
        assert!(wrapped.ends_with(')'));

        // callback present but JSONP disabled in config
        let plain = body_string(structured_response(&outcome, &request, false));
        assert!(plain.starts_with('{'));

        // JSONP enabled but no callback supplied
        let request = request_with(&[], false);
        let plain = body_string(structured_response(&outcome, &request, true));
        assert!(plain.starts_with('{'));
    }

    fn body_string(response: Response) -> String {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(async move {
                let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                    .await
                    .unwrap();
                String::from_utf8(bytes.to_vec()).unwrap()
            })
    }
}
