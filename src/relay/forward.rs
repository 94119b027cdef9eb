//! Outbound relay call and outcome capture.

use axum::http::{header, Method};
use reqwest::Client;
use url::Url;

use crate::relay::input::RelayRequest;

/// Sentinel status reported when no upstream call produced a status code.
pub const ERROR_STATUS: &str = "ERROR";

/// Status info captured from a completed upstream call.
#[derive(Debug, Clone)]
pub struct UpstreamStatus {
    /// Upstream HTTP status code.
    pub http_code: u16,

    /// Final URL after redirects.
    pub url: String,

    /// Upstream `Content-Type`, if any.
    pub content_type: Option<String>,
}

/// Status of a relay attempt: either an upstream status or the sentinel.
#[derive(Debug, Clone)]
pub enum RelayStatus {
    Upstream(UpstreamStatus),
    Error,
}

/// Result of one relay invocation. Constructed per request, never persisted.
#[derive(Debug, Clone)]
pub struct RelayOutcome {
    pub status: RelayStatus,

    /// Upstream response headers in arrival order (`Set-Cookie` may repeat).
    pub headers: Vec<(String, String)>,

    /// Upstream body, or an error string when `status` is the sentinel.
    pub body: String,
}

impl RelayOutcome {
    fn error(body: impl Into<String>) -> Self {
        Self {
            status: RelayStatus::Error,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// The target must parse as an absolute http(s) URL. Replaces the
/// original's always-matching pattern check with the intended rule.
pub fn validate_target(target: &str) -> bool {
    match Url::parse(target) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Issue the outbound call described by `request` and capture the outcome.
///
/// Redirects are followed by the client. Transport failures surface as an
/// outcome with the sentinel status; they never abort the request.
pub async fn forward(client: &Client, request: &RelayRequest) -> RelayOutcome {
    let target = match request.url.as_deref() {
        None | Some("") => return RelayOutcome::error("ERROR: url not specified"),
        Some(target) => target,
    };

    if !validate_target(target) {
        return RelayOutcome::error("ERROR: invalid url");
    }

    let mut outbound = client.request(request.method.clone(), target);

    if request.method == Method::POST {
        outbound = outbound.form(&request.form);
    }

    if request.send_cookies {
        let cookie_header = assemble_cookie_header(request);
        if !cookie_header.is_empty() {
            outbound = outbound.header(header::COOKIE, cookie_header);
        }
    }

    if let Some(user_agent) = &request.user_agent {
        outbound = outbound.header(header::USER_AGENT, user_agent);
    }

    let response = match outbound.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(url = %target, error = %e, "Relay upstream call failed");
            return RelayOutcome::error(format!("ERROR: request to {} failed: {}", target, e));
        }
    };

    let status = UpstreamStatus {
        http_code: response.status().as_u16(),
        url: response.url().to_string(),
        content_type: response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url = %target, error = %e, "Relay upstream body read failed");
            return RelayOutcome::error(format!("ERROR: request to {} failed: {}", target, e));
        }
    };

    RelayOutcome {
        status: RelayStatus::Upstream(status),
        headers,
        body,
    }
}

/// Join the forwarded cookies (and the session identifier, when requested)
/// into a single outbound `Cookie` header value.
fn assemble_cookie_header(request: &RelayRequest) -> String {
    let mut pairs: Vec<String> = request
        .cookies
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();

    if request.send_session {
        if let Some(session_id) = &request.session_id {
            pairs.push(session_id.clone());
        }
    }

    pairs.join("; ")
}
