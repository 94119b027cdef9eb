//! Relay input captured at the handler boundary.

use std::collections::HashMap;

use axum::http::{header, HeaderMap, Method};

/// Everything the relay needs from the inbound request, captured once.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// Target URL (`url` query parameter).
    pub url: Option<String>,

    /// Inbound HTTP method, reused for the outbound call.
    pub method: Method,

    /// Form fields forwarded as the outbound body on POST.
    pub form: Vec<(String, String)>,

    /// Forward the inbound cookies to the target.
    pub send_cookies: bool,

    /// Additionally forward the session identifier (requires
    /// `send_cookies`).
    pub send_session: bool,

    /// Inbound cookies, parsed from the `Cookie` header(s).
    pub cookies: Vec<(String, String)>,

    /// Session identifier in `name=value` form, appended to the outbound
    /// cookie header when `send_session` is set. Populated by the
    /// embedding environment; this service itself has no session layer.
    pub session_id: Option<String>,

    /// Outbound user agent: the `user_agent` parameter if given, else the
    /// inbound `User-Agent` header.
    pub user_agent: Option<String>,

    /// Include the full upstream header map in the structured envelope.
    pub full_headers: bool,

    /// Include full upstream status info in the structured envelope
    /// instead of just the status code.
    pub full_status: bool,

    /// JSONP callback name (structured mode, only honored when enabled in
    /// the relay configuration).
    pub callback: Option<String>,

    /// Whether the caller is an in-page script call
    /// (`X-Requested-With: XMLHttpRequest`).
    pub is_xhr: bool,
}

impl RelayRequest {
    /// Capture the relay input from the inbound request parts.
    pub fn from_parts(
        method: Method,
        headers: &HeaderMap,
        params: &HashMap<String, String>,
        body: &[u8],
    ) -> Self {
        let form = if method == Method::POST {
            url::form_urlencoded::parse(body).into_owned().collect()
        } else {
            Vec::new()
        };

        let user_agent = params
            .get("user_agent")
            .filter(|ua| !ua.is_empty())
            .cloned()
            .or_else(|| header_value(headers, header::USER_AGENT.as_str()));

        let is_xhr = header_value(headers, "x-requested-with")
            .map(|v| v.eq_ignore_ascii_case("xmlhttprequest"))
            .unwrap_or(false);

        Self {
            url: params.get("url").cloned(),
            method,
            form,
            send_cookies: flag(params, "send_cookies"),
            send_session: flag(params, "send_session"),
            cookies: parse_cookies(headers),
            session_id: None,
            user_agent,
            full_headers: flag(params, "full_headers"),
            full_status: flag(params, "full_status"),
            callback: params.get("callback").filter(|c| !c.is_empty()).cloned(),
            is_xhr,
        }
    }
}

/// Query flag semantics: absent, empty, or "0" is off; anything else is on.
fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    match params.get(name) {
        Some(value) => !value.is_empty() && value != "0",
        None => false,
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Parse `Cookie` headers into name/value pairs, preserving order.
fn parse_cookies(headers: &HeaderMap) -> Vec<(String, String)> {
    let mut cookies = Vec::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else { continue };
        for pair in value.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            match pair.split_once('=') {
                Some((name, value)) => cookies.push((name.to_string(), value.to_string())),
                None => cookies.push((pair.to_string(), String::new())),
            }
        }
    }
    cookies
}
