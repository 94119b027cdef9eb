//! HTTP server setup and request handlers.
//!
//! # Responsibilities
//! - Create Axum Router with the relay, renderer, and legacy handlers
//! - Wire up middleware (tracing, timeout, request ID, CORS header)
//! - Bind server to listener, serve with graceful shutdown
//! - Map subsystem errors to the plain-text bodies callers expect

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ProxyConfig, RelayMode};
use crate::http::request::MakeRequestUuid;
use crate::recommender::render::{render_fragment, DisplayVariant, RenderedRecommendation};
use crate::recommender::{legacy, parse_related_articles, RecommendError, RecommenderClient};
use crate::relay::{forward, passthrough_response, structured_response, RelayRequest};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub relay_client: reqwest::Client,
    pub recommender: Arc<RecommenderClient>,
}

/// HTTP server for the widget proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, RecommendError> {
        let recommender = Arc::new(RecommenderClient::from_config(
            &config.recommender,
            &config.timeouts,
        )?);

        // Relay client: redirects followed, certificates verified.
        let relay_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(RecommendError::ClientBuild)?;

        let state = AppState {
            config: Arc::new(config),
            relay_client,
            recommender,
        };

        let router = Self::build_router(state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

        Router::new()
            .route("/relay", any(relay_handler))
            .route("/recommendations", get(recommendations_handler))
            .route("/related", get(related_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            // Every endpoint is meant for cross-origin embedding.
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
    }

    /// Run the server, accepting connections on the given listener until
    /// Ctrl+C or the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutdown signal received");
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown triggered");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Generic relay: forward the inbound request to the `url` target and
/// re-emit the outcome in the configured output mode.
async fn relay_handler(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RelayRequest::from_parts(method, &headers, &params, &body);

    tracing::debug!(
        url = request.url.as_deref().unwrap_or("<none>"),
        method = %request.method,
        "Relaying request"
    );

    let outcome = forward(&state.relay_client, &request).await;

    match state.config.relay.mode {
        RelayMode::Passthrough => passthrough_response(outcome),
        RelayMode::Structured => {
            structured_response(&outcome, &request, state.config.relay.enable_jsonp)
        }
    }
}

/// Recommendation renderer: id lookup with title fallback, rendered as an
/// embeddable HTML fragment. Fatal conditions answer with plain text.
async fn recommendations_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let id = params.get("id").map(String::as_str);
    let title = params.get("title").map(String::as_str);
    // The user identifier is opaque; non-numeric values select no variant.
    let user = params.get("user").and_then(|user| user.parse::<u64>().ok());
    let variant = DisplayVariant::for_user(user);

    match state.recommender.lookup(id, title).await {
        Ok(records) => {
            let items: Vec<RenderedRecommendation> = records
                .iter()
                .map(RenderedRecommendation::from_record)
                .collect();
            tracing::debug!(count = items.len(), "Rendering recommendations");
            Html(render_fragment(variant, &items)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Recommendation lookup failed");
            e.to_string().into_response()
        }
    }
}

/// Legacy related-documents lookup: beta deployment, no fallback, parser
/// errors echoed inline.
async fn related_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(id) = params.get("id").filter(|id| !id.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing id parameter").into_response();
    };

    let url = match state.recommender.legacy_url(id) {
        Ok(url) => url,
        Err(e) => return e.to_string().into_response(),
    };

    let payload = match state.recommender.fetch_xml(url).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "Legacy lookup failed");
            return Html(legacy::render_parse_failure(&e.to_string())).into_response();
        }
    };

    match parse_related_articles(&payload) {
        Ok(records) => Html(legacy::render_related_documents(
            &records,
            &state.config.recommender.click_log_base,
        ))
        .into_response(),
        Err(e) => Html(legacy::render_parse_failure(&e.to_string())).into_response(),
    }
}
