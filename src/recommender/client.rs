//! Recommendation API client: deployment selection, lookup URLs, and the
//! id → title fallback sequence.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::config::schema::{RecommenderConfig, TimeoutConfig};
use crate::recommender::model::{parse_related_articles, Recommendation};

/// The legacy lookup is pinned to the beta deployment.
pub const LEGACY_DEPLOYMENT: &str = "beta";

/// Map a named API deployment to its origin.
pub fn deployment_origin(name: &str) -> Option<&'static str> {
    match name {
        "prod" => Some("https://api.mr-dlib.org"),
        "beta" => Some("https://api-beta.mr-dlib.org"),
        "dev" => Some("https://api-dev.mr-dlib.org"),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum RecommendError {
    /// Unrecognized deployment name; normally caught by config validation
    /// before a client is ever built.
    #[error("Error: API version could not be correctly read from config file.")]
    UnknownDeployment(String),

    #[error("recommendation API origin is not a usable base URL")]
    InvalidOrigin,

    #[error("failed to build recommendation API client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Error: request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Error: No recommendations could be retrieved.")]
    NoRecommendations,
}

/// Client for the related-documents API.
///
/// Holds the resolved origins and partner tag; safe to share across
/// requests (the underlying HTTP client pools connections internally).
pub struct RecommenderClient {
    http: Client,
    origin: Url,
    legacy_origin: Url,
    app_id: String,
}

impl RecommenderClient {
    /// Build a client from validated configuration.
    pub fn from_config(
        config: &RecommenderConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, RecommendError> {
        let origin = match &config.base_url {
            Some(base) => base.clone(),
            None => deployment_origin(&config.deployment)
                .ok_or_else(|| RecommendError::UnknownDeployment(config.deployment.clone()))?
                .to_string(),
        };
        let origin = Url::parse(&origin).map_err(|_| RecommendError::InvalidOrigin)?;

        // The legacy endpoint ignores the configured deployment, but a
        // base_url override still wins so tests can inject a mock origin.
        let legacy_origin = match &config.base_url {
            Some(_) => origin.clone(),
            None => deployment_origin(LEGACY_DEPLOYMENT)
                .and_then(|origin| Url::parse(origin).ok())
                .ok_or(RecommendError::InvalidOrigin)?,
        };

        // TLS peer verification is off for the upstream API.
        let http = Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(RecommendError::ClientBuild)?;

        Ok(Self {
            http,
            origin,
            legacy_origin,
            app_id: config.app_id.clone(),
        })
    }

    /// Lookup URL for the renderer: keyed by document id or title, tagged
    /// with the partner `app_id`.
    pub fn lookup_url(&self, key: &str) -> Result<Url, RecommendError> {
        let mut url = related_documents_url(&self.origin, key)?;
        url.query_pairs_mut().append_pair("app_id", &self.app_id);
        Ok(url)
    }

    /// Lookup URL for the legacy endpoint: beta deployment, no partner tag.
    pub fn legacy_url(&self, id: &str) -> Result<Url, RecommendError> {
        related_documents_url(&self.legacy_origin, id)
    }

    /// Fetch a lookup URL and return the raw payload text.
    ///
    /// Transport failures are fatal to the caller; there is no retry here.
    pub async fn fetch_xml(&self, url: Url) -> Result<String, RecommendError> {
        let response = self
            .http
            .get(url.clone())
            .header("cache-control", "no-cache")
            .send()
            .await
            .map_err(|source| RecommendError::Transport {
                url: url.to_string(),
                source,
            })?;

        response
            .text()
            .await
            .map_err(|source| RecommendError::Transport {
                url: url.to_string(),
                source,
            })
    }

    /// Retrieve recommendations for a document id, falling back to a title
    /// lookup when the id lookup yields no parseable, non-empty payload.
    ///
    /// The two lookups are strictly sequential. Both failing validation is
    /// fatal; a transport failure on either call is fatal immediately.
    pub async fn lookup(
        &self,
        id: Option<&str>,
        title: Option<&str>,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        for key in [id, title].into_iter().flatten() {
            if key.is_empty() {
                continue;
            }

            let url = self.lookup_url(key)?;
            tracing::debug!(url = %url, "Requesting recommendations");
            let payload = self.fetch_xml(url).await?;

            match parse_related_articles(&payload) {
                Ok(recommendations) if !recommendations.is_empty() => {
                    return Ok(recommendations);
                }
                Ok(_) => tracing::debug!(key = %key, "Lookup returned zero recommendations"),
                Err(e) => tracing::debug!(key = %key, error = %e, "Lookup payload not parseable"),
            }
        }

        Err(RecommendError::NoRecommendations)
    }
}

fn related_documents_url(origin: &Url, key: &str) -> Result<Url, RecommendError> {
    let mut url = origin.clone();
    url.path_segments_mut()
        .map_err(|_| RecommendError::InvalidOrigin)?
        .extend(["v1", "documents", key, "related_documents"]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(deployment: &str, base_url: Option<&str>) -> RecommenderClient {
        let config = RecommenderConfig {
            deployment: deployment.to_string(),
            base_url: base_url.map(str::to_string),
            ..RecommenderConfig::default()
        };
        RecommenderClient::from_config(&config, &TimeoutConfig::default()).unwrap()
    }

    #[test]
    fn test_deployment_origins() {
        assert_eq!(deployment_origin("prod"), Some("https://api.mr-dlib.org"));
        assert_eq!(deployment_origin("beta"), Some("https://api-beta.mr-dlib.org"));
        assert_eq!(deployment_origin("dev"), Some("https://api-dev.mr-dlib.org"));
        assert_eq!(deployment_origin("staging"), None);
    }

    #[test]
    fn test_unknown_deployment_rejected() {
        let config = RecommenderConfig {
            deployment: "staging".to_string(),
            ..RecommenderConfig::default()
        };
        let err = RecommenderClient::from_config(&config, &TimeoutConfig::default())
            .err()
            .unwrap();
        assert!(matches!(err, RecommendError::UnknownDeployment(_)));
    }

    #[test]
    fn test_lookup_url_shape() {
        let client = client_for("prod", None);
        let url = client.lookup_url("4328").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.mr-dlib.org/v1/documents/4328/related_documents?app_id=mediatum"
        );
    }

    #[test]
    fn test_lookup_url_encodes_title_keys() {
        let client = client_for("dev", None);
        let url = client.lookup_url("Example Paper").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api-dev.mr-dlib.org/v1/documents/Example%20Paper/related_documents?app_id=mediatum"
        );
    }

    #[test]
    fn test_legacy_url_is_beta_without_app_id() {
        let client = client_for("prod", None);
        let url = client.legacy_url("77").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api-beta.mr-dlib.org/v1/documents/77/related_documents"
        );
    }

    #[test]
    fn test_base_url_override_wins_for_both_endpoints() {
        let client = client_for("prod", Some("http://127.0.0.1:9201"));
        assert!(client
            .lookup_url("1")
            .unwrap()
            .as_str()
            .starts_with("http://127.0.0.1:9201/v1/documents/1/"));
        assert!(client
            .legacy_url("1")
            .unwrap()
            .as_str()
            .starts_with("http://127.0.0.1:9201/v1/documents/1/"));
    }
}
