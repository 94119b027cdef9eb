//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject unrecognized API deployment names before the service starts
//! - Validate value ranges (timeouts > 0, addresses parseable)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::recommender::deployment_origin;

/// A single semantic problem found in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("recommender.deployment \"{0}\" is not recognized (expected \"prod\", \"beta\", or \"dev\")")]
    UnknownDeployment(String),

    #[error("listener.bind_address \"{0}\" is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("recommender.base_url \"{0}\" is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("recommender.app_id must not be empty")]
    EmptyAppId,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if deployment_origin(&config.recommender.deployment).is_none() {
        errors.push(ValidationError::UnknownDeployment(
            config.recommender.deployment.clone(),
        ));
    }

    if let Some(base_url) = &config.recommender.base_url {
        if Url::parse(base_url).is_err() {
            errors.push(ValidationError::InvalidBaseUrl(base_url.clone()));
        }
    }

    if config.recommender.app_id.is_empty() {
        errors.push(ValidationError::EmptyAppId);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
