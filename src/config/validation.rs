//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port valid)
//! - Check the search cluster URL (plain http only) and index names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before any plugin is constructed

use std::fmt;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.address.trim().is_empty() {
        errors.push(ValidationError::new("listener.address", "must not be empty"));
    }
    if config.listener.port == 0 {
        errors.push(ValidationError::new("listener.port", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.observability.log_max_size_mb == 0 {
        errors.push(ValidationError::new(
            "observability.log_max_size_mb",
            "must be greater than 0",
        ));
    }
    if config.plugins.catch_all.is_empty() {
        errors.push(ValidationError::new("plugins.catch_all", "must not be empty"));
    }

    match Url::parse(&config.search.url) {
        Ok(url) if url.scheme() == "http" => {}
        Ok(url) => errors.push(ValidationError::new(
            "search.url",
            format!(
                "unsupported scheme {:?}, the search proxy only speaks plain http",
                url.scheme()
            ),
        )),
        Err(e) => errors.push(ValidationError::new("search.url", e.to_string())),
    }

    for (field, index) in [
        ("search.users_index", &config.search.users_index),
        ("search.permissions_index", &config.search.permissions_index),
    ] {
        if let Some(problem) = index_name_problem(index) {
            errors.push(ValidationError::new(field, problem));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn index_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("must not be empty")
    } else if name.chars().any(|c| c.is_ascii_uppercase()) {
        Some("must be lowercase")
    } else if name.contains([' ', '/', '\\', '*', '?', '"', '<', '>', '|', ',', '#']) {
        Some("contains a character not allowed in index names")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.port = 0;
        config.timeouts.request_secs = 0;
        config.observability.log_max_size_mb = 0;
        config.plugins.catch_all.clear();
        config.search.url = "ftp://search".into();
        config.search.users_index = "Users".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.port",
                "timeouts.request_secs",
                "observability.log_max_size_mb",
                "plugins.catch_all",
                "search.url",
                "search.users_index",
            ]
        );
    }

    #[test]
    fn test_https_cluster_rejected() {
        let mut config = GatewayConfig::default();
        config.search.url = "https://search.example.com:9200".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "search.url");
        assert!(errors[0].message.contains("plain http"));
    }

    #[test]
    fn test_unparseable_url() {
        let mut config = GatewayConfig::default();
        config.search.url = "not a url".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "search.url");
    }
}
