//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `retry_attempts` is 0 or above 10
    /// - `timeout_ms` is below 100ms or above 5 minutes
    /// - `request_delay_ms` exceeds 60s
    /// - `primary_ttl_seconds` or `section_list_ttl_seconds` is 0
    /// - `backup_ttl_multiplier` is 0 (backup must outlive primary)
    /// - `max_query_length`, `default_search_limit` or `quality_window` is 0
    /// - `sla_target` lies outside [0, 1]
    /// - `user_agent` or `base_url` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_attempts == 0 {
            return Err(invalid("retry_attempts", "must be at least 1"));
        }
        if self.retry_attempts > 10 {
            return Err(invalid("retry_attempts", "must not exceed 10"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.request_delay_ms > 60_000 {
            return Err(invalid("request_delay_ms", "must not exceed 60000ms"));
        }

        if self.primary_ttl_seconds == 0 {
            return Err(invalid("primary_ttl_seconds", "must be greater than 0"));
        }
        if self.section_list_ttl_seconds == 0 {
            return Err(invalid("section_list_ttl_seconds", "must be greater than 0"));
        }
        if self.backup_ttl_multiplier == 0 {
            return Err(invalid("backup_ttl_multiplier", "must be at least 1"));
        }

        if self.max_query_length == 0 {
            return Err(invalid("max_query_length", "must be greater than 0"));
        }
        if self.default_search_limit == 0 {
            return Err(invalid("default_search_limit", "must be greater than 0"));
        }
        if self.quality_window == 0 {
            return Err(invalid("quality_window", "must be greater than 0"));
        }

        if !(0.0..=1.0).contains(&self.sla_target) {
            return Err(invalid("sla_target", "must be between 0 and 1"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url", "must not be empty"));
        }

        if self.request_delay_ms == 0 {
            tracing::warn!("request_delay_ms is 0; outbound requests to the origin are not spaced");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ConfigError>) -> Option<String> {
        match result {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_retry_attempts_zero() {
        let config = AppConfig { retry_attempts: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("retry_attempts"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("timeout_ms"));
    }

    #[test]
    fn test_validate_backup_multiplier_zero() {
        let config = AppConfig { backup_ttl_multiplier: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("backup_ttl_multiplier"));
    }

    #[test]
    fn test_validate_primary_ttl_zero() {
        let config = AppConfig { primary_ttl_seconds: 0, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("primary_ttl_seconds"));
    }

    #[test]
    fn test_validate_sla_target_range() {
        let config = AppConfig { sla_target: 1.5, ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("sla_target"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(field_of(config.validate()).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { retry_attempts: 1, timeout_ms: 100, request_delay_ms: 0, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { retry_attempts: 10, timeout_ms: 300_000, request_delay_ms: 60_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
