// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

const DEFAULT_DAYS_THRESHOLD: u32 = 3;
const DEFAULT_DEADLINE_SAFETY_MARGIN_SECS: u64 = 10;
// a century; keeps cutoff arithmetic well inside chrono's range
const MAX_DAYS_THRESHOLD: u32 = 36_500;
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration for the exporter, read once per cold start
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Destination S3 bucket for export tasks
    pub s3_bucket: String,
    /// Minimum age, in days, of log data before it is exported
    pub days_threshold: u32,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
    /// AWS region override, otherwise the SDK default chain decides
    pub region: Option<String>,
    /// CloudWatch Logs endpoint override, used against localstack
    pub endpoint_url: Option<String>,
    /// No new log group is started once less than this remains before the
    /// invocation deadline
    pub deadline_safety_margin: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            s3_bucket: String::new(),
            days_threshold: DEFAULT_DAYS_THRESHOLD,
            log_level: "info".to_string(),
            region: None,
            endpoint_url: None,
            deadline_safety_margin: Duration::from_secs(DEFAULT_DEADLINE_SAFETY_MARGIN_SECS),
        }
    }
}

impl ExporterConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let s3_bucket = env::var("S3_BUCKET_NAME")
            .map_err(|_| ConfigError::Missing("S3_BUCKET_NAME"))?;
        let days_threshold = match env::var("DAYS_THRESHOLD") {
            Ok(val) => val.trim().parse::<u32>().map_err(|_| {
                ConfigError::Invalid(format!("DAYS_THRESHOLD must be a whole number, got '{val}'"))
            })?,
            Err(_) => DEFAULT_DAYS_THRESHOLD,
        };
        let log_level = env::var("LOG_LEVEL")
            .map(|val| val.to_lowercase())
            .unwrap_or_else(|_| "info".to_string());
        let region = env::var("AWS_REGION").ok().filter(|val| !val.is_empty());
        let endpoint_url = env::var("LOGS_ENDPOINT_URL")
            .ok()
            .filter(|val| !val.is_empty());
        let deadline_safety_margin = match env::var("DEADLINE_SAFETY_MARGIN_SECS") {
            Ok(val) => Duration::from_secs(val.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "DEADLINE_SAFETY_MARGIN_SECS must be a whole number of seconds, got '{val}'"
                ))
            })?),
            Err(_) => Duration::from_secs(DEFAULT_DEADLINE_SAFETY_MARGIN_SECS),
        };

        let config = Self {
            s3_bucket,
            days_threshold,
            log_level,
            region,
            endpoint_url,
            deadline_safety_margin,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.s3_bucket.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "S3_BUCKET_NAME cannot be empty".to_string(),
            ));
        }

        if self.days_threshold == 0 || self.days_threshold > MAX_DAYS_THRESHOLD {
            return Err(ConfigError::Invalid(format!(
                "DAYS_THRESHOLD must be between 1 and {MAX_DAYS_THRESHOLD}, got {}",
                self.days_threshold
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.log_level
            )));
        }

        Ok(())
    }
}
