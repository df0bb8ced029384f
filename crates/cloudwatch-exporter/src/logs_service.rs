// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The logging service the exporter talks to, reduced to the five calls it
//! needs. [`crate::cloudwatch::CloudWatchLogsService`] is the production
//! implementation; tests provide in-memory ones.

use async_trait::async_trait;

use crate::error::ServiceError;

/// Snapshot of a log group as returned by the listing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogGroupDescriptor {
    pub name: String,
    /// Milliseconds since the epoch
    pub creation_time: i64,
    pub stored_bytes: i64,
    pub retention_days: Option<i32>,
}

impl LogGroupDescriptor {
    pub fn new(name: impl Into<String>, creation_time: i64) -> Self {
        Self {
            name: name.into(),
            creation_time,
            stored_bytes: 0,
            retention_days: None,
        }
    }
}

/// Timestamps of one log stream, all in milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogStreamSummary {
    pub name: String,
    pub creation_time: Option<i64>,
    pub first_event_time: Option<i64>,
    pub last_event_time: Option<i64>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// Parameters of one export task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub log_group_name: String,
    /// Inclusive start, milliseconds since the epoch
    pub from_time: i64,
    /// Exclusive end, milliseconds since the epoch
    pub to_time: i64,
    pub destination_bucket: String,
    pub destination_prefix: String,
}

#[async_trait]
pub trait LogsService: Send + Sync {
    /// Returns one page of all log groups in the account region.
    async fn list_log_groups(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<LogGroupDescriptor>, ServiceError>;

    /// Looks up a log group by exact name. `Ok(None)` when no group has that
    /// name.
    async fn find_log_group(&self, name: &str)
        -> Result<Option<LogGroupDescriptor>, ServiceError>;

    /// Returns one page of the group's streams, ordered by last event time,
    /// oldest first.
    async fn list_log_streams(
        &self,
        log_group_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<LogStreamSummary>, ServiceError>;

    /// Submits an export task and returns its identifier.
    async fn create_export_task(&self, request: &ExportRequest) -> Result<String, ServiceError>;

    /// Returns the status code of an export task, e.g. `RUNNING`.
    async fn export_task_status(&self, task_id: &str) -> Result<String, ServiceError>;
}
