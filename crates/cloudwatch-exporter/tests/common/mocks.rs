// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory logging service for end-to-end invocation tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use cloudwatch_exporter::error::ServiceError;
use cloudwatch_exporter::logs_service::{
    ExportRequest, LogGroupDescriptor, LogStreamSummary, LogsService, Page,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// Run timestamp used by every invocation test: 2025-03-01T08:15:00Z.
pub fn run_started() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 15, 0).unwrap()
}

pub fn days_ago(days: i64) -> i64 {
    (run_started() - Duration::days(days)).timestamp_millis()
}

#[derive(Default)]
pub struct InMemoryLogs {
    groups: Vec<LogGroupDescriptor>,
    streams: HashMap<String, Vec<LogStreamSummary>>,
    page_size: usize,
    listing_error: Option<ServiceError>,
    export_errors: HashMap<String, ServiceError>,
    pub requests: Mutex<Vec<ExportRequest>>,
    pub listing_calls: Mutex<usize>,
}

impl InMemoryLogs {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    /// Adds a group with one stream per `(first, last)` event age in days.
    pub fn group(mut self, name: &str, stream_ages: &[(i64, i64)]) -> Self {
        let streams = stream_ages
            .iter()
            .enumerate()
            .map(|(i, (first, last))| LogStreamSummary {
                name: format!("stream-{i}"),
                creation_time: Some(days_ago(*first)),
                first_event_time: Some(days_ago(*first)),
                last_event_time: Some(days_ago(*last)),
            })
            .collect();
        self.streams.insert(name.to_string(), streams);
        self.groups
            .push(LogGroupDescriptor::new(name, days_ago(90)));
        self
    }

    pub fn failing_listing(mut self, error: ServiceError) -> Self {
        self.listing_error = Some(error);
        self
    }

    pub fn failing_export(mut self, name: &str, error: ServiceError) -> Self {
        self.export_errors.insert(name.to_string(), error);
        self
    }

    pub fn requested_groups(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.log_group_name.clone())
            .collect()
    }
}

fn paginate<T: Clone>(items: &[T], page_size: usize, next_token: Option<String>) -> Page<T> {
    let start: usize = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
    let end = (start + page_size).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        next_token: (end < items.len()).then(|| end.to_string()),
    }
}

#[async_trait]
impl LogsService for InMemoryLogs {
    async fn list_log_groups(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<LogGroupDescriptor>, ServiceError> {
        *self.listing_calls.lock().unwrap() += 1;
        if let Some(error) = &self.listing_error {
            return Err(error.clone());
        }
        Ok(paginate(&self.groups, self.page_size, next_token))
    }

    async fn find_log_group(
        &self,
        name: &str,
    ) -> Result<Option<LogGroupDescriptor>, ServiceError> {
        Ok(self.groups.iter().find(|g| g.name == name).cloned())
    }

    async fn list_log_streams(
        &self,
        log_group_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<LogStreamSummary>, ServiceError> {
        let mut streams = self
            .streams
            .get(log_group_name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(log_group_name.to_string()))?;
        streams.sort_by_key(|s| s.last_event_time);
        Ok(paginate(&streams, self.page_size, next_token))
    }

    async fn create_export_task(&self, request: &ExportRequest) -> Result<String, ServiceError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        match self.export_errors.get(&request.log_group_name) {
            Some(error) => Err(error.clone()),
            None => Ok(format!("export-{}", requests.len())),
        }
    }

    async fn export_task_status(&self, _task_id: &str) -> Result<String, ServiceError> {
        Ok("RUNNING".to_string())
    }
}
