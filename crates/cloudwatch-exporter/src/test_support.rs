// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory logging service shared by the unit tests.

#![cfg(test)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::ServiceError;
use crate::logs_service::{
    ExportRequest, LogGroupDescriptor, LogStreamSummary, LogsService, Page,
};

/// Fixed wall clock used across tests: 2025-06-15T12:30:45Z.
pub(crate) fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 12, 30, 45).unwrap()
}

pub(crate) fn days_ago(days: i64) -> i64 {
    (test_now() - Duration::days(days)).timestamp_millis()
}

/// A stream whose events span `first_days_ago` to `last_days_ago`.
pub(crate) fn stream(name: &str, first_days_ago: i64, last_days_ago: i64) -> LogStreamSummary {
    LogStreamSummary {
        name: name.to_string(),
        creation_time: Some(days_ago(first_days_ago)),
        first_event_time: Some(days_ago(first_days_ago)),
        last_event_time: Some(days_ago(last_days_ago)),
    }
}

pub(crate) struct MockLogsService {
    groups: Vec<LogGroupDescriptor>,
    streams: HashMap<String, Vec<LogStreamSummary>>,
    page_size: usize,
    listing_error: Option<ServiceError>,
    lookup_errors: HashMap<String, ServiceError>,
    stream_errors: HashMap<String, ServiceError>,
    export_responses: Mutex<VecDeque<Result<String, ServiceError>>>,
    status_error: Option<ServiceError>,
    pub(crate) export_requests: Mutex<Vec<ExportRequest>>,
}

impl MockLogsService {
    pub(crate) fn new() -> Self {
        Self {
            groups: Vec::new(),
            streams: HashMap::new(),
            page_size: 50,
            listing_error: None,
            lookup_errors: HashMap::new(),
            stream_errors: HashMap::new(),
            export_responses: Mutex::new(VecDeque::new()),
            status_error: None,
            export_requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_group(
        mut self,
        group: LogGroupDescriptor,
        streams: Vec<LogStreamSummary>,
    ) -> Self {
        self.streams.insert(group.name.clone(), streams);
        self.groups.push(group);
        self
    }

    pub(crate) fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub(crate) fn with_listing_error(mut self, error: ServiceError) -> Self {
        self.listing_error = Some(error);
        self
    }

    pub(crate) fn with_lookup_error(mut self, name: &str, error: ServiceError) -> Self {
        self.lookup_errors.insert(name.to_string(), error);
        self
    }

    pub(crate) fn with_stream_error(mut self, name: &str, error: ServiceError) -> Self {
        self.stream_errors.insert(name.to_string(), error);
        self
    }

    /// Queues the result of the next `create_export_task` call. Unscripted
    /// calls succeed with `task-<n>`.
    pub(crate) fn with_export_response(self, response: Result<String, ServiceError>) -> Self {
        self.export_responses.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn with_status_error(mut self, error: ServiceError) -> Self {
        self.status_error = Some(error);
        self
    }

    pub(crate) fn export_requests(&self) -> Vec<ExportRequest> {
        self.export_requests.lock().unwrap().clone()
    }

    fn page<T: Clone>(&self, items: &[T], next_token: Option<String>) -> Page<T> {
        let start = next_token
            .map(|token| token.parse::<usize>().unwrap())
            .unwrap_or(0);
        let end = (start + self.page_size).min(items.len());
        Page {
            items: items[start..end].to_vec(),
            next_token: (end < items.len()).then(|| end.to_string()),
        }
    }
}

#[async_trait]
impl LogsService for MockLogsService {
    async fn list_log_groups(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<LogGroupDescriptor>, ServiceError> {
        if let Some(error) = &self.listing_error {
            return Err(error.clone());
        }
        Ok(self.page(&self.groups, next_token))
    }

    async fn find_log_group(
        &self,
        name: &str,
    ) -> Result<Option<LogGroupDescriptor>, ServiceError> {
        if let Some(error) = self.lookup_errors.get(name) {
            return Err(error.clone());
        }
        Ok(self.groups.iter().find(|group| group.name == name).cloned())
    }

    async fn list_log_streams(
        &self,
        log_group_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<LogStreamSummary>, ServiceError> {
        if let Some(error) = self.stream_errors.get(log_group_name) {
            return Err(error.clone());
        }
        let mut streams = self
            .streams
            .get(log_group_name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(log_group_name.to_string()))?;
        streams.sort_by_key(|stream| stream.last_event_time);
        Ok(self.page(&streams, next_token))
    }

    async fn create_export_task(&self, request: &ExportRequest) -> Result<String, ServiceError> {
        let mut requests = self.export_requests.lock().unwrap();
        requests.push(request.clone());
        let n = requests.len();
        self.export_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("task-{n}")))
    }

    async fn export_task_status(&self, _task_id: &str) -> Result<String, ServiceError> {
        match &self.status_error {
            Some(error) => Err(error.clone()),
            None => Ok("PENDING".to_string()),
        }
    }
}
