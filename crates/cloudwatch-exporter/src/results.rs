// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::eligibility::SkipReason;
use crate::error::ErrorKind;

/// What happened to one selected log group. Every selected group produces
/// exactly one outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Created {
        task_id: String,
        log_group_name: String,
        streams_count: usize,
        destination_prefix: String,
        status: String,
    },
    Skipped {
        log_group_name: String,
        reason: SkipReason,
    },
    Failed {
        log_group_name: String,
        error_kind: ErrorKind,
        message: String,
    },
}

impl ExportOutcome {
    pub fn log_group_name(&self) -> &str {
        match self {
            ExportOutcome::Created { log_group_name, .. }
            | ExportOutcome::Skipped { log_group_name, .. }
            | ExportOutcome::Failed { log_group_name, .. } => log_group_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub processed_count: usize,
    pub created_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    /// Streams covered by created export tasks
    pub total_streams: usize,
    pub outcomes: Vec<ExportOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Tallies outcomes in the order they are produced.
#[derive(Debug)]
pub struct ResultAggregator {
    started_at: DateTime<Utc>,
    created_count: usize,
    skipped_count: usize,
    failed_count: usize,
    total_streams: usize,
    outcomes: Vec<ExportOutcome>,
}

impl ResultAggregator {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            created_count: 0,
            skipped_count: 0,
            failed_count: 0,
            total_streams: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: ExportOutcome) {
        match &outcome {
            ExportOutcome::Created { streams_count, .. } => {
                self.created_count += 1;
                self.total_streams += streams_count;
            }
            ExportOutcome::Skipped { .. } => self.skipped_count += 1,
            ExportOutcome::Failed { .. } => self.failed_count += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(self, finished_at: DateTime<Utc>) -> RunResult {
        RunResult {
            processed_count: self.outcomes.len(),
            created_count: self.created_count,
            skipped_count: self.skipped_count,
            failed_count: self.failed_count,
            total_streams: self.total_streams,
            outcomes: self.outcomes,
            started_at: self.started_at,
            finished_at,
        }
    }
}

/// `results` object of the invocation response.
///
/// `skipped_log_groups` counts every group without a created task, failed
/// ones included, so `processed_log_groups == created_export_tasks +
/// skipped_log_groups` and each `errors` entry is also a skipped group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsBody {
    pub processed_log_groups: usize,
    pub created_export_tasks: usize,
    pub skipped_log_groups: usize,
    pub export_tasks: Vec<ExportTaskEntry>,
    pub errors: Vec<ErrorEntry>,
    pub total_streams_processed: usize,
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTaskEntry {
    pub task_id: String,
    pub log_group_name: String,
    pub streams_count: usize,
    pub destination_prefix: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEntry {
    pub log_group_name: String,
    pub error_kind: ErrorKind,
    pub error: String,
}

impl From<&RunResult> for ResultsBody {
    fn from(result: &RunResult) -> Self {
        let mut export_tasks = Vec::with_capacity(result.created_count);
        let mut errors = Vec::with_capacity(result.failed_count);
        for outcome in &result.outcomes {
            match outcome {
                ExportOutcome::Created {
                    task_id,
                    log_group_name,
                    streams_count,
                    destination_prefix,
                    status,
                } => export_tasks.push(ExportTaskEntry {
                    task_id: task_id.clone(),
                    log_group_name: log_group_name.clone(),
                    streams_count: *streams_count,
                    destination_prefix: destination_prefix.clone(),
                    status: status.clone(),
                }),
                ExportOutcome::Skipped { .. } => {}
                ExportOutcome::Failed {
                    log_group_name,
                    error_kind,
                    message,
                } => errors.push(ErrorEntry {
                    log_group_name: log_group_name.clone(),
                    error_kind: *error_kind,
                    error: message.clone(),
                }),
            }
        }

        let duration = result.finished_at - result.started_at;
        ResultsBody {
            processed_log_groups: result.processed_count,
            created_export_tasks: result.created_count,
            skipped_log_groups: result.skipped_count + result.failed_count,
            export_tasks,
            errors,
            total_streams_processed: result.total_streams,
            start_time: result.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            end_time: result.finished_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            duration_seconds: duration.num_milliseconds() as f64 / 1000.0,
        }
    }
}
