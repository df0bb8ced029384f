// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::ExporterConfig;
use crate::eligibility::{self, Eligibility, SkipReason};
use crate::error::{ErrorKind, ExporterError};
use crate::logs_service::{ExportRequest, LogGroupDescriptor, LogsService};
use crate::results::{ExportOutcome, ResultAggregator, RunResult};
use crate::selector::{self, Candidate, SelectionMode};

/// Folder name format of one run under a log group's prefix. Downstream
/// consumers scan the bucket by this layout.
pub const RUN_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Turns a log group name into a single path segment: leading slashes are
/// dropped, `/` and spaces become `_`, and anything other than
/// alphanumerics, `-`, `_` and `.` is removed.
///
/// `/aws/lambda/my-function` becomes `aws_lambda_my-function`, i.e.
/// `{source-type}_{group-name}`.
pub fn sanitize_group_name(log_group_name: &str) -> String {
    log_group_name
        .trim_start_matches('/')
        .chars()
        .map(|c| if c == '/' || c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// `{sanitized-group-name}/{run-timestamp}`. CloudWatch appends the task id
/// and stream names below it.
pub fn destination_prefix(log_group_name: &str, run_started: DateTime<Utc>) -> String {
    format!(
        "{}/{}",
        sanitize_group_name(log_group_name),
        run_started.format(RUN_TIMESTAMP_FORMAT)
    )
}

/// Drives one invocation: select, filter, export, aggregate.
pub struct Exporter<S: ?Sized> {
    service: Arc<S>,
    s3_bucket: String,
    days_threshold: u32,
    deadline_safety_margin: Duration,
}

impl<S> Exporter<S>
where
    S: LogsService + ?Sized,
{
    pub fn new(service: Arc<S>, config: &ExporterConfig) -> Self {
        Self {
            service,
            s3_bucket: config.s3_bucket.clone(),
            days_threshold: config.days_threshold,
            deadline_safety_margin: Duration::from_std(config.deadline_safety_margin)
                .unwrap_or_else(|_| Duration::zero()),
        }
    }

    pub fn s3_bucket(&self) -> &str {
        &self.s3_bucket
    }

    pub fn days_threshold(&self) -> u32 {
        self.days_threshold
    }

    /// Processes the selected log groups one at a time, in selection order.
    ///
    /// `started_at` is both the age reference and the run timestamp in every
    /// destination prefix. Once `deadline` minus the safety margin has
    /// passed, the remaining groups are skipped so the response still goes
    /// out; the next scheduled run picks them up.
    pub async fn run(
        &self,
        mode: &SelectionMode,
        started_at: DateTime<Utc>,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<RunResult, ExporterError> {
        let candidates = selector::select(self.service.as_ref(), mode)
            .await
            .map_err(ExporterError::Listing)?;

        if candidates.is_empty() {
            warn!("No log groups found to process");
        } else {
            info!("Starting processing of {} log groups", candidates.len());
        }

        let total = candidates.len();
        let mut aggregator = ResultAggregator::new(started_at);
        for (index, candidate) in candidates.into_iter().enumerate() {
            if self.deadline_reached(deadline) {
                warn!(
                    "Invocation deadline approaching, deferring {} to the next run",
                    candidate.name()
                );
                aggregator.record(ExportOutcome::Skipped {
                    log_group_name: candidate.name().to_string(),
                    reason: SkipReason::DeadlineExceeded,
                });
                continue;
            }

            let span = info_span!("log_group", name = candidate.name());
            let outcome = async {
                info!("Processing log group {}/{total}", index + 1);
                self.process(candidate, started_at).await
            }
            .instrument(span)
            .await;
            aggregator.record(outcome);
        }

        let result = aggregator.finish(Utc::now());
        info!(
            "Summary: {} processed, {} exported, {} skipped, {} errors",
            result.processed_count,
            result.created_count,
            result.skipped_count,
            result.failed_count
        );
        Ok(result)
    }

    fn deadline_reached(&self, deadline: Option<DateTime<Utc>>) -> bool {
        deadline.is_some_and(|deadline| {
            Utc::now()
                .checked_add_signed(self.deadline_safety_margin)
                .map_or(true, |latest_start| latest_start >= deadline)
        })
    }

    async fn process(&self, candidate: Candidate, started_at: DateTime<Utc>) -> ExportOutcome {
        match candidate {
            Candidate::Found(group) => self.export_group(&group, started_at).await,
            Candidate::Missing(name) => ExportOutcome::Failed {
                message: format!("Log group not found: {name}"),
                log_group_name: name,
                error_kind: ErrorKind::NotFound,
            },
            Candidate::LookupFailed { name, error } => ExportOutcome::Failed {
                log_group_name: name,
                error_kind: ErrorKind::from(&error),
                message: format!("Error checking log group: {error}"),
            },
        }
    }

    async fn export_group(
        &self,
        group: &LogGroupDescriptor,
        started_at: DateTime<Utc>,
    ) -> ExportOutcome {
        let plan = match eligibility::evaluate(
            self.service.as_ref(),
            group,
            started_at,
            self.days_threshold,
        )
        .await
        {
            Ok(Eligibility::Eligible(plan)) => plan,
            Ok(Eligibility::Ineligible(reason)) => {
                info!("Skipping {}: {reason}", group.name);
                return ExportOutcome::Skipped {
                    log_group_name: group.name.clone(),
                    reason,
                };
            }
            Err(err) => {
                error!("Error getting log streams for {}: {err}", group.name);
                return ExportOutcome::Failed {
                    log_group_name: group.name.clone(),
                    error_kind: ErrorKind::from(&err),
                    message: format!("Error getting log streams: {err}"),
                };
            }
        };

        let request = ExportRequest {
            log_group_name: group.name.clone(),
            from_time: plan.from_time,
            to_time: plan.to_time,
            destination_bucket: self.s3_bucket.clone(),
            destination_prefix: destination_prefix(&group.name, started_at),
        };

        let task_id = match self.service.create_export_task(&request).await {
            Ok(task_id) => task_id,
            Err(err) => {
                let error_kind = ErrorKind::from(&err);
                if error_kind == ErrorKind::RateLimited {
                    warn!(
                        "Export task limit exceeded for {}. Will retry in next execution: {err}",
                        group.name
                    );
                } else {
                    error!("Error creating export task for {}: {err}", group.name);
                }
                return ExportOutcome::Failed {
                    log_group_name: group.name.clone(),
                    error_kind,
                    message: format!("Error creating export task: {err}"),
                };
            }
        };

        let status = match self.service.export_task_status(&task_id).await {
            Ok(status) => status,
            Err(err) => {
                debug!("Error checking export task {task_id}: {err}");
                "UNKNOWN".to_string()
            }
        };

        info!("Created export task {task_id} for {}", group.name);
        info!(
            "Destination: s3://{}/{}",
            request.destination_bucket, request.destination_prefix
        );
        info!("Exporting {} streams", plan.streams_count);

        ExportOutcome::Created {
            task_id,
            log_group_name: request.log_group_name,
            streams_count: plan.streams_count,
            destination_prefix: request.destination_prefix,
            status,
        }
    }
}
