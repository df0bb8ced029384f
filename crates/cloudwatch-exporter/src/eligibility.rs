// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decides whether a log group holds data older than the age threshold and,
//! if so, which time window to export.
//!
//! Export history is not tracked across invocations, so a group keeps
//! qualifying (and is exported again) on every run until its old data
//! expires.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::logs_service::{LogGroupDescriptor, LogStreamSummary, LogsService};

/// Why a log group produced no export task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoDataOlderThanThreshold,
    NotFound,
    DeadlineExceeded,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoDataOlderThanThreshold => "no-data-older-than-threshold",
            SkipReason::NotFound => "not-found",
            SkipReason::DeadlineExceeded => "deadline-exceeded",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time window and stream count for an eligible group. Times are
/// milliseconds since the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPlan {
    pub from_time: i64,
    pub to_time: i64,
    pub streams_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible(ExportPlan),
    Ineligible(SkipReason),
}

/// `now - threshold_days`, in milliseconds since the epoch.
pub fn cutoff_millis(now: DateTime<Utc>, threshold_days: u32) -> i64 {
    (now - Duration::days(i64::from(threshold_days))).timestamp_millis()
}

/// Scans the group's streams, oldest last event first, and stops at the first
/// stream with an event newer than the cutoff.
///
/// A group that vanished since it was listed is [`SkipReason::NotFound`];
/// any other service failure is returned to the caller.
pub async fn evaluate<S>(
    service: &S,
    group: &LogGroupDescriptor,
    now: DateTime<Utc>,
    threshold_days: u32,
) -> Result<Eligibility, ServiceError>
where
    S: LogsService + ?Sized,
{
    let cutoff = cutoff_millis(now, threshold_days);
    debug!("Cutoff timestamp for {}: {cutoff}", group.name);

    let mut old_streams = Vec::new();
    let mut next_token = None;
    'pages: loop {
        let page = match service.list_log_streams(&group.name, next_token).await {
            Ok(page) => page,
            Err(ServiceError::NotFound(message)) => {
                warn!("Log group {} disappeared before inspection: {message}", group.name);
                return Ok(Eligibility::Ineligible(SkipReason::NotFound));
            }
            Err(err) => return Err(err),
        };

        for stream in page.items {
            match stream.last_event_time {
                Some(last_event_time) if last_event_time < cutoff => old_streams.push(stream),
                Some(_) => break 'pages,
                // nothing ingested yet
                None => continue,
            }
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    info!("Found {} old streams in {}", old_streams.len(), group.name);
    Ok(plan(group, &old_streams, now, cutoff))
}

/// Builds the export window from the streams whose data is entirely older
/// than `cutoff`. The window starts at the earliest retained event and ends
/// at the cutoff.
pub fn plan(
    group: &LogGroupDescriptor,
    old_streams: &[LogStreamSummary],
    now: DateTime<Utc>,
    cutoff: i64,
) -> Eligibility {
    let Some(earliest) = old_streams
        .iter()
        .filter_map(|stream| stream.first_event_time.or(stream.creation_time))
        .filter(|time| *time > 0)
        .min()
    else {
        return Eligibility::Ineligible(SkipReason::NoDataOlderThanThreshold);
    };

    // events before the retention horizon have already been deleted
    let from_time = match group.retention_days {
        Some(days) => earliest.max((now - Duration::days(i64::from(days))).timestamp_millis()),
        None => earliest,
    };

    if from_time >= cutoff {
        return Eligibility::Ineligible(SkipReason::NoDataOlderThanThreshold);
    }

    Eligibility::Eligible(ExportPlan {
        from_time,
        to_time: cutoff,
        streams_count: old_streams.len(),
    })
}
