// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns an invocation event into a response.
//!
//! Response body format on success:
//! {
//!     "statusCode": 200,
//!     "body": {
//!         "message": message,
//!         "results": { ... },
//!         "s3_bucket": bucket,
//!         "days_threshold": days,
//!         "function_name": name,
//!         "aws_request_id": id
//!     }
//! }
//!
//! Only an invalid event or a failure to list log groups produces a non-200
//! status, with body `{ "error", "error_type", "aws_request_id" }`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::error::ExporterError;
use crate::export::Exporter;
use crate::logs_service::LogsService;
use crate::results::ResultsBody;
use crate::selector::SelectionMode;

const COMPLETED_MESSAGE: &str = "CloudWatch logs export process completed successfully";
const REDACTED_KEYS: [&str; 3] = ["password", "secret", "token"];

/// Runtime metadata of the current invocation.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    pub request_id: String,
    pub function_name: String,
    pub deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Completed(CompletedBody),
    Failed(FailedBody),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedBody {
    pub message: String,
    pub results: ResultsBody,
    pub s3_bucket: String,
    pub days_threshold: u32,
    pub function_name: String,
    pub aws_request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedBody {
    pub error: String,
    pub error_type: String,
    pub aws_request_id: String,
}

/// Copy of `event` safe to log: top-level credential-like keys are dropped.
pub fn redacted_event(event: &Value) -> Value {
    match event {
        Value::Object(object) => Value::Object(
            object
                .iter()
                .filter(|(key, _)| !REDACTED_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub async fn handle<S>(
    exporter: &Exporter<S>,
    event: &Value,
    context: &InvocationContext,
    started_at: DateTime<Utc>,
) -> InvocationResponse
where
    S: LogsService + ?Sized,
{
    info!("Received event: {}", redacted_event(event));

    match run(exporter, event, context, started_at).await {
        Ok(results) => {
            info!("Invocation {} completed successfully", context.request_id);
            InvocationResponse {
                status_code: 200,
                body: ResponseBody::Completed(CompletedBody {
                    message: COMPLETED_MESSAGE.to_string(),
                    results,
                    s3_bucket: exporter.s3_bucket().to_string(),
                    days_threshold: exporter.days_threshold(),
                    function_name: context.function_name.clone(),
                    aws_request_id: context.request_id.clone(),
                }),
            }
        }
        Err(err) => {
            let message = format!("Lambda execution failed: {err}");
            error!("{message}");
            InvocationResponse {
                status_code: err.status_code(),
                body: ResponseBody::Failed(FailedBody {
                    error: message,
                    error_type: err.error_type().to_string(),
                    aws_request_id: context.request_id.clone(),
                }),
            }
        }
    }
}

async fn run<S>(
    exporter: &Exporter<S>,
    event: &Value,
    context: &InvocationContext,
    started_at: DateTime<Utc>,
) -> Result<ResultsBody, ExporterError>
where
    S: LogsService + ?Sized,
{
    let mode = SelectionMode::from_event(event)?;
    match &mode {
        SelectionMode::All => info!("Processing all available log groups"),
        SelectionMode::Single(name) => info!("Processing single log group: {name}"),
        SelectionMode::Explicit(names) => info!("Processing specific log groups: {names:?}"),
    }

    let result = exporter.run(&mode, started_at, context.deadline).await?;
    Ok(ResultsBody::from(&result))
}
