// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! CloudWatch Logs implementation of [`LogsService`].
//!
//! Uses the AWS SDK for Rust with the standard credential chain (environment,
//! execution role, etc.).

use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudwatchlogs::types::{LogGroup, LogStream, OrderBy};
use aws_sdk_cloudwatchlogs::Client;
use tracing::debug;

use crate::error::ServiceError;
use crate::logs_service::{
    ExportRequest, LogGroupDescriptor, LogStreamSummary, LogsService, Page,
};

pub struct CloudWatchLogsService {
    client: Client,
}

impl CloudWatchLogsService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the ambient AWS configuration. `endpoint_url`
    /// points the client at an alternative endpoint such as localstack.
    pub async fn from_env(region: Option<&str>, endpoint_url: Option<&str>) -> Self {
        let mut sdk_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = region {
            sdk_config_builder =
                sdk_config_builder.region(aws_config::Region::new(region.to_string()));
        }

        let sdk_config = sdk_config_builder.load().await;

        let mut logs_config = aws_sdk_cloudwatchlogs::config::Builder::from(&sdk_config);
        if let Some(endpoint_url) = endpoint_url {
            debug!("Using CloudWatch Logs endpoint override {endpoint_url}");
            logs_config = logs_config.endpoint_url(endpoint_url);
        }

        Self::new(Client::from_conf(logs_config.build()))
    }
}

/// Sorts an SDK failure into the exporter's error classes. Anything that did
/// not produce a service response is a transport error.
fn classify<E, R>(err: SdkError<E, R>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            let message = service_error
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| service_error.to_string());
            match service_error.code() {
                Some("ResourceNotFoundException") => ServiceError::NotFound(message),
                Some("LimitExceededException") | Some("ThrottlingException") => {
                    ServiceError::LimitExceeded(message)
                }
                Some("ResourceAlreadyExistsException") => ServiceError::AlreadyExists(message),
                code => ServiceError::Rejected {
                    code: code.unwrap_or("Unknown").to_string(),
                    message,
                },
            }
        }
        other => ServiceError::Transport(DisplayErrorContext(&other).to_string()),
    }
}

fn descriptor_from(group: &LogGroup) -> Option<LogGroupDescriptor> {
    Some(LogGroupDescriptor {
        name: group.log_group_name()?.to_string(),
        creation_time: group.creation_time().unwrap_or_default(),
        stored_bytes: group.stored_bytes().unwrap_or_default(),
        retention_days: group.retention_in_days(),
    })
}

fn stream_from(stream: &LogStream) -> LogStreamSummary {
    LogStreamSummary {
        name: stream.log_stream_name().unwrap_or_default().to_string(),
        creation_time: stream.creation_time(),
        first_event_time: stream.first_event_timestamp(),
        last_event_time: stream.last_event_timestamp(),
    }
}

#[async_trait]
impl LogsService for CloudWatchLogsService {
    async fn list_log_groups(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<LogGroupDescriptor>, ServiceError> {
        let output = self
            .client
            .describe_log_groups()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(classify)?;

        Ok(Page {
            items: output.log_groups().iter().filter_map(descriptor_from).collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn find_log_group(
        &self,
        name: &str,
    ) -> Result<Option<LogGroupDescriptor>, ServiceError> {
        // The API only offers prefix lookup; the exact name sorts first among
        // the matches.
        let output = self
            .client
            .describe_log_groups()
            .log_group_name_prefix(name)
            .send()
            .await
            .map_err(classify)?;

        Ok(output
            .log_groups()
            .iter()
            .filter_map(descriptor_from)
            .find(|group| group.name == name))
    }

    async fn list_log_streams(
        &self,
        log_group_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<LogStreamSummary>, ServiceError> {
        let output = self
            .client
            .describe_log_streams()
            .log_group_name(log_group_name)
            .order_by(OrderBy::LastEventTime)
            .descending(false)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(classify)?;

        Ok(Page {
            items: output.log_streams().iter().map(stream_from).collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn create_export_task(&self, request: &ExportRequest) -> Result<String, ServiceError> {
        let output = self
            .client
            .create_export_task()
            .log_group_name(&request.log_group_name)
            .from(request.from_time)
            .to(request.to_time)
            .destination(&request.destination_bucket)
            .destination_prefix(&request.destination_prefix)
            .send()
            .await
            .map_err(classify)?;

        output
            .task_id()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Rejected {
                code: "MissingTaskId".to_string(),
                message: "export task was accepted without a task id".to_string(),
            })
    }

    async fn export_task_status(&self, task_id: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .describe_export_tasks()
            .task_id(task_id)
            .send()
            .await
            .map_err(classify)?;

        let task = output
            .export_tasks()
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("export task {task_id}")))?;

        Ok(task
            .status()
            .and_then(|status| status.code())
            .map(|code| code.as_str().to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string()))
    }
}
