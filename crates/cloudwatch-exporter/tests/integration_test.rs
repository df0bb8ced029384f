// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

mod common;

use cloudwatch_exporter::config::ExporterConfig;
use cloudwatch_exporter::error::{ErrorKind, ServiceError};
use cloudwatch_exporter::export::Exporter;
use cloudwatch_exporter::handler::{
    handle, CompletedBody, InvocationContext, InvocationResponse, ResponseBody,
};
use common::mocks::{days_ago, run_started, InMemoryLogs};
use serde_json::{json, Value};
use std::sync::Arc;

fn exporter(service: &Arc<InMemoryLogs>) -> Exporter<InMemoryLogs> {
    let config = ExporterConfig {
        s3_bucket: "central-log-archive".to_string(),
        days_threshold: 3,
        ..Default::default()
    };
    Exporter::new(Arc::clone(service), &config)
}

fn context() -> InvocationContext {
    InvocationContext {
        request_id: "8f5c1d2e-request".to_string(),
        function_name: "cloudwatch-logs-s3-exporter".to_string(),
        deadline: None,
    }
}

async fn invoke(service: &Arc<InMemoryLogs>, event: Value) -> InvocationResponse {
    handle(&exporter(service), &event, &context(), run_started()).await
}

fn completed(response: &InvocationResponse) -> &CompletedBody {
    match &response.body {
        ResponseBody::Completed(body) => body,
        ResponseBody::Failed(body) => panic!("invocation failed: {body:?}"),
    }
}

#[tokio::test]
async fn explicit_list_with_missing_group() {
    let service = Arc::new(InMemoryLogs::new(50).group("/aws/lambda/a", &[(10, 5)]));

    let response = invoke(
        &service,
        json!({"log_groups": ["/aws/lambda/a", "/aws/lambda/b"]}),
    )
    .await;

    assert_eq!(response.status_code, 200);
    let results = &completed(&response).results;
    assert_eq!(results.processed_log_groups, 2);
    assert_eq!(results.created_export_tasks, 1);
    assert_eq!(results.export_tasks[0].log_group_name, "/aws/lambda/a");
    assert_eq!(results.errors.len(), 1);
    assert_eq!(results.errors[0].log_group_name, "/aws/lambda/b");
    assert_eq!(results.errors[0].error_kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn recent_group_is_not_exported() {
    let service = Arc::new(InMemoryLogs::new(50).group("/aws/lambda/recent", &[(1, 1)]));

    let response = invoke(&service, json!({"log_group": "/aws/lambda/recent"})).await;

    assert_eq!(response.status_code, 200);
    let results = &completed(&response).results;
    assert_eq!(results.processed_log_groups, 1);
    assert_eq!(results.created_export_tasks, 0);
    assert_eq!(results.skipped_log_groups, 1);
    assert!(results.errors.is_empty());
    assert!(service.requested_groups().is_empty());
}

#[tokio::test]
async fn rate_limited_export_is_reported_not_raised() {
    let service = Arc::new(
        InMemoryLogs::new(50)
            .group("/aws/lambda/old", &[(10, 10)])
            .failing_export(
                "/aws/lambda/old",
                ServiceError::LimitExceeded("Resource limit exceeded.".into()),
            ),
    );

    let response = invoke(&service, json!({"log_group": "/aws/lambda/old"})).await;

    assert_eq!(response.status_code, 200);
    let results = &completed(&response).results;
    assert_eq!(results.created_export_tasks, 0);
    assert_eq!(results.skipped_log_groups, 1);
    assert_eq!(results.errors.len(), 1);
    assert_eq!(results.errors[0].error_kind, ErrorKind::RateLimited);
    // one attempt only, retry is left to the next scheduled run
    assert_eq!(service.requested_groups(), vec!["/aws/lambda/old"]);
}

#[tokio::test]
async fn all_groups_regardless_of_page_size() {
    for n in [0, 1, 5, 23] {
        for page_size in [1, 2, 7, 50] {
            let mut service = InMemoryLogs::new(page_size);
            for i in 0..n {
                service = service.group(&format!("/aws/lambda/fn-{i}"), &[(2, 1)]);
            }
            let service = Arc::new(service);

            let response = invoke(&service, json!({})).await;

            assert_eq!(response.status_code, 200);
            assert_eq!(
                completed(&response).results.processed_log_groups,
                n,
                "{n} groups with page size {page_size}"
            );
        }
    }
}

#[tokio::test]
async fn accounting_law_holds_for_mixed_batch() {
    let service = Arc::new(
        InMemoryLogs::new(2)
            .group("/aws/lambda/exported", &[(12, 9), (8, 4)])
            .group("/aws/lambda/fresh", &[(1, 0)])
            .group("/aws/lambda/limited", &[(20, 15)])
            .group("/aws/lambda/denied", &[(20, 15)])
            .group("/aws/lambda/empty", &[])
            .failing_export(
                "/aws/lambda/limited",
                ServiceError::LimitExceeded("one export at a time".into()),
            )
            .failing_export(
                "/aws/lambda/denied",
                ServiceError::Rejected {
                    code: "InvalidParameterException".into(),
                    message: "GetBucketAcl call on the given bucket failed".into(),
                },
            ),
    );

    let response = invoke(&service, json!({})).await;

    assert_eq!(response.status_code, 200);
    let results = &completed(&response).results;
    assert_eq!(results.processed_log_groups, 5);
    assert_eq!(results.created_export_tasks, 1);
    assert_eq!(results.skipped_log_groups, 4);
    assert_eq!(
        results.processed_log_groups,
        results.created_export_tasks + results.skipped_log_groups
    );
    assert!(results.errors.len() <= results.skipped_log_groups);
    assert_eq!(results.total_streams_processed, 2);

    let kinds: Vec<ErrorKind> = results.errors.iter().map(|e| e.error_kind).collect();
    assert_eq!(kinds, vec![ErrorKind::RateLimited, ErrorKind::SubmissionError]);
    // batch continued past both failures, in listing order
    assert_eq!(
        service.requested_groups(),
        vec![
            "/aws/lambda/exported",
            "/aws/lambda/limited",
            "/aws/lambda/denied"
        ]
    );
}

#[tokio::test]
async fn export_request_uses_folder_convention() {
    let service = Arc::new(InMemoryLogs::new(50).group("/aws/lambda/billing-api", &[(10, 5)]));

    let response = invoke(&service, json!({"log_group": "/aws/lambda/billing-api"})).await;

    let request = service.requests.lock().unwrap()[0].clone();
    assert_eq!(request.destination_bucket, "central-log-archive");
    assert_eq!(
        request.destination_prefix,
        "aws_lambda_billing-api/2025-03-01_08-15-00"
    );
    assert_eq!(request.from_time, days_ago(10));
    assert_eq!(request.to_time, days_ago(3));

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(
        body["body"]["results"]["export_tasks"],
        json!([{
            "taskId": "export-1",
            "logGroupName": "/aws/lambda/billing-api",
            "streamsCount": 1,
            "destinationPrefix": "aws_lambda_billing-api/2025-03-01_08-15-00",
            "status": "RUNNING"
        }])
    );
    assert_eq!(body["statusCode"], 200);
    assert_eq!(body["body"]["s3_bucket"], "central-log-archive");
    assert_eq!(body["body"]["days_threshold"], 3);
    assert_eq!(body["body"]["aws_request_id"], "8f5c1d2e-request");
    assert_eq!(body["body"]["function_name"], "cloudwatch-logs-s3-exporter");
}

#[tokio::test]
async fn listing_failure_is_the_only_fatal_error() {
    let service = Arc::new(
        InMemoryLogs::new(50)
            .group("/aws/lambda/a", &[(10, 5)])
            .failing_listing(ServiceError::Transport("dispatch failure".into())),
    );

    let response = invoke(&service, json!({})).await;

    assert_eq!(response.status_code, 502);
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["body"]["error_type"], "ListingError");
    assert_eq!(body["body"]["aws_request_id"], "8f5c1d2e-request");
    assert!(service.requested_groups().is_empty());
}

#[tokio::test]
async fn explicit_selection_does_not_list_everything() {
    let service = Arc::new(
        InMemoryLogs::new(50)
            .group("/aws/lambda/a", &[(10, 5)])
            .failing_listing(ServiceError::Transport("dispatch failure".into())),
    );

    let response = invoke(&service, json!({"log_groups": ["/aws/lambda/a"]})).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(*service.listing_calls.lock().unwrap(), 0);
    assert_eq!(completed(&response).results.created_export_tasks, 1);
}

#[tokio::test]
async fn invalid_event_is_rejected() {
    let service = Arc::new(InMemoryLogs::new(50));

    let response = invoke(&service, json!({"log_groups": "/aws/lambda/a"})).await;

    assert_eq!(response.status_code, 400);
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["body"]["error_type"], "InvalidInput");
    assert_eq!(
        body["body"]["error"],
        "Lambda execution failed: Invalid invocation input: 'log_groups' must be a list of strings"
    );
}
