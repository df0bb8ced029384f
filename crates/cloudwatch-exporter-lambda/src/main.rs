// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, sync::Arc};

use chrono::{TimeZone, Utc};
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use cloudwatch_exporter::{
    cloudwatch::CloudWatchLogsService,
    config::ExporterConfig,
    export::Exporter,
    handler::{self, InvocationContext, InvocationResponse},
};

#[tokio::main]
pub async fn main() -> Result<(), lambda_runtime::Error> {
    let log_level = env::var("LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,aws_smithy_runtime=off,{log_level}");

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match ExporterConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Error creating exporter config on startup: {e}");
            return Err(e.into());
        }
    };

    info!(
        "Initialized exporter with bucket: {}, threshold: {} days",
        config.s3_bucket, config.days_threshold
    );

    let service = Arc::new(
        CloudWatchLogsService::from_env(config.region.as_deref(), config.endpoint_url.as_deref())
            .await,
    );
    let exporter = Arc::new(Exporter::new(service, &config));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let exporter = Arc::clone(&exporter);
        async move { Ok::<_, lambda_runtime::Error>(invoke(&exporter, event).await) }
    }))
    .await
}

async fn invoke(
    exporter: &Exporter<CloudWatchLogsService>,
    event: LambdaEvent<Value>,
) -> InvocationResponse {
    let (payload, context) = event.into_parts();

    // the runtime reports the deadline in epoch milliseconds
    let deadline = i64::try_from(context.deadline)
        .ok()
        .and_then(|millis| Utc.timestamp_millis_opt(millis).single());

    let invocation = InvocationContext {
        request_id: context.request_id,
        function_name: context.env_config.function_name.clone(),
        deadline,
    };

    handler::handle(exporter, &payload, &invocation, Utc::now()).await
}
