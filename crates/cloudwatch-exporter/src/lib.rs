// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

//! Scheduled export of aged CloudWatch log groups to S3.
//!
//! An invocation selects log groups ([`selector`]), keeps the ones holding
//! data older than the configured threshold ([`eligibility`]), requests one
//! CloudWatch Logs export task per eligible group ([`export`]) and reports
//! one outcome per group ([`results`]).

pub mod cloudwatch;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod export;
pub mod handler;
pub mod logs_service;
pub mod results;
pub mod selector;

mod test_support;
