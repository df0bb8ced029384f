// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ExporterError, ServiceError};
use crate::logs_service::{LogGroupDescriptor, LogsService};

/// Which log groups an invocation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionMode {
    All,
    Single(String),
    Explicit(Vec<String>),
}

impl SelectionMode {
    /// Resolves the invocation payload shape:
    ///
    /// ```text
    /// {}                                  => All
    /// { "log_group": "<name>" }           => Single
    /// { "log_groups": ["<name>", ...] }   => Explicit
    /// ```
    ///
    /// A null payload is treated as `{}`. When both keys are present
    /// `log_groups` wins.
    pub fn from_event(event: &Value) -> Result<Self, ExporterError> {
        let object = match event {
            Value::Null => return Ok(SelectionMode::All),
            Value::Object(object) => object,
            other => {
                return Err(ExporterError::InvalidInput(format!(
                    "event must be a JSON object, got {other}"
                )))
            }
        };

        if let Some(groups) = object.get("log_groups") {
            let names = groups
                .as_array()
                .ok_or_else(|| {
                    ExporterError::InvalidInput("'log_groups' must be a list of strings".into())
                })?
                .iter()
                .map(|name| {
                    name.as_str().map(str::to_string).ok_or_else(|| {
                        ExporterError::InvalidInput(
                            "'log_groups' must be a list of strings".into(),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(SelectionMode::Explicit(names));
        }

        if let Some(group) = object.get("log_group") {
            let name = group.as_str().ok_or_else(|| {
                ExporterError::InvalidInput("'log_group' must be a string".into())
            })?;
            return Ok(SelectionMode::Single(name.to_string()));
        }

        Ok(SelectionMode::All)
    }
}

/// A log group the selector handed downstream. Explicit names that could not
/// be resolved stay in the sequence so each still gets an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Found(LogGroupDescriptor),
    Missing(String),
    LookupFailed { name: String, error: ServiceError },
}

impl Candidate {
    pub fn name(&self) -> &str {
        match self {
            Candidate::Found(group) => &group.name,
            Candidate::Missing(name) => name,
            Candidate::LookupFailed { name, .. } => name,
        }
    }
}

/// Resolves `mode` into candidates, in listing or input order.
///
/// Only a failure of the "all groups" listing is returned as an error; a
/// failed lookup of an explicit name becomes a [`Candidate::LookupFailed`].
pub async fn select<S>(service: &S, mode: &SelectionMode) -> Result<Vec<Candidate>, ServiceError>
where
    S: LogsService + ?Sized,
{
    match mode {
        SelectionMode::All => {
            let mut candidates = Vec::new();
            let mut next_token = None;
            loop {
                let page = service.list_log_groups(next_token).await?;
                debug!("Listed {} log groups", page.items.len());
                candidates.extend(page.items.into_iter().map(Candidate::Found));
                match page.next_token {
                    Some(token) => next_token = Some(token),
                    None => break,
                }
            }
            info!("Found {} total log groups", candidates.len());
            Ok(candidates)
        }
        SelectionMode::Single(name) => Ok(vec![lookup(service, name).await]),
        SelectionMode::Explicit(names) => {
            let mut candidates = Vec::with_capacity(names.len());
            for name in names {
                candidates.push(lookup(service, name).await);
            }
            let found = candidates
                .iter()
                .filter(|candidate| matches!(candidate, Candidate::Found(_)))
                .count();
            info!("Found {found} valid log groups from {} requested", names.len());
            Ok(candidates)
        }
    }
}

async fn lookup<S>(service: &S, name: &str) -> Candidate
where
    S: LogsService + ?Sized,
{
    match service.find_log_group(name).await {
        Ok(Some(group)) => Candidate::Found(group),
        Ok(None) => {
            warn!("Log group not found: {name}");
            Candidate::Missing(name.to_string())
        }
        Err(error) => {
            warn!("Error looking up log group {name}: {error}");
            Candidate::LookupFailed {
                name: name.to_string(),
                error,
            }
        }
    }
}
