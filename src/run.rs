//! End-to-end orchestration: build the request, submit, observe to a
//! terminal phase, extract outputs.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::engine::client::EngineClient;
use crate::engine::types::{ExecutionHandle, Phase};
use crate::error::Result;
use crate::extract::{self, ExtractedParameters};
use crate::observe::logs::LogRelay;
use crate::observe::{RetryPolicy, StatusPoller};
use crate::submit::SubmissionBuilder;

/// Everything one run needs, resolved by the caller (CLI + config).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub host: String,
    pub namespace: String,
    pub template: String,
    pub kind: String,
    pub parameters: Vec<(String, String)>,
    pub labels: Vec<(String, String)>,
    pub names_of_interest: Vec<String>,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub tail_lines: u32,
    pub retry: RetryPolicy,
}

/// What a completed observation hands back to the calling pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub handle: ExecutionHandle,
    pub url: String,
    pub phase: Phase,
    pub parameters: ExtractedParameters,
}

/// Browser URL for one execution on the engine's UI.
pub fn viewing_url(host: &str, handle: &ExecutionHandle) -> String {
    format!(
        "{}/workflows/{}/{}",
        host.trim_end_matches('/'),
        handle.namespace,
        handle.name
    )
}

/// Submit and observe one execution, handing each new log line to `on_line`.
///
/// Submission failures are fatal and never retried here: the engine offers
/// no request deduplication, so a blind retry could start a second
/// execution. Transient failures during observation follow the configured
/// retry policy instead.
pub async fn run<F>(client: &EngineClient, cfg: &RunConfig, on_line: F) -> Result<RunResult>
where
    F: FnMut(&str),
{
    let mut builder = SubmissionBuilder::new(cfg.template.as_str(), cfg.namespace.as_str())
        .kind(cfg.kind.as_str())
        .parameters(cfg.parameters.iter().cloned());
    for (name, value) in &cfg.labels {
        builder = builder.label(name.as_str(), value.as_str());
    }
    let request = builder.build()?;

    let handle = client.submit(&request).await?;
    info!(execution = %handle, template = %cfg.template, "submitted");

    let mut relay = LogRelay::new(cfg.tail_lines);
    let poller = StatusPoller::with_retry(cfg.poll_interval, cfg.max_wait, cfg.retry.clone());
    let status = poller.observe(client, &handle, &mut relay, on_line).await?;

    let parameters = extract::extract(&status, &cfg.names_of_interest)?;
    Ok(RunResult {
        url: viewing_url(&cfg.host, &handle),
        handle,
        phase: status.phase,
        parameters,
    })
}
