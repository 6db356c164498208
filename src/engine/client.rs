//! Reqwest-based client for the engine's workflow HTTP API: submit, status,
//! and log-tail fetches, all carrying the same bearer credential.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};

use crate::config::Config;
use crate::engine::types::{
    ExecutionHandle, ExecutionRequest, ExecutionStatus, WorkflowResource,
};
use crate::error::{Error, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared transport to the workflow engine. Stateless aside from the
/// credential; cheap to clone, safe to share across concurrent observations.
#[derive(Debug, Clone)]
pub struct EngineClient {
    http: reqwest::Client,
    host: String,
    token: Option<String>,
}

impl EngineClient {
    pub fn new(
        host: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
        verify_tls: bool,
    ) -> Result<Self> {
        let host = host.into();
        let host = host.trim_end_matches('/').to_string();
        if host.is_empty() {
            return Err(Error::Validation("engine host must not be empty".into()));
        }

        // Internal engine endpoints commonly run on self-signed certificates,
        // so verification is opt-in via VERIFY_TLS. A deliberate trust
        // trade-off for in-cluster use, not a recommended public default.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;

        Ok(Self { http, host, token })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let host = cfg
            .get("ARGO_HOST")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                Error::Validation(
                    "missing ARGO_HOST; set it in env or ~/.config/wfrun/.wfrunrc".into(),
                )
            })?;
        let timeout = cfg
            .get("REQUEST_TIMEOUT")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self::new(
            host,
            cfg.get("ARGO_TOKEN"),
            Duration::from_secs(timeout),
            cfg.get_bool("VERIFY_TLS"),
        )
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn authed(&self, rb: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    /// Submit a built request. The returned handle is the only way to refer
    /// to this execution afterwards.
    pub async fn submit(&self, request: &ExecutionRequest) -> Result<ExecutionHandle> {
        let url = format!(
            "{}/api/v1/workflows/{}/submit",
            self.host, request.namespace
        );
        let resp = self.authed(self.http.post(&url).json(request)).send().await?;

        match resp.status() {
            status if status.is_success() => {
                let wf: WorkflowResource = resp.json().await?;
                let namespace = if wf.metadata.namespace.is_empty() {
                    request.namespace.clone()
                } else {
                    wf.metadata.namespace
                };
                Ok(ExecutionHandle {
                    name: wf.metadata.name,
                    namespace,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Transport(format!(
                "engine denied credentials ({})",
                resp.status()
            ))),
            status => {
                let message = resp.text().await.unwrap_or_default();
                Err(Error::Rejected {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    /// Fetch the current status of one execution.
    pub async fn get_status(&self, handle: &ExecutionHandle) -> Result<ExecutionStatus> {
        let url = format!(
            "{}/api/v1/workflows/{}/{}",
            self.host, handle.namespace, handle.name
        );
        let resp = self.authed(self.http.get(&url)).send().await?;

        match resp.status() {
            status if status.is_success() => {
                let wf: WorkflowResource = resp.json().await?;
                Ok(ExecutionStatus {
                    handle: handle.clone(),
                    phase: wf.status.phase,
                    outputs: wf.status.outputs.parameters,
                })
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                namespace: handle.namespace.clone(),
                name: handle.name.clone(),
            }),
            status => Err(Error::Transport(format!(
                "status fetch for {} failed: HTTP {}",
                handle, status
            ))),
        }
    }

    /// Fetch the current log tail window: the most recent `tail_lines` lines
    /// as a newline-delimited blob, split into discrete lines. Each call
    /// returns a fresh window; overlap across calls is the caller's problem.
    pub async fn get_logs(&self, handle: &ExecutionHandle, tail_lines: u32) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/v1/workflows/{}/{}/log",
            self.host, handle.namespace, handle.name
        );
        let tail = tail_lines.to_string();
        let resp = self
            .authed(self.http.get(&url).query(&[
                ("logOptions.container", "main"),
                ("logOptions.tailLines", tail.as_str()),
                ("logOptions.timestamps", "true"),
            ]))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::Transport(format!(
                "log fetch for {} failed: HTTP {}",
                handle,
                resp.status()
            )));
        }

        let body = resp.text().await?;
        Ok(body
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }
}
