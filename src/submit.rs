//! Assembles an [`ExecutionRequest`] from a template reference and
//! caller-supplied parameters.

use crate::engine::types::{ExecutionRequest, SubmitOptions};
use crate::error::{Error, Result};

pub const DEFAULT_KIND: &str = "WorkflowTemplate";

/// Builder for one submission. Parameter names are passed through verbatim;
/// the engine, not this builder, decides whether they fit the template.
#[derive(Debug, Clone)]
pub struct SubmissionBuilder {
    kind: String,
    template: String,
    namespace: String,
    parameters: Vec<(String, String)>,
    labels: Vec<(String, String)>,
}

impl SubmissionBuilder {
    pub fn new(template: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind: DEFAULT_KIND.to_string(),
            template: template.into(),
            namespace: namespace.into(),
            parameters: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn parameters<I, N, V>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(assignments.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((name.into(), value.into()));
        self
    }

    /// Validates structure only: empty template or namespace fail fast,
    /// before any network call.
    pub fn build(self) -> Result<ExecutionRequest> {
        if self.template.trim().is_empty() {
            return Err(Error::Validation("template name must not be empty".into()));
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::Validation("namespace must not be empty".into()));
        }

        let parameters = self
            .parameters
            .into_iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect();
        let labels = if self.labels.is_empty() {
            None
        } else {
            Some(
                self.labels
                    .iter()
                    .map(|(n, v)| format!("{}={}", n, v))
                    .collect::<Vec<_>>()
                    .join(","),
            )
        };

        Ok(ExecutionRequest {
            kind: self.kind,
            template: self.template,
            namespace: self.namespace,
            submit_options: SubmitOptions { parameters, labels },
        })
    }
}
