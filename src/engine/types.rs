//! Data model for the remote workflow engine: submission requests, execution
//! handles, and the status payloads the engine reports back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A fully assembled submission, immutable once built.
///
/// Serializes into the engine's submit body; the target namespace travels in
/// the URL path, not the body.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRequest {
    #[serde(rename = "resourceKind")]
    pub kind: String,
    #[serde(rename = "resourceName")]
    pub template: String,
    #[serde(rename = "submitOptions")]
    pub submit_options: SubmitOptions,
    #[serde(skip)]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmitOptions {
    /// Parameter assignments as `name=value` strings, passed through verbatim.
    /// The engine validates template compatibility, not us.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    /// Comma-joined `name=value` labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<String>,
}

/// Identifies one running execution. Created at submission, never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionHandle {
    pub name: String,
    pub namespace: String,
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Lifecycle phase reported by the engine.
///
/// Anything the engine sends that we do not recognize, including an absent
/// phase on a freshly created workflow, lands on `Unknown` and is treated as
/// not-yet-terminal rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Phase {
    /// Terminal phases admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed | Phase::Error)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Pending => "Pending",
            Phase::Running => "Running",
            Phase::Succeeded => "Succeeded",
            Phase::Failed => "Failed",
            Phase::Error => "Error",
            Phase::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// One observed status of an execution.
#[derive(Debug, Clone)]
pub struct ExecutionStatus {
    pub handle: ExecutionHandle,
    pub phase: Phase,
    pub outputs: Vec<OutputParameter>,
}

/// A named output value attached to a terminal execution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputParameter {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

// Wire shapes below. Missing `status` or `outputs` keys resolve to empty
// defaults here, at the deserialization boundary, so nothing downstream has
// to probe for presence.

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowResource {
    pub metadata: WorkflowMetadata,
    #[serde(default)]
    pub status: WorkflowStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorkflowStatus {
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub outputs: WorkflowOutputs,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WorkflowOutputs {
    #[serde(default)]
    pub parameters: Vec<OutputParameter>,
}
