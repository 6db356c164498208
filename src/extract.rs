//! Output parameter extraction from a terminal status.

use std::collections::{BTreeMap, HashSet};

use crate::engine::types::ExecutionStatus;
use crate::error::{Error, Result};

/// Name-to-value mapping produced once from a terminal status. BTreeMap so
/// callers see a stable order.
pub type ExtractedParameters = BTreeMap<String, String>;

/// Extract named output parameters from a terminal status.
///
/// An empty `names_of_interest` extracts everything; otherwise only matching
/// names. A requested name the execution did not produce is simply absent
/// from the result, never an error. Non-terminal statuses are a usage error.
pub fn extract(status: &ExecutionStatus, names_of_interest: &[String]) -> Result<ExtractedParameters> {
    if !status.phase.is_terminal() {
        return Err(Error::InvalidState(status.phase));
    }

    let filter: Option<HashSet<&str>> = if names_of_interest.is_empty() {
        None
    } else {
        Some(names_of_interest.iter().map(String::as_str).collect())
    };

    let mut extracted = ExtractedParameters::new();
    for param in &status.outputs {
        if let Some(wanted) = &filter {
            if !wanted.contains(param.name.as_str()) {
                continue;
            }
        }
        if let Some(value) = &param.value {
            extracted.insert(param.name.clone(), value.clone());
        }
    }
    Ok(extracted)
}
