//! Submit a templated workflow to a remote Argo-compatible engine, watch it
//! to a terminal phase while relaying logs, and extract output parameters
//! for the calling pipeline.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod observe;
pub mod run;
pub mod submit;

pub use engine::{EngineClient, ExecutionHandle, ExecutionStatus, Phase};
pub use error::{Error, Result};
pub use run::{run, RunConfig, RunResult};
