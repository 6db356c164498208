//! Transport and data model for the remote workflow engine.

pub mod client;
pub mod types;

pub use self::client::EngineClient;
pub use self::types::{ExecutionHandle, ExecutionRequest, ExecutionStatus, OutputParameter, Phase};
