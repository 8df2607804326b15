//! Controller error types. Every collaborator failure becomes one of
//! these; nothing in this layer is fatal to the process.

use std::path::PathBuf;

use crate::lifecycle::LifecycleState;

#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("invalid install location: {}", .0.display())]
    InvalidInstallLocation(PathBuf),

    #[error("no install target selected")]
    NoInstallTarget,

    #[error("invalid transition: {0:?} -> {1:?}")]
    InvalidTransition(LifecycleState, LifecycleState),

    #[error("backend call failed: {0}")]
    Backend(String),

    #[error("settings error: {0}")]
    Settings(#[from] anyhow::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
