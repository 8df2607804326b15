//! Backend collaborator interface.
//!
//! All real work — filesystem scans, archive installs, version probes,
//! process launching — happens in a separate backend process. This crate
//! only decides what to call and when. The trait below is the async
//! request/response surface the controller consumes, plus the data types
//! shared across the bridge.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How the game installation was provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Steam,
    OriginStorefront,
    EaPlayStorefront,
    ManuallySelected,
    /// Only used for paths that were hand-picked or not yet validated.
    Unknown,
}

/// The user's selected game installation. Replaced wholesale whenever the
/// user re-selects a directory, never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationTarget {
    pub path: PathBuf,
    pub source_kind: SourceKind,
}

impl InstallationTarget {
    pub fn manually_selected(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source_kind: SourceKind::ManuallySelected,
        }
    }
}

/// Distribution track selecting which package build counts as "latest".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReleaseChannel {
    #[default]
    Stable,
    ReleaseCandidate,
}

impl ReleaseChannel {
    pub fn toggled(self) -> Self {
        match self {
            ReleaseChannel::Stable => ReleaseChannel::ReleaseCandidate,
            ReleaseChannel::ReleaseCandidate => ReleaseChannel::Stable,
        }
    }
}

/// Options forwarded to the launch operation; interpretation is entirely
/// the backend's business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchOptions {
    pub bypass_checks: bool,
}

/// Async request/response operations served by the backend process.
///
/// Failures are opaque message strings; the controller turns them into
/// typed errors and user-visible notifications. None of these calls carry
/// a timeout at this layer — they settle or stay pending, and bounding
/// their duration is the backend's responsibility.
#[allow(async_fn_in_trait)]
pub trait GameBackend {
    /// Checks whether `path` points at a valid game installation.
    async fn verify_install_location(&self, path: &Path) -> bool;

    /// Scans known storefront locations for an existing installation.
    async fn find_game_install_location(&self) -> Result<InstallationTarget, String>;

    /// Opens the OS directory picker; `None` means the user cancelled.
    async fn pick_install_directory(&self) -> Result<Option<PathBuf>, String>;

    /// Version tag of the installed modification; an empty string means
    /// not installed.
    async fn get_installed_package_version(
        &self,
        target: &InstallationTarget,
    ) -> Result<String, String>;

    async fn check_is_package_outdated(
        &self,
        target: &InstallationTarget,
        channel: ReleaseChannel,
    ) -> Result<bool, String>;

    /// Installs the latest build of the given channel. An update is the
    /// same call; overwrite semantics are the backend's responsibility.
    async fn install_package(
        &self,
        target: &InstallationTarget,
        channel: ReleaseChannel,
    ) -> Result<(), String>;

    async fn launch_game(
        &self,
        target: &InstallationTarget,
        options: &LaunchOptions,
    ) -> Result<(), String>;

    /// Version of the launcher application itself.
    async fn get_launcher_version(&self) -> Result<String, String>;

    async fn check_is_launcher_outdated(&self) -> Result<bool, String>;

    /// Echoes the user's answer to an install-confirmation push event.
    async fn receive_install_decision(&self, allow: bool) -> Result<(), String>;
}
