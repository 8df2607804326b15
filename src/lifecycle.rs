//! The install/update/launch lifecycle controller.
//!
//! ## State machine
//! ```text
//! GameNotFound --(target found/selected & valid)--> NeedsInstall | ReadyToPlay | NeedsUpdate
//! NeedsInstall --(action)--> Installing --(op settles, any outcome)--> re-derived
//! NeedsUpdate  --(action)--> Updating   --(op settles, any outcome)--> re-derived
//! ReadyToPlay  --(refresh finds outdated)--> NeedsUpdate
//! ```
//! No terminal state; the machine is a steady-state loop for the lifetime
//! of the session.
//!
//! ## Re-derivation over patching
//! `refresh_version_state` always rebuilds the state from a fresh backend
//! query instead of patching it incrementally. A failed install therefore
//! can never strand the machine in `Installing` — the settle path runs the
//! refresh unconditionally.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::backend::{GameBackend, InstallationTarget, LaunchOptions, ReleaseChannel};
use crate::error::LifecycleError;
use crate::events::{push_channel, PushEvent, Statistics};
use crate::notify::NotificationRelay;
use crate::settings::{self, SettingsStore};

pub const DEFAULT_MODS_PER_PAGE: u64 = 20;

/// The single discriminated status value driving the primary UI
/// affordance. Owned exclusively by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleState {
    GameNotFound,
    NeedsInstall,
    Installing,
    ReadyToPlay,
    NeedsUpdate,
    Updating,
}

impl LifecycleState {
    pub fn is_in_progress(self) -> bool {
        matches!(self, LifecycleState::Installing | LifecycleState::Updating)
    }
}

/// Transition guard. Re-deriving into any settled state is always legal;
/// the in-progress states are only reachable from their immediate
/// predecessors.
#[derive(Debug)]
pub struct StateMachine {
    pub state: LifecycleState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self {
            state: LifecycleState::GameNotFound,
        }
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_transition(&self, to: LifecycleState) -> bool {
        match to {
            LifecycleState::Installing => self.state == LifecycleState::NeedsInstall,
            LifecycleState::Updating => self.state == LifecycleState::NeedsUpdate,
            _ => true,
        }
    }

    pub fn transition(&mut self, to: LifecycleState) -> Result<(), LifecycleError> {
        if self.state == to {
            return Ok(());
        }
        if self.can_transition(to) {
            tracing::info!("[Lifecycle] State transition: {:?} -> {:?}", self.state, to);
            self.state = to;
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition(self.state, to))
        }
    }
}

/// Single source of truth for whether the managed modification can be
/// launched, needs installing, or needs updating. Serializes install and
/// update operations so at most one is ever in flight.
///
/// Constructed once by the host and passed by reference to view bindings;
/// persistence, toasts, and all real work are injected collaborators.
pub struct LifecycleController<B: GameBackend> {
    backend: B,
    settings: Box<dyn SettingsStore>,
    relay: NotificationRelay,
    machine: StateMachine,
    target: Option<InstallationTarget>,
    channel: ReleaseChannel,
    installed_version: Option<String>,
    launch_options: LaunchOptions,
    dev_mode: bool,
    mods_per_page: u64,
    channel_switching_enabled: bool,
    game_running: bool,
    mod_running: bool,
    statistics: Option<Statistics>,
    install_confirmation_pending: bool,
    last_refresh: Option<String>,
    push_tx: mpsc::Sender<PushEvent>,
    push_rx: mpsc::Receiver<PushEvent>,
}

impl<B: GameBackend> LifecycleController<B> {
    pub fn new(backend: B, settings: Box<dyn SettingsStore>, relay: NotificationRelay) -> Self {
        let (push_tx, push_rx) = push_channel();
        Self {
            backend,
            settings,
            relay,
            machine: StateMachine::new(),
            target: None,
            channel: ReleaseChannel::default(),
            installed_version: None,
            launch_options: LaunchOptions::default(),
            dev_mode: false,
            mods_per_page: DEFAULT_MODS_PER_PAGE,
            channel_switching_enabled: true,
            game_running: false,
            mod_running: false,
            statistics: None,
            install_confirmation_pending: false,
            last_refresh: None,
            push_tx,
            push_rx,
        }
    }

    // ─── bootstrap ──────────────────────────────────────────────────────

    /// Seeds channel, flags and target from persisted settings, falling
    /// back to backend auto-discovery for the target, then derives the
    /// initial state. Called once at startup.
    pub async fn bootstrap(&mut self) -> LifecycleState {
        if let Some(value) = self.settings.get(settings::KEY_RELEASE_CHANNEL) {
            match serde_json::from_value::<ReleaseChannel>(value) {
                Ok(channel) => self.channel = channel,
                Err(e) => tracing::warn!("[Lifecycle] Ignoring bad persisted channel: {}", e),
            }
        }
        if let Some(value) = self.settings.get(settings::KEY_DEV_MODE) {
            self.dev_mode = value.as_bool().unwrap_or(false);
        }
        if let Some(value) = self.settings.get(settings::KEY_MODS_PER_PAGE) {
            self.mods_per_page = value.as_u64().unwrap_or(DEFAULT_MODS_PER_PAGE);
        }
        if let Some(value) = self.settings.get(settings::KEY_RELEASE_SWITCHING) {
            self.channel_switching_enabled = value.as_bool().unwrap_or(true);
        }
        if let Some(value) = self.settings.get(settings::KEY_GAME_INSTALL) {
            match serde_json::from_value::<InstallationTarget>(value) {
                Ok(target) => self.target = Some(target),
                Err(e) => tracing::warn!("[Lifecycle] Ignoring bad persisted target: {}", e),
            }
        }

        if self.target.is_none() {
            match self.backend.find_game_install_location().await {
                Ok(target) => {
                    tracing::info!(
                        "[Lifecycle] Auto-discovered game install at {:?} ({:?})",
                        target.path,
                        target.source_kind
                    );
                    if let Err(e) = self.persist_target(&target) {
                        tracing::warn!("[Lifecycle] Could not persist discovered target: {}", e);
                    }
                    self.target = Some(target);
                }
                Err(e) => tracing::info!("[Lifecycle] No game install found: {}", e),
            }
        }

        self.refresh_version_state().await
    }

    // ─── operations ─────────────────────────────────────────────────────

    /// Validates and records a user-selected install directory. On
    /// rejection nothing is mutated and the previous state stands.
    pub async fn set_installation_target(
        &mut self,
        candidate: impl Into<PathBuf>,
    ) -> Result<(), LifecycleError> {
        let path = candidate.into();
        if !self.backend.verify_install_location(&path).await {
            tracing::warn!("[Lifecycle] Rejected install location {:?}", path);
            self.relay.error(
                "Invalid install location",
                &format!("{} is not a valid game install", path.display()),
            );
            return Err(LifecycleError::InvalidInstallLocation(path));
        }

        let target = InstallationTarget::manually_selected(path);
        self.persist_target(&target)?;
        self.target = Some(target);
        self.refresh_version_state().await;
        Ok(())
    }

    /// Fully re-derives the lifecycle state from a fresh version query.
    /// Idempotent and safe to call at any time.
    ///
    /// A lookup error and a genuinely missing install both land in
    /// `NeedsInstall`, but the error stays visible as a warning toast.
    pub async fn refresh_version_state(&mut self) -> LifecycleState {
        let Some(target) = self.target.clone() else {
            self.installed_version = None;
            self.enter(LifecycleState::GameNotFound);
            return self.machine.state;
        };

        match self.backend.get_installed_package_version(&target).await {
            Ok(version) if !version.is_empty() => {
                tracing::debug!("[Lifecycle] Installed package version: {}", version);
                self.installed_version = Some(version);
                self.enter(LifecycleState::ReadyToPlay);

                match self
                    .backend
                    .check_is_package_outdated(&target, self.channel)
                    .await
                {
                    Ok(true) => self.enter(LifecycleState::NeedsUpdate),
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("[Lifecycle] Outdated check failed: {}", e);
                        self.relay.warning("Update check failed", &e);
                    }
                }
            }
            Ok(_) => {
                self.installed_version = None;
                self.enter(LifecycleState::NeedsInstall);
            }
            Err(e) => {
                tracing::warn!("[Lifecycle] Version lookup failed: {}", e);
                self.relay.warning("Version lookup failed", &e);
                self.installed_version = None;
                self.enter(LifecycleState::NeedsInstall);
            }
        }

        self.last_refresh = Some(chrono::Utc::now().to_rfc3339());
        self.machine.state
    }

    /// Single dispatch point bound to the primary UI affordance.
    pub async fn perform_lifecycle_action(&mut self) -> Result<(), LifecycleError> {
        match self.machine.state {
            // Re-entrancy guard: one install/update in flight at a time.
            LifecycleState::Installing | LifecycleState::Updating => {
                tracing::debug!("[Lifecycle] Operation already in flight, ignoring action");
                Ok(())
            }
            LifecycleState::GameNotFound => match self.backend.pick_install_directory().await {
                Ok(Some(path)) => self.set_installation_target(path).await,
                Ok(None) => {
                    tracing::debug!("[Lifecycle] Directory selection cancelled");
                    Ok(())
                }
                Err(e) => {
                    self.relay.error("Could not select folder", &e);
                    Err(LifecycleError::Backend(e))
                }
            },
            state @ (LifecycleState::NeedsInstall | LifecycleState::NeedsUpdate) => {
                let target = self.target.clone().ok_or(LifecycleError::NoInstallTarget)?;
                let in_progress = if state == LifecycleState::NeedsInstall {
                    LifecycleState::Installing
                } else {
                    LifecycleState::Updating
                };
                // Entered before the first await so a second click cannot
                // issue a duplicate install request.
                self.machine.transition(in_progress)?;

                let result = self.backend.install_package(&target, self.channel).await;
                if let Err(ref e) = result {
                    tracing::error!("[Lifecycle] Install failed: {}", e);
                    self.relay.error("Install failed", e);
                }
                // Whatever the outcome, the true state comes from a fresh
                // query; never stay parked in Installing/Updating.
                self.refresh_version_state().await;
                result.map_err(LifecycleError::Backend)
            }
            LifecycleState::ReadyToPlay => {
                let target = self.target.clone().ok_or(LifecycleError::NoInstallTarget)?;
                // Run status comes from the GameRunning/ModRunning push
                // events, not from this call; the state stays ReadyToPlay.
                let result = self.backend.launch_game(&target, &self.launch_options).await;
                if let Err(e) = result {
                    tracing::error!("[Lifecycle] Launch failed: {}", e);
                    self.relay.error("Launch failed", &e);
                    return Err(LifecycleError::Backend(e));
                }
                Ok(())
            }
        }
    }

    /// Flips Stable <-> ReleaseCandidate. The new choice is durable before
    /// the version check runs.
    pub async fn toggle_release_channel(&mut self) -> Result<ReleaseChannel, LifecycleError> {
        let next = self.channel.toggled();
        self.persist(settings::KEY_RELEASE_CHANNEL, serde_json::to_value(next)?)?;
        self.channel = next;
        tracing::info!("[Lifecycle] Release channel switched to {:?}", next);
        self.refresh_version_state().await;
        Ok(next)
    }

    // ─── push events ────────────────────────────────────────────────────

    /// Sender half handed to the bridge that receives backend pushes.
    pub fn push_sender(&self) -> mpsc::Sender<PushEvent> {
        self.push_tx.clone()
    }

    /// Drains pending push events; called on each scheduler tick. Events
    /// mutate controller-owned fields directly and never touch the
    /// lifecycle state.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.push_rx.try_recv() {
            match event {
                PushEvent::GameRunning(running) => self.game_running = running,
                PushEvent::ModRunning(running) => self.mod_running = running,
                PushEvent::Statistics(stats) => self.statistics = Some(stats),
                PushEvent::InstallConfirmationRequired => {
                    tracing::info!("[Lifecycle] Backend awaiting install confirmation");
                    self.install_confirmation_pending = true;
                }
            }
        }
    }

    /// Echoes the user's answer to a pending install confirmation back to
    /// the backend.
    pub async fn answer_install_confirmation(
        &mut self,
        allow: bool,
    ) -> Result<(), LifecycleError> {
        self.install_confirmation_pending = false;
        self.backend
            .receive_install_decision(allow)
            .await
            .map_err(LifecycleError::Backend)
    }

    // ─── launcher self-version ──────────────────────────────────────────

    pub async fn launcher_version(&self) -> Result<String, LifecycleError> {
        self.backend
            .get_launcher_version()
            .await
            .map_err(LifecycleError::Backend)
    }

    pub async fn check_launcher_outdated(&self) -> Result<bool, LifecycleError> {
        self.backend
            .check_is_launcher_outdated()
            .await
            .map_err(LifecycleError::Backend)
    }

    // ─── persisted UI flags ─────────────────────────────────────────────

    pub fn set_dev_mode(&mut self, enabled: bool) -> Result<(), LifecycleError> {
        self.dev_mode = enabled;
        self.persist(settings::KEY_DEV_MODE, serde_json::Value::Bool(enabled))
    }

    pub fn set_mods_per_page(&mut self, count: u64) -> Result<(), LifecycleError> {
        self.mods_per_page = count;
        self.persist(settings::KEY_MODS_PER_PAGE, serde_json::Value::from(count))
    }

    pub fn set_channel_switching_enabled(&mut self, enabled: bool) -> Result<(), LifecycleError> {
        self.channel_switching_enabled = enabled;
        self.persist(
            settings::KEY_RELEASE_SWITCHING,
            serde_json::Value::Bool(enabled),
        )
    }

    // ─── accessors ──────────────────────────────────────────────────────

    pub fn state(&self) -> LifecycleState {
        self.machine.state
    }

    pub fn installation_target(&self) -> Option<&InstallationTarget> {
        self.target.as_ref()
    }

    pub fn release_channel(&self) -> ReleaseChannel {
        self.channel
    }

    pub fn installed_version(&self) -> Option<&str> {
        self.installed_version.as_deref()
    }

    pub fn launch_options(&self) -> &LaunchOptions {
        &self.launch_options
    }

    pub fn set_launch_options(&mut self, options: LaunchOptions) {
        self.launch_options = options;
    }

    pub fn dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn mods_per_page(&self) -> u64 {
        self.mods_per_page
    }

    pub fn channel_switching_enabled(&self) -> bool {
        self.channel_switching_enabled
    }

    pub fn is_game_running(&self) -> bool {
        self.game_running
    }

    pub fn is_mod_running(&self) -> bool {
        self.mod_running
    }

    pub fn statistics(&self) -> Option<Statistics> {
        self.statistics
    }

    pub fn install_confirmation_pending(&self) -> bool {
        self.install_confirmation_pending
    }

    /// RFC 3339 timestamp of the last completed refresh.
    pub fn last_refresh(&self) -> Option<&str> {
        self.last_refresh.as_deref()
    }

    pub fn relay(&self) -> &NotificationRelay {
        &self.relay
    }

    pub fn relay_mut(&mut self) -> &mut NotificationRelay {
        &mut self.relay
    }

    // ─── internals ──────────────────────────────────────────────────────

    /// Settled-state transitions are always accepted by the guard, so the
    /// error arm is only reachable through a logic bug.
    fn enter(&mut self, to: LifecycleState) {
        if let Err(e) = self.machine.transition(to) {
            tracing::error!("[Lifecycle] {}", e);
        }
    }

    /// `set` + `flush` as one logical unit; no flush batching.
    fn persist(&mut self, key: &str, value: serde_json::Value) -> Result<(), LifecycleError> {
        self.settings.set(key, value);
        self.settings.flush()?;
        Ok(())
    }

    fn persist_target(&mut self, target: &InstallationTarget) -> Result<(), LifecycleError> {
        let value = serde_json::to_value(target)?;
        self.persist(settings::KEY_GAME_INSTALL, value)
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: LifecycleState) {
        self.machine.state = state;
    }
}
