//! # hangar-core
//!
//! Client-side orchestration core for a game mod launcher. It decides
//! when the managed modification needs installing, updating, or can be
//! launched, and interprets the results of the backend process that does
//! the real work (filesystem scans, archive installs, version probes,
//! process launching).
//!
//! ## Architecture
//! - **lifecycle**: the controller owning the single `LifecycleState`,
//!   serializing install/update operations and re-deriving state from
//!   fresh backend queries
//! - **version**: staleness decisions between installed mods and remote
//!   catalog entries
//! - **settings**: durable key-value bootstrap state (install path,
//!   release channel, UI flags)
//! - **notify**: toast routing with an unfocused-window queue
//! - **backend**: the async collaborator interface to the backend process
//! - **events**: push events the backend fires without a request
//!
//! ## Hosting
//! The crate is UI-framework-free. A host constructs a
//! [`LifecycleController`] with a [`GameBackend`], a [`SettingsStore`]
//! and a [`ToastSink`], calls `bootstrap()` once, feeds window focus and
//! push events in, and renders from the controller's accessors.

pub mod backend;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod notify;
pub mod settings;
pub mod version;


pub use backend::{GameBackend, InstallationTarget, LaunchOptions, ReleaseChannel, SourceKind};
pub use error::LifecycleError;
pub use events::{PushEvent, Statistics};
pub use lifecycle::{LifecycleController, LifecycleState, StateMachine, DEFAULT_MODS_PER_PAGE};
pub use notify::{Notification, NotificationRelay, Severity, ToastSink};
pub use settings::{JsonSettingsFile, MemorySettings, SettingsStore};
pub use version::{dependency_prefix, is_outdated, CatalogEntry, InstalledModDescriptor};
