//! Extension lifecycle management
//!
//! Discovers, installs, updates, enables and loads extensions for an
//! assistant host. [`ExtensionManager`] is the entry point; the other
//! modules are the pieces it composes:
//!
//! - [`manifest`]: `gemini-extension.json` loading and validation
//! - [`install`] and [`source`]: install provenance, allow-lists, fetching
//! - [`settings`] and [`secrets`]: scoped setting values with masking
//! - [`enablement`]: persisted enable/disable state
//! - [`hooks`], [`skills`], [`agents`]: auxiliary resources
//! - [`telemetry`]: fire-and-forget lifecycle events

pub mod agents;
pub mod config;
pub mod consent;
pub mod enablement;
pub mod error;
pub mod extension;
mod frontmatter;
pub mod hooks;
pub mod host;
pub mod install;
pub mod loader;
pub mod manager;
pub mod manifest;
pub mod secrets;
pub mod settings;
pub mod skills;
pub mod source;
pub mod telemetry;
pub mod variables;

pub use config::ManagerConfig;
pub use enablement::{EnablementScope, EnablementStore};
pub use error::{Error, ErrorKind, Result};
pub use extension::{LoadedExtension, extension_id};
pub use host::{
    AutoApprovePrompter, AutoDenyPrompter, ConsentPrompter, ExtensionHost,
    ExtensionRegistryListener, NoopRegistryListener,
};
pub use install::{InstallMetadata, InstallSource, InstallType};
pub use manager::{ExtensionManager, UpdateOutcome};
pub use manifest::{ExtensionManifest, SettingDeclaration};
pub use secrets::{FileSecretStore, MemorySecretStore, SecretStore};
pub use settings::{ResolvedSetting, SettingScope};
pub use source::is_allowed_extension_source;
pub use telemetry::{EventStatus, ExtensionEvent, ExtensionEventKind, TelemetryEmitter, TelemetrySink};
