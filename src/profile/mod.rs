//! Per-scope button mapping and combo tables
//!
//! Scope `0` is the default profile every application falls back to; any other
//! id is one application's profile.

pub mod input_profile;
pub mod record;
pub mod storage;
pub mod store;

pub use input_profile::InputProfile;
pub use record::{ButtonOverride, ComboOverride, ProfileRecord, PROFILE_RECORD_VERSION};
pub use storage::{MemoryStorage, ProfileStorage, StorageError, TomlDirStorage};
pub use store::ProfileStore;

pub type AppId = u32;

/// Scope of the default profile
pub const DEFAULT_APP_ID: AppId = 0;
