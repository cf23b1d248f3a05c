//! Controller button remapping
//!
//! Interactive chord capture, per-application mapping profiles with a shared
//! default, and the screen controller that connects the two.

pub mod capture;
pub mod config;
pub mod input;
pub mod profile;
pub mod remap;

pub use config::RemapSettings;
pub use remap::{RemapScreen, RemapTarget, Routed};
