//! # Configuration Management
//!
//! Explicit configuration for the note store: the ordered direct-protocol
//! store list, the optional REST bridge descriptor, and the note defaults.
//! Nothing in the library reads the process environment on its own; callers
//! build an [`AppConfig`] (usually via [`AppConfig::from_env`]) and pass it
//! down.

mod settings;

pub use settings::{AppConfig, RestConfig};
