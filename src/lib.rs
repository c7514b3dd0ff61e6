//! # Sealnote
//!
//! Sealnote is a self-destructing encrypted note store: a note is sealed
//! with a single-use share secret, parked in an expiring key-value store,
//! and destroyed by the read that exhausts its budget or by its TTL,
//! whichever comes first.
//!
//! ## Architecture
//!
//! The system follows a layered architecture pattern:
//!
//! ```text
//! CLI / Host Application → Note Service → Store Failover → Redis / REST bridge
//!         ↓                     ↓               ↓
//!    Configuration       Crypto Envelope   Atomic read-decay
//! ```
//!
//! ## Core Components
//!
//! - **Note Service**: creates and opens notes, owning the identifier and key scheme
//! - **Crypto Envelope**: HKDF-SHA-384 key derivation and AES-256-GCM sealing
//! - **Store Layer**: one transport trait, two adapter families, ordered failover
//! - **CLI**: `create`, `open`, and `health` commands over the service
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sealnote::{AppConfig, NoteService, Result, StoreFamily};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let service = NoteService::from_config(&config, StoreFamily::Direct)?;
//!
//!     let url = service.create_note("the launch code", 3600, 1).await?;
//!     println!("{}", url);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod note;
pub mod store;

// Re-export commonly used types and traits
pub use config::{AppConfig, RestConfig};
pub use errors::{NoteError, Result};
pub use note::{NoteService, NoteUrl, StoreFamily};
pub use store::NoteStore;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
