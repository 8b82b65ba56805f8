//! Continuum client: the entity store, REST transport and mutation dispatch.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use continuum_client::{EntityStore, MutationDispatcher, RestClient};
//! use continuum_common::permissions::PermissionPolicy;
//!
//! #[tokio::main]
//! async fn main() -> continuum_client::Result<()> {
//!     let rest = Arc::new(RestClient::new("http://localhost:5000", Duration::from_secs(10))?);
//!     let store = Arc::new(EntityStore::new(rest.clone()));
//!     store.init().await?;
//!
//!     let dispatcher = MutationDispatcher::new(rest, store.clone(), PermissionPolicy::default());
//!     let mut row = store.loot_history().await[0];
//!     row.player_id = 3;
//!     dispatcher.update_loot_history(&row).await?;
//!     Ok(())
//! }
//! ```

pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod memory;
pub mod rest;
pub mod session;
pub mod store;

pub use dispatcher::{DispatchOutcome, MutationDispatcher, RaidUpload, UploadTarget};
pub use error::{ClientError, Result};
pub use memory::MemoryBackend;
pub use rest::{ApiResponse, Backend, RestClient};
pub use session::{LoginForm, SessionClient, SignupCharacter, SignupForm};
pub use store::{EntityKind, EntityStore, Snapshot};
