//! Async table hosting.
//!
//! Each table runs in its own tokio task with an mpsc inbox; the
//! [`TableActor`] owns the rules core and is the only code that touches
//! it, so no locks guard game state. Turn timeouts and the inter-hand
//! delay are loopback timer messages guarded by a generation counter.
//! The [`TableRegistry`] spawns actors and tracks the live handles.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_table::game::Action;
//! use holdem_table::table::{TableConfig, TableRegistry};
//!
//! # async fn demo() -> Result<(), holdem_table::table::TableError> {
//! let registry = TableRegistry::new();
//! let handle = registry.create(TableConfig::default()).await.unwrap();
//!
//! let alice = handle.join("alice".into()).await?;
//! let bob = handle.join("bob".into()).await?;
//! handle.start_hand().await?;
//!
//! let snapshot = handle.snapshot(Some(alice)).await?;
//! if snapshot.seats.iter().any(|s| s.id == alice && s.to_act) {
//!     handle.act(alice, Action::Call).await?;
//! }
//! # let _ = bob;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;

pub use actor::{TableActor, TableError, TableHandle, TableId};
pub use config::{ConfigError, TableConfig};
pub use messages::{TableCommand, TableUpdate};
pub use registry::{RegistryError, TableRegistry};
