//! # Severa Sync
//!
//! The bidirectional sync engine: keeps a user's local store converging
//! with the shared remote backend while staying fully usable offline.
//!
//! A cycle is push then pull. Push publishes dirty local rows in
//! dependency order (pantries, items, purchases); pull fetches the user's
//! visible remote state and applies it in one local transaction. Cycles
//! are single-flight, gated on connectivity, and never surface errors to
//! the caller: failure is an outcome on the status feed, and the store
//! is left consistent either way.
//!
//! ```no_run
//! use severa_remote::MockBackend;
//! use severa_sync::{SessionManager, SyncConfig, SyncTrigger};
//!
//! let backend = MockBackend::new();
//! backend.register_user("user-1", "user1@example.com");
//!
//! let mut sessions = SessionManager::new();
//! sessions.sign_in(SyncConfig::new("user-1"), backend.connect("user-1"))?;
//!
//! let session = sessions.require_session()?;
//! session.orchestrator().sync(SyncTrigger::ResyncRequested);
//! # Ok::<(), severa_sync::SyncError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod events;
mod orchestrator;
mod pull;
mod push;
mod session;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use events::{StatusFeed, SyncEvent};
pub use orchestrator::{
    CycleOutcome, SyncOrchestrator, SyncReport, SyncStats, SyncStatus, SyncTrigger,
};
pub use pull::{PullEngine, PullSummary};
pub use push::{PushEngine, PushSummary};
pub use session::{Session, SessionManager};
