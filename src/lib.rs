//! # Skychallenges - Challenge Progression Registry
//!
//! Skychallenges is a challenge and progression-level registry for island
//! survival game servers. It keeps a set of uniquely named challenges grouped
//! into ordered levels, persists every record independently in an embedded
//! store, and rebuilds the level ordering deterministically no matter what
//! order records come back from disk.
//!
//! ## Features
//!
//! - **Idempotent Registry**: Case-insensitive identities with last-write-wins
//!   replacement, safe to re-store records repeatedly and out of order.
//! - **Lazy Levels**: A level record is materialized and persisted the first
//!   time a challenge references it; no explicit level setup required.
//! - **Deterministic Ordering**: Levels sort by their natural order with a
//!   stable sort, so progression and "previous level" queries are repeatable.
//! - **Durable Storage**: Sled-backed, bincode-serialized, schema-versioned
//!   records flushed on every write.
//! - **Background Saves**: An optional asynchronous save path queued on a
//!   dedicated single-worker task, so bulk persistence never blocks the
//!   caller.
//! - **Seed Content**: JSON seed files for data-driven starter challenges and
//!   levels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use skychallenges::challenges::{ChallengeRegistry, ChallengeStore, ChallengesError};
//!
//! fn main() -> Result<(), ChallengesError> {
//!     let store = Arc::new(ChallengeStore::open("data/challenges")?);
//!     let registry = ChallengeRegistry::open(store)?;
//!
//!     if registry.is_first_time() {
//!         println!("no challenges configured yet");
//!     }
//!     for name in registry.challenge_names() {
//!         println!("challenge: {}", name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`challenges`] - Record types, storage, the registry and its lifecycle,
//!   challenge factories, and seed import
//! - [`config`] - TOML configuration management and validation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Host Server    │ ← panels, commands, sessions (not this crate)
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │    Registry     │ ← ordered levels, queries, lifecycle
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │ Challenge Store │ ← sled persistence, one record per key
//! └─────────────────┘
//! ```
//!
//! The registry is handed its store explicitly and callers hold the handle;
//! there is no global instance. Everything player-facing (menus, chat
//! commands, translations, rewards) is the host server's concern.

pub mod challenges;
pub mod config;
