//! Challenge registry data model and persistence.
//! Record types, the sled-backed object store, the ordered level registry
//! with its load/sort/save lifecycle, and the two challenge construction
//! paths live here; panels, commands and session plumbing belong to the host
//! server.

pub mod errors;
pub mod factory;
pub mod registry;
pub mod seed_loader;
pub mod storage;
pub mod types;

pub use errors::ChallengesError;
pub use factory::{create_inventory_challenge, create_surround_challenge, prettify_kind};
pub use registry::ChallengeRegistry;
pub use seed_loader::{import_seed_dir, load_challenges_from_json, load_levels_from_json};
pub use storage::{ChallengeStore, ChallengeStoreBuilder};
pub use types::*;
