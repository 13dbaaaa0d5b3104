//! The in-memory challenge registry: an ordered mapping from progression
//! level to challenge membership, with load/sort/save lifecycle on top of
//! [`ChallengeStore`].

use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::challenges::errors::ChallengesError;
use crate::challenges::storage::ChallengeStore;
use crate::challenges::types::{Challenge, ChallengeLevel};

/// One level together with its challenge membership. Membership is a set
/// keyed by case-folded identity; the Vec only carries in-process iteration
/// order, which is unspecified.
#[derive(Debug, Clone)]
struct LevelEntry {
    level: ChallengeLevel,
    challenges: Vec<Challenge>,
}

type Snapshot = Vec<LevelEntry>;

/// Registry of challenges grouped into ordered levels.
///
/// The registry is an explicitly constructed service: callers hold a handle,
/// there is no process-wide instance. Mutating operations take `&mut self`,
/// so a single logical owner drives store/sort/save. The background half of
/// [`save`](ChallengeRegistry::save) runs on a dedicated single-worker task
/// against a snapshot, never against the live mapping, and jobs queue FIFO so
/// two saves cannot overlap.
pub struct ChallengeRegistry {
    store: Arc<ChallengeStore>,
    levels: Vec<LevelEntry>,
    save_queue: Option<mpsc::UnboundedSender<Snapshot>>,
}

impl ChallengeRegistry {
    /// Create an empty registry over `store`. Call
    /// [`load`](ChallengeRegistry::load) to pull persisted records.
    pub fn new(store: Arc<ChallengeStore>) -> Self {
        Self {
            store,
            levels: Vec::new(),
            save_queue: None,
        }
    }

    /// Create a registry and immediately load persisted records.
    pub fn open(store: Arc<ChallengeStore>) -> Result<Self, ChallengesError> {
        let mut registry = Self::new(store);
        registry.load()?;
        Ok(registry)
    }

    /// The underlying object store.
    pub fn store(&self) -> &ChallengeStore {
        &self.store
    }

    /// Clear all in-memory state and reload every challenge from the store.
    ///
    /// Records arrive in unspecified order; each one is re-stored (resolving
    /// its level lazily) and the mapping is sorted afterwards. Safe to call
    /// repeatedly; an empty store leaves an empty registry.
    pub fn load(&mut self) -> Result<(), ChallengesError> {
        self.levels.clear();
        let challenges = self.store.list_challenges()?;
        let total = challenges.len();
        for challenge in challenges {
            debug!(
                "loading challenge {} (level {})",
                log_safe(&challenge.friendly_name),
                log_safe(&challenge.level)
            );
            self.store_challenge(challenge)?;
        }
        self.sort_challenges();
        info!(
            "loaded {} challenge(s) across {} level(s)",
            total,
            self.levels.len()
        );
        Ok(())
    }

    /// Idempotent upsert. A challenge with the same identity
    /// (case-insensitive) replaces the previous record, whichever level it
    /// lived in. The declared level is loaded from the store, or created and
    /// persisted on first sighting; a brand-new level is appended at the end
    /// until [`sort_challenges`](ChallengeRegistry::sort_challenges) runs.
    pub fn store_challenge(&mut self, challenge: Challenge) -> Result<(), ChallengesError> {
        let level = self.resolve_level(&challenge.level)?;
        self.remove_identity(&challenge.identity_key());
        match self.levels.iter_mut().find(|entry| entry.level == level) {
            Some(entry) => entry.challenges.push(challenge),
            None => self.levels.push(LevelEntry {
                level,
                challenges: vec![challenge],
            }),
        }
        Ok(())
    }

    /// Resolve a level identity against the store, materializing and
    /// persisting a new record the first time a challenge references it.
    fn resolve_level(&self, level_id: &str) -> Result<ChallengeLevel, ChallengesError> {
        if self.store.level_exists(level_id)? {
            return self.store.get_level(level_id);
        }
        debug!("materializing level {}", log_safe(level_id));
        let level = ChallengeLevel::new(level_id);
        self.store.put_level(level.clone())?;
        Ok(level)
    }

    fn remove_identity(&mut self, key: &str) {
        for entry in &mut self.levels {
            entry.challenges.retain(|c| c.identity_key() != key);
        }
    }

    /// Reorder levels by their natural order. Stable; membership sets are
    /// untouched.
    pub fn sort_challenges(&mut self) {
        self.levels.sort_by(|a, b| a.level.cmp(&b.level));
    }

    /// Challenge membership for `level_id` (case-insensitive). A blank id
    /// selects the first level in current order; an empty registry or an
    /// unknown id yields an empty slice.
    pub fn get_challenges(&self, level_id: &str) -> &[Challenge] {
        if level_id.trim().is_empty() {
            return self
                .levels
                .first()
                .map(|entry| entry.challenges.as_slice())
                .unwrap_or(&[]);
        }
        self.levels
            .iter()
            .find(|entry| entry.level.matches(level_id))
            .map(|entry| entry.challenges.as_slice())
            .unwrap_or(&[])
    }

    /// The level immediately preceding `level_id` in current order, or `None`
    /// when that level is first or not present.
    pub fn get_previous_level(&self, level_id: &str) -> Option<&ChallengeLevel> {
        let position = self
            .levels
            .iter()
            .position(|entry| entry.level.matches(level_id))?;
        position.checked_sub(1).map(|i| &self.levels[i].level)
    }

    /// Check if a challenge exists - case insensitive.
    pub fn is_challenge(&self, name: &str) -> bool {
        self.get_challenge(name).is_some()
    }

    /// Get a challenge by name, or `None` if it does not exist.
    pub fn get_challenge(&self, name: &str) -> Option<&Challenge> {
        self.levels
            .iter()
            .flat_map(|entry| entry.challenges.iter())
            .find(|challenge| challenge.matches(name))
    }

    /// Every challenge identity, flattened in current level order. Order
    /// within a level is unspecified.
    pub fn challenge_names(&self) -> Vec<String> {
        self.levels
            .iter()
            .flat_map(|entry| entry.challenges.iter())
            .map(|challenge| challenge.unique_id.clone())
            .collect()
    }

    /// Level identities in current order.
    pub fn level_names(&self) -> Vec<String> {
        self.levels
            .iter()
            .map(|entry| entry.level.unique_id.clone())
            .collect()
    }

    /// True while the registry holds no levels at all; drives first-run
    /// onboarding.
    pub fn is_first_time(&self) -> bool {
        self.levels.is_empty()
    }

    /// Persist every level and every challenge back to the store.
    ///
    /// The synchronous path attempts the whole batch even when individual
    /// records fail and surfaces the failures as one
    /// [`ChallengesError::SaveIncomplete`]. With `background` set, the
    /// current contents are snapshotted and queued on this registry's save
    /// worker (spawned on first use, so a tokio runtime must be present);
    /// completion is unordered with respect to later calls, and failures are
    /// logged rather than returned. Callers needing a durability guarantee
    /// use the synchronous path.
    pub fn save(&mut self, background: bool) -> Result<(), ChallengesError> {
        if background {
            let snapshot = self.levels.clone();
            return self
                .save_worker()
                .send(snapshot)
                .map_err(|_| ChallengesError::Internal("save worker unavailable".to_string()));
        }
        save_snapshot(&self.store, &self.levels)
    }

    fn save_worker(&mut self) -> mpsc::UnboundedSender<Snapshot> {
        if let Some(sender) = &self.save_queue {
            return sender.clone();
        }
        let (sender, mut receiver) = mpsc::unbounded_channel::<Snapshot>();
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            while let Some(snapshot) = receiver.recv().await {
                if let Err(err) = save_snapshot(&store, &snapshot) {
                    error!("background save failed: {}", err);
                }
            }
        });
        self.save_queue = Some(sender.clone());
        sender
    }
}

/// Write one snapshot out, continuing past individual failures so the rest of
/// the batch still lands. Failed identities are reported in aggregate.
fn save_snapshot(store: &ChallengeStore, entries: &[LevelEntry]) -> Result<(), ChallengesError> {
    let mut failed = Vec::new();
    let mut first_error: Option<String> = None;
    for entry in entries {
        if let Err(err) = store.put_level(entry.level.clone()) {
            if first_error.is_none() {
                first_error = Some(err.to_string());
            }
            failed.push(entry.level.unique_id.clone());
        }
        for challenge in &entry.challenges {
            if let Err(err) = store.put_challenge(challenge.clone()) {
                if first_error.is_none() {
                    first_error = Some(err.to_string());
                }
                failed.push(challenge.unique_id.clone());
            }
        }
    }
    match first_error {
        None => Ok(()),
        Some(first_error) => Err(ChallengesError::SaveIncomplete {
            failed,
            first_error,
        }),
    }
}

/// Collapse control characters in user-supplied names and cap the length so
/// log lines stay single-line.
fn log_safe(name: &str) -> String {
    const MAX_CHARS: usize = 64;
    let mut out: String = name
        .chars()
        .take(MAX_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if name.chars().nth(MAX_CHARS).is_some() {
        out.push('…');
    }
    out
}
