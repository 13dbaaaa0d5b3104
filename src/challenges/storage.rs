use std::path::{Path, PathBuf};

use sled::IVec;

use crate::challenges::errors::ChallengesError;
use crate::challenges::types::{
    identity_key, Challenge, ChallengeLevel, CHALLENGE_SCHEMA_VERSION, LEVEL_SCHEMA_VERSION,
};

const TREE_CHALLENGES: &str = "challenges";
const TREE_LEVELS: &str = "challenge_levels";

/// Helper builder so tests can easily create throwaway stores with custom
/// paths.
pub struct ChallengeStoreBuilder {
    path: PathBuf,
}

impl ChallengeStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<ChallengeStore, ChallengesError> {
        ChallengeStore::open(self.path)
    }
}

/// Sled-backed persistence for challenge and level records.
///
/// Records are bincode-serialized and keyed by their case-folded identity, so
/// ids differing only by case address the same slot. Every write is flushed
/// before returning.
pub struct ChallengeStore {
    _db: sled::Db,
    challenges: sled::Tree,
    levels: sled::Tree,
}

impl ChallengeStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ChallengesError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let challenges = db.open_tree(TREE_CHALLENGES)?;
        let levels = db.open_tree(TREE_LEVELS)?;
        Ok(Self {
            _db: db,
            challenges,
            levels,
        })
    }

    fn challenge_key(id: &str) -> Vec<u8> {
        format!("challenges:{}", identity_key(id)).into_bytes()
    }

    fn level_key(id: &str) -> Vec<u8> {
        format!("levels:{}", identity_key(id)).into_bytes()
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ChallengesError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, ChallengesError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    /// Insert or update a challenge record.
    pub fn put_challenge(&self, mut challenge: Challenge) -> Result<(), ChallengesError> {
        challenge.schema_version = CHALLENGE_SCHEMA_VERSION;
        let key = Self::challenge_key(&challenge.unique_id);
        let bytes = Self::serialize(&challenge)?;
        self.challenges.insert(key, bytes)?;
        self.challenges.flush()?;
        Ok(())
    }

    /// Fetch a challenge record by identity.
    pub fn get_challenge(&self, id: &str) -> Result<Challenge, ChallengesError> {
        let key = Self::challenge_key(id);
        let Some(bytes) = self.challenges.get(&key)? else {
            return Err(ChallengesError::NotFound(format!("challenge: {}", id)));
        };
        let record: Challenge = Self::deserialize(bytes)?;
        if record.schema_version != CHALLENGE_SCHEMA_VERSION {
            return Err(ChallengesError::SchemaMismatch {
                entity: "challenge",
                expected: CHALLENGE_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn challenge_exists(&self, id: &str) -> Result<bool, ChallengesError> {
        Ok(self.challenges.contains_key(Self::challenge_key(id))?)
    }

    /// Load every stored challenge. Scan order is the tree's key order;
    /// callers must not rely on it.
    pub fn list_challenges(&self) -> Result<Vec<Challenge>, ChallengesError> {
        let mut records = Vec::new();
        for entry in self.challenges.scan_prefix(b"challenges:") {
            let (_, value) = entry?;
            records.push(Self::deserialize(value)?);
        }
        Ok(records)
    }

    /// Insert or update a level record.
    pub fn put_level(&self, mut level: ChallengeLevel) -> Result<(), ChallengesError> {
        level.schema_version = LEVEL_SCHEMA_VERSION;
        let key = Self::level_key(&level.unique_id);
        let bytes = Self::serialize(&level)?;
        self.levels.insert(key, bytes)?;
        self.levels.flush()?;
        Ok(())
    }

    /// Fetch a level record by identity.
    pub fn get_level(&self, id: &str) -> Result<ChallengeLevel, ChallengesError> {
        let key = Self::level_key(id);
        let Some(bytes) = self.levels.get(&key)? else {
            return Err(ChallengesError::NotFound(format!("level: {}", id)));
        };
        let record: ChallengeLevel = Self::deserialize(bytes)?;
        if record.schema_version != LEVEL_SCHEMA_VERSION {
            return Err(ChallengesError::SchemaMismatch {
                entity: "level",
                expected: LEVEL_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn level_exists(&self, id: &str) -> Result<bool, ChallengesError> {
        Ok(self.levels.contains_key(Self::level_key(id))?)
    }

    /// Load every stored level, in unspecified order.
    pub fn list_levels(&self) -> Result<Vec<ChallengeLevel>, ChallengesError> {
        let mut records = Vec::new();
        for entry in self.levels.scan_prefix(b"levels:") {
            let (_, value) = entry?;
            records.push(Self::deserialize(value)?);
        }
        Ok(records)
    }
}
