//! Seed data loaders for data-driven starter content.
//!
//! Challenge and level definitions can be shipped as JSON files and imported
//! on first run, so operators can customize initial content without
//! recompiling.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::Deserialize;

use crate::challenges::errors::ChallengesError;
use crate::challenges::registry::ChallengeRegistry;
use crate::challenges::types::{Challenge, ChallengeLevel, ChallengeType, ItemStack, FREE_LEVEL};

#[derive(Debug, Deserialize)]
struct ChallengeSeed {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_seed_level")]
    level: String,
    challenge_type: String,
    #[serde(default)]
    description: Vec<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    deployed: bool,
    #[serde(default)]
    take_items: bool,
    #[serde(default)]
    required_items: Vec<ItemStackSeed>,
    #[serde(default)]
    required_blocks: BTreeMap<String, u32>,
    #[serde(default)]
    required_entities: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct ItemStackSeed {
    kind: String,
    amount: u32,
}

#[derive(Debug, Deserialize)]
struct LevelSeed {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

fn default_seed_level() -> String {
    FREE_LEVEL.to_string()
}

fn parse_error(path: &Path, err: serde_json::Error) -> ChallengesError {
    ChallengesError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("failed to parse {}: {}", path.display(), err),
    ))
}

/// Load challenge definitions from a JSON seed file.
pub fn load_challenges_from_json<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<Challenge>, ChallengesError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let seeds: Vec<ChallengeSeed> =
        serde_json::from_str(&contents).map_err(|e| parse_error(path, e))?;
    seeds.into_iter().map(challenge_from_seed).collect()
}

fn challenge_from_seed(seed: ChallengeSeed) -> Result<Challenge, ChallengesError> {
    let challenge_type = match seed.challenge_type.to_ascii_lowercase().as_str() {
        "inventory" => ChallengeType::Inventory,
        "island" => ChallengeType::Island,
        other => {
            return Err(ChallengesError::Validation(format!(
                "unknown challenge type '{}' for seed '{}'",
                other, seed.id
            )))
        }
    };
    let mut challenge = Challenge::new(&seed.id, challenge_type)
        .with_level(&seed.level)
        .with_deployed(seed.deployed)
        .with_take_items(seed.take_items)
        .with_description(seed.description)
        .with_required_items(
            seed.required_items
                .into_iter()
                .map(|s| ItemStack::new(&s.kind, s.amount))
                .collect(),
        )
        .with_required_blocks(seed.required_blocks)
        .with_required_entities(seed.required_entities);
    if let Some(name) = seed.name {
        challenge = challenge.with_friendly_name(&name);
    }
    if let Some(icon) = seed.icon {
        challenge = challenge.with_icon(&icon);
    }
    Ok(challenge)
}

/// Load level definitions from a JSON seed file.
pub fn load_levels_from_json<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<ChallengeLevel>, ChallengesError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let seeds: Vec<LevelSeed> =
        serde_json::from_str(&contents).map_err(|e| parse_error(path, e))?;
    Ok(seeds
        .into_iter()
        .map(|seed| {
            let mut level = ChallengeLevel::new(&seed.id);
            if let Some(name) = seed.name {
                level = level.with_friendly_name(&name);
            }
            level
        })
        .collect())
}

/// Import `levels.json` and `challenges.json` from `dir`, persisting every
/// record and registering the challenges. Missing files are skipped; a
/// malformed file is an error. Records with an identity already present are
/// replaced, so re-import is idempotent. Returns how many records were
/// imported.
pub fn import_seed_dir<P: AsRef<Path>>(
    registry: &mut ChallengeRegistry,
    dir: P,
) -> Result<usize, ChallengesError> {
    let dir = dir.as_ref();
    let mut imported = 0usize;

    let levels_path = dir.join("levels.json");
    if levels_path.is_file() {
        for level in load_levels_from_json(&levels_path)? {
            registry.store().put_level(level)?;
            imported += 1;
        }
    }

    let challenges_path = dir.join("challenges.json");
    if challenges_path.is_file() {
        for challenge in load_challenges_from_json(&challenges_path)? {
            registry.store().put_challenge(challenge.clone())?;
            registry.store_challenge(challenge)?;
            imported += 1;
        }
    }

    registry.sort_challenges();
    info!("imported {} seed record(s) from {}", imported, dir.display());
    Ok(imported)
}
