/// Integration tests for the registry lifecycle: load, save (sync and
/// background), and first-run detection against a real sled store.
use std::sync::Arc;
use std::time::Duration;

use skychallenges::challenges::{
    Challenge, ChallengeRegistry, ChallengeStore, ChallengeStoreBuilder, ChallengeType,
};
use tempfile::TempDir;

fn setup_store() -> (TempDir, Arc<ChallengeStore>) {
    let dir = TempDir::new().expect("tempdir");
    let store = ChallengeStoreBuilder::new(dir.path()).open().expect("store");
    (dir, Arc::new(store))
}

fn challenge(id: &str, level: &str) -> Challenge {
    Challenge::new(id, ChallengeType::Inventory).with_level(level)
}

#[test]
fn empty_store_loads_into_first_time_registry() {
    let (_dir, store) = setup_store();
    let registry = ChallengeRegistry::open(store).expect("open");
    assert!(registry.is_first_time());
    assert!(registry.challenge_names().is_empty());
    assert!(registry.get_challenges("").is_empty());
}

#[test]
fn save_then_load_reproduces_registry_regardless_of_insertion_order() {
    let (_dir, store) = setup_store();
    let mut registry = ChallengeRegistry::new(Arc::clone(&store));

    // Scrambled insertion order on purpose.
    registry
        .store_challenge(challenge("Last Stand", "Expert"))
        .expect("store");
    registry
        .store_challenge(challenge("First Steps", "Free"))
        .expect("store");
    registry
        .store_challenge(challenge("Stone Age", "Free"))
        .expect("store");
    registry
        .store_challenge(challenge("Iron Will", "Advanced"))
        .expect("store");
    registry.sort_challenges();
    registry.save(false).expect("save");

    let mut reloaded = ChallengeRegistry::new(store);
    reloaded.load().expect("load");

    assert_eq!(reloaded.level_names(), registry.level_names());
    for level in reloaded.level_names() {
        let mut expected: Vec<String> = registry
            .get_challenges(&level)
            .iter()
            .map(|c| c.unique_id.clone())
            .collect();
        let mut actual: Vec<String> = reloaded
            .get_challenges(&level)
            .iter()
            .map(|c| c.unique_id.clone())
            .collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected, "membership differs for level {}", level);
    }
}

#[test]
fn first_time_is_consistent_with_name_listing() {
    let (_dir, store) = setup_store();
    let mut registry = ChallengeRegistry::new(store);
    assert_eq!(registry.is_first_time(), registry.challenge_names().is_empty());

    registry
        .store_challenge(challenge("First Steps", "Free"))
        .expect("store");
    assert_eq!(registry.is_first_time(), registry.challenge_names().is_empty());
    assert!(!registry.is_first_time());
}

#[test]
fn reload_discards_unsaved_memory_state() {
    let (_dir, store) = setup_store();
    let mut registry = ChallengeRegistry::new(store);
    registry
        .store_challenge(challenge("Ephemeral", "Free"))
        .expect("store");

    // Never saved: only the lazily created level hit the disk.
    registry.load().expect("reload");
    assert!(registry.challenge_names().is_empty());
}

#[tokio::test]
async fn background_save_persists_without_blocking() {
    let (_dir, store) = setup_store();
    let mut registry = ChallengeRegistry::new(Arc::clone(&store));
    registry
        .store_challenge(challenge("Night Shift", "Free"))
        .expect("store");
    assert!(!store.challenge_exists("Night Shift").expect("exists"));

    registry.save(true).expect("queue save");

    // The worker runs off the caller's task; poll until the record lands.
    let mut persisted = false;
    for _ in 0..100 {
        if store.challenge_exists("Night Shift").expect("exists") {
            persisted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(persisted, "background save did not complete in time");

    // A second queued save goes through the same worker.
    registry
        .store_challenge(challenge("Day Shift", "Free"))
        .expect("store");
    registry.save(true).expect("queue save again");
    let mut persisted = false;
    for _ in 0..100 {
        if store.challenge_exists("Day Shift").expect("exists") {
            persisted = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(persisted, "second background save did not complete in time");
}
