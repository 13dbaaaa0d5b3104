/// Integration tests for the two challenge factories: inventory snapshots
/// and surround selections, including the persist-before-register contract.
use std::sync::Arc;

use skychallenges::challenges::{
    create_inventory_challenge, create_surround_challenge, ChallengeRegistry,
    ChallengeStoreBuilder, ChallengeType, ChallengesError, ItemSnapshot, ItemStack,
    OwnerInventory, SurroundSelection, FREE_LEVEL,
};
use tempfile::TempDir;

fn setup_registry() -> (TempDir, ChallengeRegistry) {
    let dir = TempDir::new().expect("tempdir");
    let store = ChallengeStoreBuilder::new(dir.path()).open().expect("store");
    (dir, ChallengeRegistry::new(Arc::new(store)))
}

#[test]
fn inventory_challenge_from_single_item_snapshot() {
    let (_dir, mut registry) = setup_registry();
    let mut owner = OwnerInventory::new(36);
    let snapshot = ItemSnapshot::new("Stone").with_slot(ItemStack::new("STONE", 1));

    let created =
        create_inventory_challenge(&mut registry, &mut owner, snapshot).expect("create");

    assert!(registry.is_challenge("Stone"));
    assert_eq!(created.challenge_type, ChallengeType::Inventory);
    assert!(created.take_items);
    assert!(!created.deployed);
    assert_eq!(created.level, FREE_LEVEL);
    assert_eq!(created.icon, "empty_map");

    let free = registry.get_challenges(FREE_LEVEL);
    assert_eq!(free.len(), 1);
    assert_eq!(free[0].unique_id, "Stone");

    // Persisted before registered.
    assert!(registry.store().challenge_exists("stone").expect("exists"));
    assert!(registry.store().level_exists(FREE_LEVEL).expect("exists"));

    // Items handed back to the owner.
    assert_eq!(owner.quantity_of("STONE"), 1);
    assert!(owner.dropped.is_empty());
}

#[test]
fn inventory_description_lists_each_requirement() {
    let (_dir, mut registry) = setup_registry();
    let mut owner = OwnerInventory::new(36);
    let snapshot = ItemSnapshot::new("Mason")
        .with_slot(ItemStack::new("STONE_BRICKS", 32))
        .with_empty_slot()
        .with_slot(ItemStack::new("AIR", 1))
        .with_slot(ItemStack::new("CLAY_BALL", 8));

    let created =
        create_inventory_challenge(&mut registry, &mut owner, snapshot).expect("create");

    assert_eq!(created.required_items.len(), 2);
    assert_eq!(
        created.description,
        vec![
            "Hand over the following items:".to_string(),
            "32 x Stone Bricks".to_string(),
            "8 x Clay Ball".to_string(),
        ]
    );
}

#[test]
fn empty_snapshot_fails_and_registry_stays_first_time() {
    let (_dir, mut registry) = setup_registry();
    let mut owner = OwnerInventory::new(36);
    let snapshot = ItemSnapshot::new("Nothing")
        .with_empty_slot()
        .with_slot(ItemStack::new("AIR", 64));

    let result = create_inventory_challenge(&mut registry, &mut owner, snapshot);
    assert!(matches!(result, Err(ChallengesError::Validation(_))));
    assert!(registry.is_first_time());
    assert!(owner.stacks.is_empty());
}

#[test]
fn surround_challenge_records_blocks_and_entities() {
    let (_dir, mut registry) = setup_registry();
    let selection = SurroundSelection::new("Zoo")
        .with_block("GLASS", 24)
        .with_entity("COW", 2)
        .with_entity("CHICKEN", 4);

    let created = create_surround_challenge(&mut registry, selection).expect("create");

    assert_eq!(created.challenge_type, ChallengeType::Island);
    assert!(created.deployed);
    assert_eq!(created.icon, "armor_stand");
    assert_eq!(created.required_blocks.get("GLASS"), Some(&24));
    assert_eq!(created.required_entities.len(), 2);
    assert!(registry.is_challenge("zoo"));
    assert!(registry.store().challenge_exists("Zoo").expect("exists"));
}

#[test]
fn empty_surround_selection_fails_without_side_effects() {
    let (_dir, mut registry) = setup_registry();
    let result = create_surround_challenge(&mut registry, SurroundSelection::new("Empty"));
    assert!(matches!(result, Err(ChallengesError::Validation(_))));
    assert!(registry.is_first_time());
    assert!(!registry.store().challenge_exists("Empty").expect("exists"));
}

#[test]
fn recreating_a_challenge_replaces_the_old_record() {
    let (_dir, mut registry) = setup_registry();
    let mut owner = OwnerInventory::new(36);

    let first = ItemSnapshot::new("Gather").with_slot(ItemStack::new("STONE", 1));
    create_inventory_challenge(&mut registry, &mut owner, first).expect("create");

    let second = ItemSnapshot::new("GATHER").with_slot(ItemStack::new("DIRT", 9));
    create_inventory_challenge(&mut registry, &mut owner, second).expect("recreate");

    assert_eq!(registry.challenge_names(), vec!["GATHER"]);
    let stored = registry.store().get_challenge("gather").expect("get");
    assert_eq!(stored.required_items[0].kind, "DIRT");
}
