//! Construction paths for new challenges: one from a consumed item
//! snapshot, one from a surround selection. Both persist first and register
//! second, so a failed write never leaves a challenge visible in the
//! registry.

use log::debug;

use crate::challenges::errors::ChallengesError;
use crate::challenges::registry::ChallengeRegistry;
use crate::challenges::types::{
    Challenge, ChallengeType, ItemSnapshot, OwnerInventory, SurroundSelection, FREE_LEVEL,
};

/// Icon token for freshly created inventory challenges.
const INVENTORY_ICON: &str = "empty_map";
/// Icon token for freshly created surround challenges.
const ISLAND_ICON: &str = "armor_stand";

/// Build an inventory challenge from a consumed item snapshot.
///
/// The snapshot's non-placeholder stacks become the required items and its
/// title becomes the identity. The snapshot is consumed: its items are handed
/// back to `owner`, with spillover past capacity recorded in
/// `owner.dropped`. Undeployed until an operator flips it live.
pub fn create_inventory_challenge(
    registry: &mut ChallengeRegistry,
    owner: &mut OwnerInventory,
    snapshot: ItemSnapshot,
) -> Result<Challenge, ChallengesError> {
    if snapshot.title.trim().is_empty() {
        return Err(ChallengesError::Validation(
            "challenge name is empty".to_string(),
        ));
    }
    let required_items = snapshot.required_items();
    if required_items.is_empty() {
        return Err(ChallengesError::Validation(
            "snapshot holds no items to require".to_string(),
        ));
    }

    let description = describe_requirements(
        "Hand over the following items:",
        required_items
            .iter()
            .map(|stack| (stack.kind.as_str(), stack.amount)),
    );
    let challenge = Challenge::new(&snapshot.title, ChallengeType::Inventory)
        .with_level(FREE_LEVEL)
        .with_icon(INVENTORY_ICON)
        .with_take_items(true)
        .with_deployed(false)
        .with_required_items(required_items)
        .with_description(description);

    // The snapshot is consumed either way: hand its items back to the owner.
    for stack in snapshot.slots.into_iter().flatten() {
        if !stack.is_placeholder() {
            owner.accept(stack);
        }
    }

    persist_and_register(registry, challenge)
}

/// Build a surround challenge from a block/entity selection. Deployed
/// immediately, since the selection was taken from a live island.
pub fn create_surround_challenge(
    registry: &mut ChallengeRegistry,
    selection: SurroundSelection,
) -> Result<Challenge, ChallengesError> {
    if selection.name.trim().is_empty() {
        return Err(ChallengesError::Validation(
            "challenge name is empty".to_string(),
        ));
    }
    if selection.is_empty() {
        return Err(ChallengesError::Validation("nothing selected".to_string()));
    }

    let description = describe_requirements(
        "Surround yourself with:",
        selection
            .required_blocks
            .iter()
            .chain(selection.required_entities.iter())
            .map(|(kind, count)| (kind.as_str(), *count)),
    );
    let challenge = Challenge::new(&selection.name, ChallengeType::Island)
        .with_level(FREE_LEVEL)
        .with_icon(ISLAND_ICON)
        .with_deployed(true)
        .with_required_blocks(selection.required_blocks)
        .with_required_entities(selection.required_entities)
        .with_description(description);

    persist_and_register(registry, challenge)
}

fn persist_and_register(
    registry: &mut ChallengeRegistry,
    challenge: Challenge,
) -> Result<Challenge, ChallengesError> {
    registry.store().put_challenge(challenge.clone())?;
    registry.store_challenge(challenge.clone())?;
    debug!("created challenge {}", challenge.unique_id);
    Ok(challenge)
}

/// One header line followed by `<amount> x <Pretty Kind>` per requirement.
fn describe_requirements<'a>(
    header: &str,
    requirements: impl Iterator<Item = (&'a str, u32)>,
) -> Vec<String> {
    let mut lines = vec![header.to_string()];
    for (kind, amount) in requirements {
        lines.push(format!("{} x {}", amount, prettify_kind(kind)));
    }
    lines
}

/// Turn a raw type token like `COBBLE_STONE` into `Cobble Stone`.
pub fn prettify_kind(kind: &str) -> String {
    kind.split(['_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
