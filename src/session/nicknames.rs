use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::common::types::Fingerprint;

// Word lists for generating fun nautical user nicknames.
const ADJECTIVES: &[&str] = &[
    "Salty",
    "Scurvy",
    "Barnacled",
    "Swashbuckling",
    "Landlubbing",
    "Seafaring",
    "Windswept",
    "Crusty",
    "Briny",
    "Stormy",
    "Drifting",
    "Anchored",
    "Rigged",
    "Capsized",
    "Marooned",
    "Plundering",
    "Rowdy",
    "Mutinous",
    "Jolly",
    "Rusty",
    "Groggy",
    "Sunburnt",
    "Tattered",
    "Wayward",
    "Roving",
    "Shipwrecked",
    "Weathered",
    "Tipsy",
    "Rogue",
    "Surly",
    "Cunning",
    "Fearless",
    "Grizzled",
    "Legendary",
    "Mysterious",
    "One-Eyed",
    "Peg-Legged",
    "Ragged",
    "Sneaky",
    "Tattooed",
    "Toothless",
    "Treacherous",
    "Wily",
    "Wobbly",
    "Cursed",
];

const NOUNS: &[&str] = &[
    "Buccaneer",
    "Privateer",
    "Corsair",
    "Mariner",
    "Skipper",
    "Deckhand",
    "Helmsman",
    "Bosun",
    "Quartermaster",
    "Shipmate",
    "Scallywag",
    "Rapscallion",
    "Landlubber",
    "Seadog",
    "Barnacle",
    "Kraken",
    "Mermaid",
    "Parrot",
    "Pelican",
    "Albatross",
    "Dolphin",
    "Whale",
    "Shark",
    "Octopus",
    "Jellyfish",
    "Starfish",
    "Seahorse",
    "Manatee",
    "Stingray",
    "Barracuda",
    "Mackerel",
    "Cutlass",
    "Compass",
    "Anchor",
    "Cannon",
    "Doubloon",
    "Spyglass",
    "Rigger",
    "Swabbie",
    "Castaway",
    "Smuggler",
    "Stowaway",
    "Drifter",
    "Voyager",
];

/// Stable "Adjective Noun" pseudonyms per user fingerprint.
///
/// Names are derived deterministically from the fingerprint and cached for
/// the life of the process; a session ending does not reset them.
#[derive(Default)]
pub struct NicknameRegistry {
    names: DashMap<String, String>,
}

impl NicknameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nickname_for(&self, fingerprint: &Fingerprint) -> String {
        self.names
            .entry(fingerprint.0.clone())
            .or_insert_with(|| derive_nickname(fingerprint))
            .clone()
    }
}

fn derive_nickname(fingerprint: &Fingerprint) -> String {
    let mut hasher = DefaultHasher::new();
    fingerprint.0.hash(&mut hasher);
    let mut rng = StdRng::seed_from_u64(hasher.finish());

    let adjective = ADJECTIVES.choose(&mut rng).copied().unwrap_or("Salty");
    let noun = NOUNS.choose(&mut rng).copied().unwrap_or("Buccaneer");
    format!("{adjective} {noun}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_fingerprint_same_nickname() {
        let registry = NicknameRegistry::new();
        let fingerprint = Fingerprint::from("device-1234");

        let first = registry.nickname_for(&fingerprint);
        let second = registry.nickname_for(&fingerprint);
        assert_eq!(first, second);

        // Deterministic even without the cache.
        let fresh = NicknameRegistry::new();
        assert_eq!(fresh.nickname_for(&fingerprint), first);
    }

    #[test]
    fn nickname_is_adjective_noun() {
        let registry = NicknameRegistry::new();
        let nickname = registry.nickname_for(&Fingerprint::from("device-5678"));

        let mut parts = nickname.splitn(2, ' ');
        let adjective = parts.next().unwrap();
        let noun = parts.next().unwrap();
        assert!(ADJECTIVES.contains(&adjective));
        assert!(NOUNS.contains(&noun));
    }

    #[test]
    fn distinct_fingerprints_usually_differ() {
        let registry = NicknameRegistry::new();
        let a = registry.nickname_for(&Fingerprint::from("device-a"));
        let b = registry.nickname_for(&Fingerprint::from("device-b"));
        let c = registry.nickname_for(&Fingerprint::from("device-c"));
        // Collisions are possible but three at once would be suspicious.
        assert!(a != b || b != c);
    }
}
