//! Collection kinds and the small derived-field helpers shared by the
//! API client and the filter pipeline.

use serde::{Deserialize, Serialize};

/// One browsable remote collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Pokemon,
    Items,
    Cards,
    Sets,
}

pub const ALL_KINDS: [CollectionKind; 4] = [
    CollectionKind::Pokemon,
    CollectionKind::Items,
    CollectionKind::Cards,
    CollectionKind::Sets,
];

impl CollectionKind {
    /// Grid page size, constant per collection.
    pub fn page_size(self) -> u32 {
        match self {
            CollectionKind::Pokemon | CollectionKind::Items => 48,
            CollectionKind::Cards => 24,
            CollectionKind::Sets => 16,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Pokemon => "POKEMON",
            CollectionKind::Items => "ITEMS",
            CollectionKind::Cards => "CARDS",
            CollectionKind::Sets => "SETS",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            CollectionKind::Pokemon => "pokemon",
            CollectionKind::Items => "items",
            CollectionKind::Cards => "cards",
            CollectionKind::Sets => "sets",
        }
    }

    /// Whether a single bulk listing call is feasible for this collection.
    /// The card catalog is far too large; card search goes to the server.
    pub fn supports_index(self) -> bool {
        !matches!(self, CollectionKind::Cards)
    }

    pub fn supports_generations(self) -> bool {
        matches!(self, CollectionKind::Pokemon)
    }

    pub fn next(self) -> Self {
        let idx = ALL_KINDS.iter().position(|k| *k == self).unwrap_or(0);
        ALL_KINDS[(idx + 1) % ALL_KINDS.len()]
    }

    pub fn prev(self) -> Self {
        let idx = ALL_KINDS.iter().position(|k| *k == self).unwrap_or(0);
        ALL_KINDS[(idx + ALL_KINDS.len() - 1) % ALL_KINDS.len()]
    }
}

/// First national-dex number of each generation, 1-indexed by generation.
const GEN_STARTS: [u32; 9] = [1, 152, 252, 387, 494, 650, 722, 810, 906];

pub const GENERATION_COUNT: u8 = GEN_STARTS.len() as u8;
const LAST_DEX_ID: u32 = 1025;

/// Generation a national-dex id belongs to. Ids past the known dex
/// (mega forms, regional variants with synthetic ids) have none.
pub fn generation_of(id: u32) -> Option<u8> {
    if id == 0 || id > LAST_DEX_ID {
        return None;
    }
    let gen = GEN_STARTS.iter().rev().position(|start| id >= *start)?;
    Some((GEN_STARTS.len() - gen) as u8)
}

/// National-dex id of the first entry of a generation.
pub fn generation_first_id(generation: u8) -> Option<u32> {
    if generation == 0 {
        return None;
    }
    GEN_STARTS.get(generation as usize - 1).copied()
}

/// Trailing numeric id of a PokeAPI resource URL, e.g.
/// `https://pokeapi.co/api/v2/item/4/` -> 4.
pub fn id_from_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
}

/// Sprite CDN URL for an item, derived from its name.
pub fn item_sprite_url(name: &str) -> String {
    format!("https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/items/{name}.png")
}

/// Front sprite URL for a Pokemon, derived from its dex id.
pub fn pokemon_sprite_url(id: u32) -> String {
    format!(
        "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/{id}.png"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_boundaries() {
        assert_eq!(generation_of(1), Some(1));
        assert_eq!(generation_of(151), Some(1));
        assert_eq!(generation_of(152), Some(2));
        assert_eq!(generation_of(386), Some(3));
        assert_eq!(generation_of(387), Some(4));
        assert_eq!(generation_of(905), Some(8));
        assert_eq!(generation_of(906), Some(9));
        assert_eq!(generation_of(1025), Some(9));
        assert_eq!(generation_of(0), None);
        assert_eq!(generation_of(20000), None);
    }

    #[test]
    fn test_generation_first_id() {
        assert_eq!(generation_first_id(1), Some(1));
        assert_eq!(generation_first_id(4), Some(387));
        assert_eq!(generation_first_id(9), Some(906));
        assert_eq!(generation_first_id(0), None);
        assert_eq!(generation_first_id(10), None);
    }

    #[test]
    fn test_id_from_url() {
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/item/4/"), Some(4));
        assert_eq!(id_from_url("https://pokeapi.co/api/v2/pokemon/25"), Some(25));
        assert_eq!(id_from_url("https://api.pokemontcg.io/v2/cards/xy1-1"), None);
    }

    #[test]
    fn test_kind_cycle_is_closed() {
        for kind in ALL_KINDS {
            assert_eq!(kind.next().prev(), kind);
        }
        assert_eq!(CollectionKind::Sets.next(), CollectionKind::Pokemon);
    }
}
