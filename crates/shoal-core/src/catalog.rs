//! Level-indexed spawn catalog.
//!
//! The catalog is a read-only data asset loaded once (from JSON or built
//! programmatically for tests). Lookups for a level with no exact entry fall
//! back to the highest catalog level at or below the request.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::components::Fish;

/// A spawnable fish archetype.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FishPrototype {
    pub name: String,
    pub level: u8,
    pub speed: f32,
    pub radius: f32,
    /// Score reward override; 0 derives from level.
    #[serde(default)]
    pub xp: u32,
    #[serde(default)]
    pub golden: bool,
}

impl FishPrototype {
    /// Build the runtime component for one instance of this prototype.
    pub fn instantiate(&self) -> Fish {
        let mut fish = Fish::new(self.level, self.speed, self.radius);
        fish.set_xp(self.xp);
        fish.golden = self.golden;
        fish
    }
}

/// Stable handle into the catalog's prototype table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrototypeId(pub usize);

/// Read-only catalog mapping levels to sets of prototypes.
#[derive(Debug, Clone)]
pub struct SpawnCatalog {
    prototypes: Vec<FishPrototype>,
    /// Sorted distinct levels with at least one non-golden prototype.
    levels: Vec<u8>,
    pools: HashMap<u8, Vec<PrototypeId>>,
    golden: Option<PrototypeId>,
}

impl SpawnCatalog {
    pub fn new(prototypes: Vec<FishPrototype>) -> Result<Self, CatalogError> {
        let mut pools: HashMap<u8, Vec<PrototypeId>> = HashMap::new();
        let mut golden = None;

        for (index, proto) in prototypes.iter().enumerate() {
            if proto.golden {
                // First golden prototype wins; others are ignored.
                if golden.is_none() {
                    golden = Some(PrototypeId(index));
                }
                continue;
            }
            if proto.level == 0 {
                return Err(CatalogError::UnleveledPrototype(proto.name.clone()));
            }
            pools.entry(proto.level).or_default().push(PrototypeId(index));
        }

        let mut levels: Vec<u8> = pools.keys().copied().collect();
        levels.sort_unstable();
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self {
            prototypes,
            levels,
            pools,
            golden,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let prototypes: Vec<FishPrototype> = serde_json::from_str(json)?;
        Self::new(prototypes)
    }

    pub fn get(&self, id: PrototypeId) -> &FishPrototype {
        &self.prototypes[id.0]
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn min_level(&self) -> u8 {
        self.levels[0]
    }

    pub fn max_level(&self) -> u8 {
        self.levels[self.levels.len() - 1]
    }

    /// The pool serving `level`: exact match, else the highest level below it.
    /// `None` when every catalog level is above the request.
    fn pool_for_level(&self, level: u8) -> Option<&[PrototypeId]> {
        if let Some(pool) = self.pools.get(&level) {
            return Some(pool);
        }
        let fallback = self
            .levels
            .iter()
            .rev()
            .find(|&&candidate| candidate <= level)?;
        self.pools.get(fallback).map(|p| p.as_slice())
    }

    /// Pick a random prototype serving `level` (with lower-level fallback).
    pub fn pick(&self, level: u8, rng: &mut impl Rng) -> Option<PrototypeId> {
        let pool = self.pool_for_level(level)?;
        pool.get(rng.gen_range(0..pool.len())).copied()
    }

    /// The golden bonus prototype, falling back to a lowest-level regular
    /// prototype when no dedicated one exists.
    pub fn golden(&self) -> Option<PrototypeId> {
        self.golden
            .or_else(|| self.pools.get(&self.min_level()).and_then(|p| p.first().copied()))
    }
}

/// Catalog construction failures.
#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
    /// No non-golden prototypes at all; nothing could ever spawn.
    Empty,
    /// A regular prototype with level 0 (unassigned) cannot be indexed.
    UnleveledPrototype(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "Catalog parse error: {}", e),
            CatalogError::Empty => write!(f, "Catalog has no spawnable prototypes"),
            CatalogError::UnleveledPrototype(name) => {
                write!(f, "Prototype '{}' has no level assigned", name)
            }
        }
    }
}

impl std::error::Error for CatalogError {}
