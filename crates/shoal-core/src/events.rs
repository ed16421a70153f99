//! Outbound notifications.
//!
//! The core emits these fire-and-forget; the host drains them after each
//! tick and forwards them to score/XP, UI, and VFX layers. Nothing in the
//! simulation waits on acknowledgment.

use hecs::Entity;

use crate::components::Vec2;

/// What killed the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Eaten by a higher-level fish.
    Eaten,
    Hook,
    Shark,
}

/// A simulation notification for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    FishSpawned {
        entity: Entity,
        level: u8,
        golden: bool,
        position: Vec2,
    },
    FishDespawned {
        entity: Entity,
        level: u8,
    },
    /// One fish ate another.
    FishEaten {
        eater: Entity,
        eaten: Entity,
        level: u8,
    },
    /// The player ate a fish; carries the score reward.
    PlayerAte {
        level: u8,
        xp: u32,
        golden: bool,
    },
    PlayerDied {
        cause: DeathCause,
    },
    HookSpawned {
        entity: Entity,
    },
    /// A shark event is incoming on `row`; hosts show the warning indicator.
    SharkWarning {
        row: f32,
        from_left: bool,
    },
    SharkSpawned {
        entity: Entity,
    },
    HazardDespawned {
        entity: Entity,
    },
    /// Cosmetic: eat-burst particles at a position.
    EatBurst {
        position: Vec2,
    },
    /// Cosmetic: splash where a fish entered the arena.
    SpawnSplash {
        position: Vec2,
    },
}
