//! Food-chain resolution: strictly-bigger eats smaller on circle overlap.
//! Equal levels never eat each other. Runs as a periodic poll rather than
//! per-tick, so contacts are radius-padded by the caller's poll rate.

use hecs::{Entity, World};
use std::collections::HashSet;

use crate::components::{Dead, Dormant, Fish, Player, Position, Vec2};
use crate::events::{DeathCause, SimEvent};

struct Contact {
    entity: Entity,
    position: Vec2,
    level: u8,
    radius: f32,
    xp: u32,
    golden: bool,
}

/// One poll pass: fish-vs-fish predation plus player interactions.
/// Entities eaten this pass are marked `Dead`; the engine's despawn sweep
/// releases them at end of tick.
pub fn food_chain_system(
    world: &mut World,
    player: Option<&mut Player>,
    events: &mut Vec<SimEvent>,
) {
    let contacts: Vec<Contact> = world
        .query::<(&Position, &Fish)>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .map(|(entity, (pos, fish))| Contact {
            entity,
            position: pos.0,
            level: fish.level(),
            radius: fish.radius,
            xp: fish.xp(),
            golden: fish.golden,
        })
        .collect();

    let mut eaten: HashSet<Entity> = HashSet::new();

    // Fish vs fish
    for i in 0..contacts.len() {
        for j in (i + 1)..contacts.len() {
            let a = &contacts[i];
            let b = &contacts[j];
            if eaten.contains(&a.entity) || eaten.contains(&b.entity) {
                continue;
            }
            if a.level == b.level {
                continue;
            }
            let reach = a.radius + b.radius;
            if a.position.distance_squared(b.position) >= reach * reach {
                continue;
            }
            let (pred, prey) = if a.level > b.level { (a, b) } else { (b, a) };
            eaten.insert(prey.entity);
            events.push(SimEvent::FishEaten {
                eater: pred.entity,
                eaten: prey.entity,
                level: prey.level,
            });
            events.push(SimEvent::EatBurst {
                position: prey.position,
            });
        }
    }

    // Player vs fish
    if let Some(player) = player {
        if player.alive {
            for c in &contacts {
                if eaten.contains(&c.entity) {
                    continue;
                }
                let reach = player.radius + c.radius;
                if player.position.distance_squared(c.position) >= reach * reach {
                    continue;
                }
                if player.level > c.level {
                    eaten.insert(c.entity);
                    events.push(SimEvent::PlayerAte {
                        level: c.level,
                        xp: c.xp,
                        golden: c.golden,
                    });
                    events.push(SimEvent::EatBurst { position: c.position });
                } else if c.level > player.level {
                    player.alive = false;
                    events.push(SimEvent::PlayerDied {
                        cause: DeathCause::Eaten,
                    });
                    break;
                }
                // Equal level: pass through unharmed
            }
        }
    }

    for entity in eaten {
        let _ = world.insert_one(entity, Dead);
    }
}

/// Resolve a single known overlap between two fish, for hosts that detect
/// contacts themselves. Returns the eaten entity, or `None` when the levels
/// tie and nothing happens.
pub fn resolve_pair(
    world: &mut World,
    a: Entity,
    b: Entity,
    events: &mut Vec<SimEvent>,
) -> Option<Entity> {
    let level_a = world.get::<&Fish>(a).ok()?.level();
    let level_b = world.get::<&Fish>(b).ok()?.level();
    if level_a == level_b {
        return None;
    }
    let (pred, prey, prey_level) = if level_a > level_b {
        (a, b, level_b)
    } else {
        (b, a, level_a)
    };
    if world.get::<&Dead>(prey).is_ok() {
        return None;
    }
    let prey_pos = world.get::<&Position>(prey).ok()?.0;
    let _ = world.insert_one(prey, Dead);
    events.push(SimEvent::FishEaten {
        eater: pred,
        eaten: prey,
        level: prey_level,
    });
    events.push(SimEvent::EatBurst { position: prey_pos });
    Some(prey)
}
