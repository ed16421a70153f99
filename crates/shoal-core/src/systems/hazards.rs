//! Hazard state machines: hooks and sharks. Both kill the player on contact
//! regardless of level; the shark also eats any fish crossing its path.

use hecs::{Entity, World};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::{
    Bounds, Dead, Dormant, Fish, Hook, HookState, Player, Position, Shark, SharkState, Vec2,
};
use crate::config::SimConfig;
use crate::events::{DeathCause, SimEvent};

/// Step all active hooks: drop, roam between the viewport's soft side
/// bounds, retract, and mark `Dead` once clear above the water line.
pub fn hook_system(
    world: &mut World,
    player: Option<&mut Player>,
    viewport: Bounds,
    rng: &mut SmallRng,
    events: &mut Vec<SimEvent>,
    dt: f32,
) {
    struct Step {
        entity: Entity,
        hook: Hook,
        position: Vec2,
        done: bool,
    }

    let mut steps = Vec::new();
    let left = viewport.left() + 1.0;
    let right = viewport.right() - 1.0;

    for (entity, (pos, hook)) in world
        .query::<(&Position, &Hook)>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
    {
        let mut hook = hook.clone();
        let mut position = pos.0;
        let mut done = false;

        match hook.state {
            HookState::Dropping => {
                position.y -= hook.fall_speed * dt;
                if position.y <= hook.target_depth {
                    position.y = hook.target_depth;
                    hook.state = HookState::Roaming;
                    hook.roam_dir = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                    hook.life_timer = hook.roam_duration;
                }
            }
            HookState::Roaming => {
                position.x += hook.roam_dir * hook.roam_speed * dt;
                if position.x <= left {
                    position.x = left;
                    hook.roam_dir = 1.0;
                } else if position.x >= right {
                    position.x = right;
                    hook.roam_dir = -1.0;
                }
                hook.life_timer -= dt;
                if hook.life_timer <= 0.0 {
                    hook.state = HookState::Retracting;
                }
            }
            HookState::Retracting => {
                position.y += hook.retract_speed * dt;
                if position.y > viewport.top() + 2.0 {
                    done = true;
                }
            }
        }

        steps.push(Step { entity, hook, position, done });
    }

    let player = player.filter(|p| p.alive);
    let mut player_hit = false;
    if let Some(p) = &player {
        for step in &steps {
            let reach = step.hook.radius + p.radius;
            if !step.done && step.position.distance_squared(p.position) < reach * reach {
                player_hit = true;
                break;
            }
        }
    }

    for step in steps {
        if let Ok(mut h) = world.get::<&mut Hook>(step.entity) {
            *h = step.hook;
        }
        if let Ok(mut pos) = world.get::<&mut Position>(step.entity) {
            pos.0 = step.position;
        }
        if step.done {
            let _ = world.insert_one(step.entity, Dead);
        }
    }

    if player_hit {
        if let Some(p) = player {
            p.alive = false;
            events.push(SimEvent::PlayerDied {
                cause: DeathCause::Hook,
            });
        }
    }
}

/// Step the shark charge: count down the warning, sweep across the arena on
/// its locked row eating fish en route, and mark `Dead` once the grace delay
/// after passing the far edge runs out.
pub fn shark_system(
    world: &mut World,
    player: Option<&mut Player>,
    viewport: Bounds,
    cfg: &SimConfig,
    events: &mut Vec<SimEvent>,
    dt: f32,
) {
    struct Step {
        entity: Entity,
        shark: Shark,
        position: Vec2,
        done: bool,
    }

    let mut steps = Vec::new();
    for (entity, (pos, shark)) in world
        .query::<(&Position, &Shark)>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
    {
        let mut shark = shark.clone();
        let mut position = pos.0;
        let mut done = false;

        match shark.state {
            SharkState::Warning => {
                shark.warn_timer -= dt;
                if shark.warn_timer <= 0.0 {
                    shark.state = SharkState::Charging;
                    events.push(SimEvent::SharkSpawned { entity });
                }
            }
            SharkState::Charging => {
                position.x += shark.dir * shark.speed * dt;
                position.y = shark.charge_row;
                let past = if shark.dir > 0.0 {
                    position.x > viewport.right() + 5.0
                } else {
                    position.x < viewport.left() - 5.0
                };
                if past {
                    shark.state = SharkState::Passed;
                    shark.grace_timer = cfg.hazards.shark_grace;
                }
            }
            SharkState::Passed => {
                shark.grace_timer -= dt;
                if shark.grace_timer <= 0.0 {
                    done = true;
                }
            }
        }

        steps.push(Step { entity, shark, position, done });
    }

    // Contact sweeps only happen mid-charge
    let mut eaten_fish = Vec::new();
    let mut player_hit = false;
    let player = player.filter(|p| p.alive);
    for step in &steps {
        if step.shark.state != SharkState::Charging {
            continue;
        }
        for (fish_entity, (pos, fish)) in world
            .query::<(&Position, &Fish)>()
            .without::<&Dormant>()
            .without::<&Dead>()
            .iter()
        {
            let reach = step.shark.radius + fish.radius;
            if step.position.distance_squared(pos.0) < reach * reach {
                eaten_fish.push((fish_entity, pos.0));
            }
        }
        if let Some(p) = &player {
            let reach = step.shark.radius + p.radius;
            if step.position.distance_squared(p.position) < reach * reach {
                player_hit = true;
            }
        }
    }

    for step in steps {
        if let Ok(mut s) = world.get::<&mut Shark>(step.entity) {
            *s = step.shark;
        }
        if let Ok(mut pos) = world.get::<&mut Position>(step.entity) {
            pos.0 = step.position;
        }
        if step.done {
            let _ = world.insert_one(step.entity, Dead);
        }
    }

    for (entity, position) in eaten_fish {
        if world.get::<&Dead>(entity).is_err() {
            let _ = world.insert_one(entity, Dead);
            events.push(SimEvent::EatBurst { position });
        }
    }

    if player_hit {
        if let Some(p) = player {
            p.alive = false;
            events.push(SimEvent::PlayerDied {
                cause: DeathCause::Shark,
            });
        }
    }
}
