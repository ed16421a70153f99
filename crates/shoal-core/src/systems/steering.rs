//! Fish steering system: Wander / Chase / Flee with obstacle avoidance,
//! neighbor separation, schooling override, and leave/give-up timers.

use hecs::{Entity, World};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::{
    ray_circle_hit, Dead, Dormant, Facing, Fish, Obstacle, Player, Position, SchoolId,
    SchoolMember, SteerState, Steering, Vec2,
};
use crate::config::SimConfig;
use crate::schools::SchoolRegistry;

const FEELER_ANGLE: f32 = std::f32::consts::FRAC_PI_6; // 30 degrees
const AVOID_TURN: f32 = std::f32::consts::FRAC_PI_4; // 45 degrees

struct Neighbor {
    entity: Entity,
    position: Vec2,
    level: u8,
}

struct Update {
    entity: Entity,
    steering: Steering,
    position: Vec2,
    facing: Option<Facing>,
    left_school: Option<SchoolId>,
}

/// Advance every fish agent by one simulation tick: state decisions, then
/// steering integration. `tick` drives the 1-in-N sensor throttle.
#[allow(clippy::too_many_arguments)]
pub fn steering_system(
    world: &mut World,
    player: Option<&Player>,
    schools: &mut SchoolRegistry,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    tick: u64,
    time: f32,
    dt: f32,
) {
    let player = player.filter(|p| p.alive);

    // Snapshot neighbors and obstacles first (can't mutate while iterating)
    let neighbors: Vec<Neighbor> = world
        .query::<(&Position, &Fish)>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .map(|(entity, (pos, fish))| Neighbor {
            entity,
            position: pos.0,
            level: fish.level(),
        })
        .collect();

    let obstacles: Vec<(Vec2, f32)> = world
        .query::<(&Position, &Obstacle)>()
        .without::<&Dormant>()
        .iter()
        .map(|(_, (pos, ob))| (pos.0, ob.radius))
        .collect();

    let mut updates: Vec<Update> = Vec::with_capacity(neighbors.len());

    for (entity, (pos, fish, steering, member)) in world
        .query::<(&Position, &Fish, &Steering, Option<&SchoolMember>)>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
    {
        let position = pos.0;
        let level = fish.level();
        let mut st = steering.clone();
        st.lifetime += dt;

        let mut left_school = None;
        let mut chase_target = None;
        let mut flee_from = None;

        // 1. State decisions
        if st.cooldown_timer > 0.0 {
            // Refractory after giving up a chase: forced wander
            st.cooldown_timer -= dt;
            st.state = SteerState::Wander;
        } else {
            let threat = nearest_threat(entity, position, level, player, &neighbors, cfg);
            if let Some(threat_pos) = threat {
                st.state = SteerState::Flee;
                st.chase_timer = 0.0;
                flee_from = Some(threat_pos);
                // Break formation
                if let Some(m) = member {
                    left_school = Some(m.school);
                }
            } else if let Some(prey_pos) =
                nearest_prey(entity, position, level, player, &neighbors, cfg)
            {
                st.state = SteerState::Chase;
                chase_target = Some(prey_pos);
                st.chase_timer += dt;
                if st.chase_timer >= cfg.steering.max_chase_time {
                    // Give up
                    st.cooldown_timer = cfg.steering.chase_cooldown_time;
                    st.chase_timer = 0.0;
                    st.state = SteerState::Wander;
                    chase_target = None;
                }
            } else {
                st.state = SteerState::Wander;
                st.chase_timer = 0.0;
            }
        }

        // 2. Leaving sub-behavior (deprioritized by Flee/Chase)
        update_leaving(&mut st, position, level, player, cfg, rng, dt);

        // 3. Desired direction for the active state
        let in_school = member.is_some() && left_school.is_none();
        let target_dir = if st.state == SteerState::Wander && in_school {
            school_direction(&st, position, member, schools, cfg, time)
        } else if st.state == SteerState::Wander && st.leaving {
            st.leave_dir
        } else {
            match st.state {
                SteerState::Wander => wander_direction(&mut st, position, cfg, rng, dt),
                SteerState::Chase => chase_target
                    .map(|t| (t - position).normalized_or(st.heading))
                    .unwrap_or(st.heading),
                SteerState::Flee => flee_from
                    .map(|t| (position - t).normalized_or(st.heading))
                    .unwrap_or(st.heading),
            }
        };

        // 4. Throttled sensors, cached between evaluations
        if (tick + st.sensor_offset) % cfg.sensor_throttle.max(1) == 0 {
            st.cached_avoidance = avoidance_direction(position, st.heading, &obstacles, cfg);
            st.cached_separation = separation_direction(entity, position, level, &neighbors, cfg);
        }

        // 5. Weighted force blending, normalized once
        let mut blended = target_dir;
        if st.cached_avoidance != Vec2::ZERO {
            blended += st.cached_avoidance * cfg.steering.avoid_weight;
        }
        if st.cached_separation != Vec2::ZERO {
            blended += st.cached_separation * cfg.steering.separation_weight;
        }
        let blended = blended.normalized_or(st.heading);

        // 6. Bounded turn toward the target, never snapped
        st.heading = st
            .heading
            .slerp_toward(blended, cfg.steering.turn_smoothing * dt)
            .normalized_or(Vec2::new(1.0, 0.0));

        let speed = match st.state {
            SteerState::Flee => fish.speed * cfg.steering.flee_speed_mult,
            SteerState::Chase => fish.speed * cfg.steering.chase_speed_mult,
            SteerState::Wander => fish.speed,
        };
        let new_pos = position + st.heading * (speed * dt);

        // 7. Facing flip with deadzone hysteresis
        let facing = if st.heading.x < -cfg.steering.flip_deadzone {
            Some(Facing::Left)
        } else if st.heading.x > cfg.steering.flip_deadzone {
            Some(Facing::Right)
        } else {
            None
        };

        updates.push(Update {
            entity,
            steering: st,
            position: new_pos,
            facing,
            left_school,
        });
    }

    for update in updates {
        if let Ok(mut s) = world.get::<&mut Steering>(update.entity) {
            *s = update.steering;
        }
        if let Ok(mut p) = world.get::<&mut Position>(update.entity) {
            p.0 = update.position;
        }
        if let Some(facing) = update.facing {
            if let Ok(mut f) = world.get::<&mut Facing>(update.entity) {
                *f = facing;
            }
        }
        if let Some(school) = update.left_school {
            let _ = world.remove_one::<SchoolMember>(update.entity);
            schools.remove_member(school, update.entity);
        }
    }
}

/// Nearest strictly-bigger threat (player or fish) within the flee radius.
fn nearest_threat(
    entity: Entity,
    position: Vec2,
    level: u8,
    player: Option<&Player>,
    neighbors: &[Neighbor],
    cfg: &SimConfig,
) -> Option<Vec2> {
    let radius_sq = cfg.steering.flee_radius * cfg.steering.flee_radius;
    let mut best: Option<(f32, Vec2)> = None;

    if let Some(p) = player {
        if p.level > level {
            let d2 = position.distance_squared(p.position);
            if d2 < radius_sq {
                best = Some((d2, p.position));
            }
        }
    }
    for n in neighbors {
        if n.entity == entity || n.level <= level {
            continue;
        }
        let d2 = position.distance_squared(n.position);
        if d2 < radius_sq && best.map_or(true, |(bd2, _)| d2 < bd2) {
            best = Some((d2, n.position));
        }
    }
    best.map(|(_, pos)| pos)
}

/// Chase target selection: the player first when eligible, else the nearest
/// strictly-smaller fish. Equal-level fish are never targets (peaceful
/// coexistence is what permits schooling).
fn nearest_prey(
    entity: Entity,
    position: Vec2,
    level: u8,
    player: Option<&Player>,
    neighbors: &[Neighbor],
    cfg: &SimConfig,
) -> Option<Vec2> {
    let radius_sq = cfg.steering.chase_radius * cfg.steering.chase_radius;

    if let Some(p) = player {
        if p.level <= level && position.distance_squared(p.position) < radius_sq {
            return Some(p.position);
        }
    }

    let mut best: Option<(f32, Vec2)> = None;
    for n in neighbors {
        if n.entity == entity || n.level >= level {
            continue;
        }
        let d2 = position.distance_squared(n.position);
        if d2 < radius_sq && best.map_or(true, |(bd2, _)| d2 < bd2) {
            best = Some((d2, n.position));
        }
    }
    best.map(|(_, pos)| pos)
}

fn update_leaving(
    st: &mut Steering,
    position: Vec2,
    level: u8,
    player: Option<&Player>,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    dt: f32,
) {
    // Hard rule: over-leveled fish that have loitered too long leave for good
    if let Some(p) = player {
        if level > p.level && st.lifetime > cfg.steering.predator_overstay {
            if !st.leaving {
                start_leaving(st, position, player, cfg, rng);
            }
            st.leave_timer = f32::INFINITY;
            return;
        }
    }

    if st.state != SteerState::Wander {
        st.leaving = false;
        return;
    }

    if st.leaving {
        st.leave_timer -= dt;
        if st.leave_timer <= 0.0 {
            st.leaving = false;
        }
    } else if rng.gen::<f32>() < cfg.steering.leave_chance {
        start_leaving(st, position, player, cfg, rng);
    }
}

fn start_leaving(
    st: &mut Steering,
    position: Vec2,
    player: Option<&Player>,
    cfg: &SimConfig,
    rng: &mut SmallRng,
) {
    st.leaving = true;
    st.leave_timer = rng.gen_range(cfg.steering.leave_min_time..cfg.steering.leave_max_time);
    st.leave_dir = match player {
        Some(p) => {
            // Roughly away from the player, with spread so it's not a beeline
            let away = (position - p.position).normalized_or(st.heading);
            let spread = rng.gen_range(-AVOID_TURN..AVOID_TURN);
            away.rotated(spread)
        }
        None => Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU)),
    };
}

/// Reynolds wander: jitter a target point on a circle projected ahead of the
/// agent, in the agent's heading frame.
fn wander_direction(
    st: &mut Steering,
    position: Vec2,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    dt: f32,
) -> Vec2 {
    let jitter = cfg.steering.wander_jitter * dt * 60.0;
    st.wander_target += Vec2::new(
        rng.gen_range(-1.0..1.0) * jitter,
        rng.gen_range(-1.0..1.0) * jitter,
    );
    st.wander_target =
        st.wander_target.normalized_or(Vec2::new(1.0, 0.0)) * cfg.steering.wander_radius;

    let heading_angle = st.heading.y.atan2(st.heading.x);
    let local = st.wander_target + Vec2::new(cfg.steering.wander_distance, 0.0);
    let world_target = position + local.rotated(heading_angle);
    (world_target - position).normalized_or(st.heading)
}

/// Formation steering: school destination + member offset + organic drift.
fn school_direction(
    st: &Steering,
    position: Vec2,
    member: Option<&SchoolMember>,
    schools: &SchoolRegistry,
    cfg: &SimConfig,
    time: f32,
) -> Vec2 {
    let Some(m) = member else {
        return st.heading;
    };
    let Some(school) = schools.get(m.school) else {
        return st.heading;
    };
    let drift_t = time * cfg.school.drift_speed + st.sensor_offset as f32;
    let drift = Vec2::new(drift_t.sin(), (drift_t * 0.7).cos()) * cfg.school.drift_amount;
    let to_target = school.destination + m.offset + drift - position;
    // Drift with the current heading when very close, to avoid snapping
    if to_target.length_squared() < 0.25 {
        st.heading
    } else {
        to_target.normalized_or(st.heading)
    }
}

/// Sensor: forward ray plus two side feelers against static obstacles.
fn avoidance_direction(
    position: Vec2,
    heading: Vec2,
    obstacles: &[(Vec2, f32)],
    cfg: &SimConfig,
) -> Vec2 {
    let reach = cfg.steering.avoid_distance;

    if let Some((t, center)) = nearest_obstacle_hit(position, heading, reach, obstacles) {
        let hit_point = position + heading * t;
        let normal = (hit_point - center).normalized_or(-heading);
        return heading.reflected(normal).normalized_or(-heading);
    }

    let left = heading.rotated(FEELER_ANGLE);
    if nearest_obstacle_hit(position, left, reach * 0.7, obstacles).is_some() {
        return heading.rotated(-AVOID_TURN);
    }
    let right = heading.rotated(-FEELER_ANGLE);
    if nearest_obstacle_hit(position, right, reach * 0.7, obstacles).is_some() {
        return heading.rotated(AVOID_TURN);
    }

    Vec2::ZERO
}

fn nearest_obstacle_hit(
    origin: Vec2,
    dir: Vec2,
    max_dist: f32,
    obstacles: &[(Vec2, f32)],
) -> Option<(f32, Vec2)> {
    let mut best: Option<(f32, Vec2)> = None;
    for &(center, radius) in obstacles {
        if let Some(t) = ray_circle_hit(origin, dir, max_dist, center, radius) {
            if best.map_or(true, |(bt, _)| t < bt) {
                best = Some((t, center));
            }
        }
    }
    best
}

/// Sensor: inverse-square repulsion from same-or-higher-level neighbors.
/// Never repels from prey - a bigger fish wants that collision.
fn separation_direction(
    entity: Entity,
    position: Vec2,
    level: u8,
    neighbors: &[Neighbor],
    cfg: &SimConfig,
) -> Vec2 {
    let radius_sq = cfg.steering.separation_radius * cfg.steering.separation_radius;
    let mut separation = Vec2::ZERO;
    let mut count = 0;

    for n in neighbors {
        if n.entity == entity || n.level < level {
            continue;
        }
        let to_self = position - n.position;
        let d2 = to_self.length_squared();
        // Epsilon guard against overlapping spawns
        if d2 > 1e-3 && d2 < radius_sq {
            separation += to_self * (1.0 / d2);
            count += 1;
        }
    }

    if count > 0 {
        separation.normalized()
    } else {
        Vec2::ZERO
    }
}
