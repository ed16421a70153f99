//! Population control: periodic fish spawns weighted around the player's
//! level, school creation, hazard rolls, and off-screen culling.
//!
//! Culls never remove anything the player can see. At the population cap the
//! spawner frees a slot instead of spawning, and the caller keeps its spawn
//! timer hot so the replacement arrives on the next tick.

use hecs::{Entity, World};
use log::warn;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::catalog::SpawnCatalog;
use crate::components::{
    Bounds, Dead, Dormant, Facing, Fish, Hook, HookState, Player, Position, SchoolMember, Shark,
    SharkState, Steering, Vec2,
};
use crate::config::SimConfig;
use crate::events::SimEvent;
use crate::pool::{EntityPool, PoolKey};
use crate::schools::SchoolRegistry;

/// A hook queued for a delayed drop, used to desync paired hooks.
#[derive(Debug, Clone)]
pub struct PendingHook {
    pub delay: f32,
    /// Which viewport half to drop on; `None` picks randomly.
    pub force_left: Option<bool>,
}

pub fn active_fish_count(world: &World) -> usize {
    world
        .query::<&Fish>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .count()
}

pub fn predator_count(world: &World, player_level: u8) -> usize {
    world
        .query::<&Fish>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .filter(|(_, fish)| fish.level() > player_level)
        .count()
}

pub fn active_hook_count(world: &World) -> usize {
    world
        .query::<&Hook>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .count()
}

pub fn shark_active(world: &World) -> bool {
    world
        .query::<&Shark>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .next()
        .is_some()
}

/// One spawn-timer expiry: try hazards first, then a fish. Returns `true`
/// when the population was at cap and a cull freed a slot instead, so the
/// caller should retry without waiting out a full interval.
#[allow(clippy::too_many_arguments)]
pub fn spawn_tick(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &SpawnCatalog,
    schools: &mut SchoolRegistry,
    pending_hooks: &mut Vec<PendingHook>,
    player: Option<&Player>,
    viewport: Bounds,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    events: &mut Vec<SimEvent>,
) -> bool {
    let player_level = player.map(|p| p.level).unwrap_or(catalog.min_level());

    // A hazard takes the whole spawn slot: hooks first, then the shark,
    // and only otherwise a regular fish
    if active_hook_count(world) == 0
        && pending_hooks.is_empty()
        && rng.gen::<f32>() < cfg.hook_chance(player_level)
    {
        let first_left = rng.gen_bool(0.5);
        spawn_hook(world, pool, viewport, cfg, rng, Some(first_left), events);
        // Hooks sometimes come in desynced pairs on opposite halves
        if rng.gen::<f32>() < cfg.hazards.hook_pair_chance {
            pending_hooks.push(PendingHook {
                delay: rng
                    .gen_range(cfg.hazards.hook_pair_delay_min..cfg.hazards.hook_pair_delay_max),
                force_left: Some(!first_left),
            });
        }
        return false;
    }

    if !shark_active(world) && rng.gen::<f32>() < cfg.shark_chance(player_level) {
        spawn_shark(world, pool, cfg, rng, events);
        return false;
    }

    if active_fish_count(world) >= cfg.spawn.max_population {
        return capacity_cull(world, viewport, player_level, cfg) > 0;
    }

    // Golden fish pre-empt the normal level draw
    if rng.gen::<f32>() < cfg.golden_chance(player_level) {
        if let Some(proto_id) = catalog.golden() {
            let (position, heading) = entry_point(viewport, cfg, rng);
            spawn_fish(world, pool, catalog, proto_id, position, heading, cfg, rng, events);
            return false;
        }
    }

    let predators_full = predator_count(world, player_level) >= cfg.spawn.predator_cap;
    let level = choose_level(player_level, catalog, cfg, rng, predators_full);

    // Only bottom-tier fish school, and mostly while the player is still
    // down there with them
    let school_chance = if player_level == catalog.min_level() {
        cfg.spawn.school_chance_level1
    } else {
        cfg.spawn.school_chance
    };
    let grouped = level == catalog.min_level() && rng.gen::<f32>() < school_chance;

    if grouped {
        spawn_school(world, pool, catalog, schools, level, viewport, cfg, rng, events);
    } else {
        match catalog.pick(level, rng) {
            Some(proto_id) => {
                let (position, heading) = entry_point(viewport, cfg, rng);
                spawn_fish(world, pool, catalog, proto_id, position, heading, cfg, rng, events);
            }
            None => {
                warn!("no prototype at or below level {}; dropping spawn", level);
            }
        }
    }

    false
}

/// Level draw biased around the player: mostly eatable, occasionally one
/// level above, never more.
fn choose_level(
    player_level: u8,
    catalog: &SpawnCatalog,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    predators_full: bool,
) -> u8 {
    let eatable = predators_full || rng.gen::<f32>() < cfg.spawn.eatable_chance;
    if eatable {
        if player_level > catalog.min_level() && rng.gen::<f32>() < cfg.lower_level_chance(player_level)
        {
            rng.gen_range(catalog.min_level()..player_level)
        } else {
            player_level.min(catalog.max_level())
        }
    } else {
        (player_level + 1).min(catalog.max_level())
    }
}

/// Pick an off-screen entry just past a random side edge, heading toward
/// the middle of the view.
fn entry_point(viewport: Bounds, cfg: &SimConfig, rng: &mut SmallRng) -> (Vec2, Vec2) {
    let from_left = rng.gen_bool(0.5);
    let jitter = rng.gen_range(-1.0..1.0);
    let x = if from_left {
        viewport.left() - cfg.spawn.spawn_buffer + jitter
    } else {
        viewport.right() + cfg.spawn.spawn_buffer + jitter
    };
    let y_limit = cfg.world_half_height - 1.0;
    let y = rng.gen_range(-y_limit..y_limit);
    let position = Vec2::new(x, y);
    let inward = Vec2::new(if from_left { 1.0 } else { -1.0 }, 0.0);
    let heading = (viewport.center - position).normalized_or(inward);
    (position, heading)
}

/// Spawn or reuse a pooled fish and emit the arrival events.
#[allow(clippy::too_many_arguments)]
pub fn spawn_fish(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &SpawnCatalog,
    proto_id: crate::catalog::PrototypeId,
    position: Vec2,
    heading: Vec2,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    events: &mut Vec<SimEvent>,
) -> Option<Entity> {
    let mut fish = catalog.get(proto_id).instantiate();
    if fish.golden {
        // Bonus fish are always edible, whatever the prototype says
        fish.force_level(catalog.min_level());
        fish.speed *= cfg.spawn.golden_speed_mult;
    }
    let level = fish.level();
    let golden = fish.golden;

    let steering = Steering::new(heading, cfg.steering.wander_radius, cfg.sensor_throttle, rng);
    let facing = if heading.x < 0.0 { Facing::Left } else { Facing::Right };
    let bundle = (Position(position), fish, steering, facing);

    let entity = match pool.acquire(world, PoolKey::Fish(proto_id)) {
        Some(entity) => {
            // Recycled entity: scrub stale membership, then overwrite
            let _ = world.remove_one::<SchoolMember>(entity);
            if world.insert(entity, bundle).is_err() {
                return None;
            }
            entity
        }
        None => {
            let entity = world.spawn(bundle);
            pool.track(entity, PoolKey::Fish(proto_id));
            entity
        }
    };

    events.push(SimEvent::FishSpawned { entity, level, golden, position });
    events.push(SimEvent::SpawnSplash { position });
    Some(entity)
}

/// Spawn a school of identical fish on staggered offsets around a shared
/// caravan destination.
#[allow(clippy::too_many_arguments)]
fn spawn_school(
    world: &mut World,
    pool: &mut EntityPool,
    catalog: &SpawnCatalog,
    schools: &mut SchoolRegistry,
    level: u8,
    viewport: Bounds,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    events: &mut Vec<SimEvent>,
) {
    let Some(proto_id) = catalog.pick(level, rng) else {
        warn!("no prototype at or below level {}; dropping school spawn", level);
        return;
    };
    let (mut base, heading) = entry_point(viewport, cfg, rng);
    let moving_right = heading.x > 0.0;
    // Push the anchor out by the worst-case formation offset so no member
    // starts on-screen
    let pad = cfg.school.offset_max * cfg.school.horizontal_stretch;
    base.x += if moving_right { -pad } else { pad };
    let destination = base + heading * cfg.school.advance_distance;
    let school = schools.create(destination, moving_right);

    let size = rng.gen_range(cfg.spawn.school_min_size..=cfg.spawn.school_max_size);
    let y_limit = cfg.world_half_height - 1.0;
    for _ in 0..size {
        let radius = rng.gen_range(cfg.school.offset_min..cfg.school.offset_max);
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let mut offset = Vec2::from_angle(angle) * radius;
        offset.x *= cfg.school.horizontal_stretch;

        let mut position = base + offset;
        position.y = position.y.clamp(-y_limit, y_limit);

        if let Some(entity) =
            spawn_fish(world, pool, catalog, proto_id, position, heading, cfg, rng, events)
        {
            let _ = world.insert_one(entity, SchoolMember { school, offset });
            schools.add_member(school, entity);
        }
    }
}

/// Drop a hook from above the water line. Target depths are banded toward
/// the deeper water, so the line usually cuts through the whole column.
pub fn spawn_hook(
    world: &mut World,
    pool: &mut EntityPool,
    viewport: Bounds,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    force_left: Option<bool>,
    events: &mut Vec<SimEvent>,
) {
    let on_left = force_left.unwrap_or_else(|| rng.gen_bool(0.5));
    let center = viewport.center.x;
    let x = if on_left {
        rng.gen_range(viewport.left() + 1.0..center)
    } else {
        rng.gen_range(center..viewport.right() - 1.0)
    };

    let floor = viewport.bottom() + 1.0;
    let top = viewport.top() - 1.0;
    let span = (top - floor).max(1.0);
    // 40% deep, 40% mid, 20% shallow
    let band = rng.gen::<f32>();
    let target_depth = if band < 0.4 {
        rng.gen_range(floor..floor + span / 3.0)
    } else if band < 0.8 {
        rng.gen_range(floor + span / 3.0..floor + 2.0 * span / 3.0)
    } else {
        rng.gen_range(floor + 2.0 * span / 3.0..top)
    }
    .max(floor);

    let hook = Hook {
        state: HookState::Dropping,
        target_depth,
        fall_speed: rng.gen_range(cfg.hazards.hook_fall_speed_min..cfg.hazards.hook_fall_speed_max),
        retract_speed: rng
            .gen_range(cfg.hazards.hook_retract_speed_min..cfg.hazards.hook_retract_speed_max),
        roam_speed: cfg.hazards.hook_roam_speed,
        roam_dir: 1.0,
        roam_duration: rng.gen_range(cfg.hazards.hook_roam_time_min..cfg.hazards.hook_roam_time_max),
        life_timer: 0.0,
        radius: cfg.hazards.hook_radius,
    };
    let position = Vec2::new(x, viewport.top() + 1.0);

    let entity = match pool.acquire(world, PoolKey::Hook) {
        Some(entity) => {
            if world.insert(entity, (Position(position), hook)).is_err() {
                return;
            }
            entity
        }
        None => {
            let entity = world.spawn((Position(position), hook));
            pool.track(entity, PoolKey::Hook);
            entity
        }
    };
    events.push(SimEvent::HookSpawned { entity });
}

/// Tick down delayed hook drops and release them when due.
#[allow(clippy::too_many_arguments)]
pub fn process_pending_hooks(
    world: &mut World,
    pool: &mut EntityPool,
    pending: &mut Vec<PendingHook>,
    viewport: Bounds,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    events: &mut Vec<SimEvent>,
    dt: f32,
) {
    let mut due = Vec::new();
    pending.retain_mut(|p| {
        p.delay -= dt;
        if p.delay <= 0.0 {
            due.push(p.force_left);
            false
        } else {
            true
        }
    });
    for force_left in due {
        spawn_hook(world, pool, viewport, cfg, rng, force_left, events);
    }
}

/// Queue a shark: warning phase first, charging once the warn timer expires.
pub fn spawn_shark(
    world: &mut World,
    pool: &mut EntityPool,
    cfg: &SimConfig,
    rng: &mut SmallRng,
    events: &mut Vec<SimEvent>,
) {
    let from_left = rng.gen_bool(0.5);
    let y_limit = cfg.world_half_height - 2.0;
    let row = rng.gen_range(-y_limit..y_limit);
    let x = if from_left {
        -cfg.hazards.shark_spawn_x
    } else {
        cfg.hazards.shark_spawn_x
    };

    let shark = Shark {
        state: SharkState::Warning,
        dir: if from_left { 1.0 } else { -1.0 },
        charge_row: row,
        speed: cfg.hazards.shark_speed,
        warn_timer: cfg.hazards.shark_warn_time,
        grace_timer: 0.0,
        radius: cfg.hazards.shark_radius,
    };
    let position = Vec2::new(x, row);

    match pool.acquire(world, PoolKey::Shark) {
        Some(entity) => {
            if world.insert(entity, (Position(position), shark)).is_err() {
                return;
            }
        }
        None => {
            let entity = world.spawn((Position(position), shark));
            pool.track(entity, PoolKey::Shark);
        }
    }
    events.push(SimEvent::SharkWarning { row, from_left });
}

/// At the population cap: mark one off-screen, below-player-level fish for
/// release. Never touches anything visible or anything that could still eat
/// the player.
fn capacity_cull(world: &mut World, viewport: Bounds, player_level: u8, cfg: &SimConfig) -> usize {
    let safe = viewport.expanded(cfg.spawn.cull_margin);
    let victim = world
        .query::<(&Position, &Fish)>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .find(|(_, (pos, fish))| fish.level() < player_level && !safe.contains(pos.0))
        .map(|(entity, _)| entity);

    match victim {
        Some(entity) => {
            let _ = world.insert_one(entity, Dead);
            1
        }
        None => 0,
    }
}

/// Periodic sweep: mark every fish that drifted far beyond the arena for
/// release, regardless of level.
pub fn maintenance_cull(world: &mut World, viewport: Bounds, cfg: &SimConfig) -> usize {
    let keep = viewport.expanded(cfg.spawn.distant_margin);
    let victims: Vec<Entity> = world
        .query::<(&Position, &Fish)>()
        .without::<&Dormant>()
        .without::<&Dead>()
        .iter()
        .filter(|(_, (pos, _))| !keep.contains(pos.0))
        .map(|(entity, _)| entity)
        .collect();

    let count = victims.len();
    for entity in victims {
        let _ = world.insert_one(entity, Dead);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn setup() -> (World, EntityPool, SpawnCatalog, SchoolRegistry, SimConfig, SmallRng) {
        let catalog =
            SpawnCatalog::from_json(include_str!("../../../../data/spawn_catalog.json")).unwrap();
        (
            World::new(),
            EntityPool::new(),
            catalog,
            SchoolRegistry::new(),
            SimConfig::default(),
            SmallRng::seed_from_u64(99),
        )
    }

    fn viewport() -> Bounds {
        Bounds::from_size(Vec2::ZERO, 32.0, 18.0)
    }

    #[test]
    fn test_spawned_fish_start_off_screen() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let player = Player::new(2, Vec2::ZERO);
        let vp = viewport();

        for _ in 0..50 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), vp, &cfg, &mut rng, &mut events,
            );
        }

        assert!(active_fish_count(&world) > 0);
        for event in &events {
            if let SimEvent::FishSpawned { position, .. } = event {
                assert!(!vp.contains(*position), "spawned inside the viewport: {position:?}");
            }
        }
    }

    #[test]
    fn test_population_cap_holds_over_many_ticks() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let player = Player::new(3, Vec2::ZERO);

        for _ in 0..300 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
            // Schools can push one spawn call a few past the cap, never more
            assert!(active_fish_count(&world) <= cfg.spawn.max_population + cfg.spawn.school_max_size);
        }
    }

    #[test]
    fn test_predator_cap_bounds_bigger_fish() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let player = Player::new(2, Vec2::ZERO);

        for _ in 0..300 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
            assert!(predator_count(&world, player.level) <= cfg.spawn.predator_cap);
        }
    }

    #[test]
    fn test_spawn_levels_stay_within_one_above_player() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let player = Player::new(2, Vec2::ZERO);

        for _ in 0..200 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
        }

        for event in &events {
            if let SimEvent::FishSpawned { level, golden, .. } = event {
                if !golden {
                    assert!(*level <= player.level + 1);
                }
            }
        }
    }

    #[test]
    fn test_school_members_share_registry_entry() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        spawn_school(
            &mut world, &mut pool, &catalog, &mut schools, 1, viewport(), &cfg, &mut rng,
            &mut events,
        );

        assert_eq!(schools.len(), 1);
        let mut member_count = 0;
        for (_, member) in world.query::<&SchoolMember>().iter() {
            member_count += 1;
            assert!(schools.get(member.school).is_some());
        }
        assert!(member_count >= cfg.spawn.school_min_size);
        assert!(member_count <= cfg.spawn.school_max_size);
    }

    #[test]
    fn test_no_hooks_below_gate_level() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let player = Player::new(1, Vec2::ZERO);

        for _ in 0..300 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
        }

        assert_eq!(active_hook_count(&world), 0);
        assert!(!events.iter().any(|e| matches!(e, SimEvent::HookSpawned { .. })));
    }

    #[test]
    fn test_at_most_one_shark_at_a_time() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let player = Player::new(5, Vec2::ZERO);

        for _ in 0..500 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
            let sharks = world
                .query::<&Shark>()
                .without::<&Dormant>()
                .without::<&Dead>()
                .iter()
                .count();
            assert!(sharks <= 1);
        }
    }

    #[test]
    fn test_pending_hook_fires_after_delay() {
        let (mut world, mut pool, _catalog, _schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = vec![PendingHook { delay: 0.3, force_left: Some(true) }];

        process_pending_hooks(
            &mut world, &mut pool, &mut pending, viewport(), &cfg, &mut rng, &mut events, 0.1,
        );
        assert_eq!(active_hook_count(&world), 0);

        process_pending_hooks(
            &mut world, &mut pool, &mut pending, viewport(), &cfg, &mut rng, &mut events, 0.25,
        );
        assert_eq!(active_hook_count(&world), 1);
        assert!(pending.is_empty());
        // Forced drop lands on the left half
        let (_, pos) = world.query::<&Position>().with::<&Hook>().iter().next().map(|(e, p)| (e, p.0)).unwrap();
        assert!(pos.x < 0.0);
    }

    #[test]
    fn test_maintenance_cull_only_takes_distant_fish() {
        let (mut world, _pool, _catalog, _schools, cfg, _rng) = setup();
        let vp = viewport();
        let near = world.spawn((Position(Vec2::new(10.0, 0.0)), Fish::new(1, 4.0, 0.5)));
        let edge = world.spawn((
            Position(Vec2::new(vp.right() + cfg.spawn.distant_margin - 1.0, 0.0)),
            Fish::new(1, 4.0, 0.5),
        ));
        let far = world.spawn((
            Position(Vec2::new(vp.right() + cfg.spawn.distant_margin + 5.0, 0.0)),
            Fish::new(9, 4.0, 0.5),
        ));

        let culled = maintenance_cull(&mut world, vp, &cfg);

        assert_eq!(culled, 1);
        assert!(world.get::<&Dead>(near).is_err());
        assert!(world.get::<&Dead>(edge).is_err());
        assert!(world.get::<&Dead>(far).is_ok());
    }

    #[test]
    fn test_capacity_cull_spares_visible_and_bigger_fish() {
        let (mut world, mut pool, catalog, mut schools, cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let vp = viewport();
        let player = Player::new(3, Vec2::ZERO);

        // Fill to the cap with fish the cull must not take
        for i in 0..cfg.spawn.max_population {
            let visible = i % 2 == 0;
            let x = if visible { 5.0 } else { vp.right() + cfg.spawn.cull_margin + 2.0 };
            let level = if visible { 1 } else { 4 };
            world.spawn((Position(Vec2::new(x, 0.0)), Fish::new(level, 4.0, 0.5)));
        }

        let culled = spawn_tick(
            &mut world, &mut pool, &catalog, &mut schools, &mut pending,
            Some(&player), vp, &cfg, &mut rng, &mut events,
        );

        // Nothing eligible: no cull, no spawn
        assert!(!culled);
        for (_, fish) in world.query::<&Fish>().with::<&Dead>().iter() {
            let _ = fish;
            panic!("culled a protected fish");
        }
    }

    #[test]
    fn test_school_chance_follows_player_level() {
        let (mut world, mut pool, catalog, mut schools, mut cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        // Past the bottom tier the reduced chance applies, even to the
        // bottom-tier fish that still spawn as prey
        cfg.spawn.school_chance = 0.0;
        let player = Player::new(3, Vec2::ZERO);

        for _ in 0..300 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
        }

        let min_level_spawns = events
            .iter()
            .filter(|e| matches!(e, SimEvent::FishSpawned { level, .. } if *level == catalog.min_level()))
            .count();
        assert!(min_level_spawns > 0, "no bottom-tier prey spawned at all");
        assert!(schools.is_empty());
        assert_eq!(world.query::<&SchoolMember>().iter().count(), 0);
    }

    #[test]
    fn test_only_bottom_tier_fish_school() {
        let (mut world, mut pool, catalog, mut schools, mut cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        cfg.spawn.school_chance_level1 = 1.0;
        let player = Player::new(1, Vec2::ZERO);

        for _ in 0..300 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
        }

        assert!(!schools.is_empty());
        for (_, (fish, _)) in world.query::<(&Fish, &SchoolMember)>().iter() {
            assert_eq!(fish.level(), catalog.min_level());
        }
    }

    #[test]
    fn test_hook_takes_the_spawn_slot_and_pairs_at_gate_level() {
        let (mut world, mut pool, catalog, mut schools, mut cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        cfg.hazards.hook_chance = 1.0;
        cfg.hazards.hook_chance_early = 1.0;
        cfg.hazards.hook_pair_chance = 1.0;
        let player = Player::new(cfg.hazards.hook_min_player_level, Vec2::ZERO);

        spawn_tick(
            &mut world, &mut pool, &catalog, &mut schools, &mut pending,
            Some(&player), viewport(), &cfg, &mut rng, &mut events,
        );

        assert_eq!(active_hook_count(&world), 1);
        assert!(events.iter().any(|e| matches!(e, SimEvent::HookSpawned { .. })));
        // The hook displaced this tick's fish spawn
        assert!(!events.iter().any(|e| matches!(e, SimEvent::FishSpawned { .. })));
        // Pairing rolls at every hook-eligible level, the gate included
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_shark_takes_the_spawn_slot() {
        let (mut world, mut pool, catalog, mut schools, mut cfg, mut rng) = setup();
        let mut events = Vec::new();
        let mut pending = Vec::new();
        cfg.hazards.hook_chance = 0.0;
        cfg.hazards.hook_chance_early = 0.0;
        cfg.hazards.shark_chance = 1.0;
        cfg.hazards.shark_chance_late = 1.0;
        let player = Player::new(5, Vec2::ZERO);

        spawn_tick(
            &mut world, &mut pool, &catalog, &mut schools, &mut pending,
            Some(&player), viewport(), &cfg, &mut rng, &mut events,
        );

        assert!(shark_active(&world));
        assert!(!events.iter().any(|e| matches!(e, SimEvent::FishSpawned { .. })));
    }

    #[test]
    fn test_unfillable_level_draw_drops_the_spawn() {
        use crate::catalog::FishPrototype;

        // No prototypes at or below the player's level: eatable draws have
        // nothing to pick and must be dropped, not panic or misspawn
        let catalog = SpawnCatalog::new(vec![FishPrototype {
            name: "perch".into(),
            level: 2,
            speed: 3.5,
            radius: 0.5,
            xp: 0,
            golden: false,
        }])
        .unwrap();
        let mut world = World::new();
        let mut pool = EntityPool::new();
        let mut schools = SchoolRegistry::new();
        let cfg = SimConfig::default();
        let mut rng = SmallRng::seed_from_u64(99);
        let mut events = Vec::new();
        let mut pending = Vec::new();
        let player = Player::new(1, Vec2::ZERO);

        for _ in 0..200 {
            spawn_tick(
                &mut world, &mut pool, &catalog, &mut schools, &mut pending,
                Some(&player), viewport(), &cfg, &mut rng, &mut events,
            );
        }

        let mut spawned = 0;
        for event in &events {
            if let SimEvent::FishSpawned { level, .. } = event {
                spawned += 1;
                assert_eq!(*level, 2);
            }
        }
        // Only the occasional predator draw fills; eatable draws are dropped
        assert!(spawned > 0);
        assert!(spawned < 150);
    }
}
