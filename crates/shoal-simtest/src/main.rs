//! Shoal Headless Simulation Harness
//!
//! Validates simulation behavior and data without a game host.
//! Runs entirely in-process — no rendering, no physics engine, no input.
//!
//! Usage:
//!   cargo run -p shoal-simtest
//!   cargo run -p shoal-simtest -- --verbose

use shoal_core::catalog::SpawnCatalog;
use shoal_core::components::{Player, SchoolMember, SteerState, Steering, Vec2};
use shoal_core::config::SimConfig;
use shoal_core::engine::Simulation;
use shoal_core::events::SimEvent;

// ── Spawn catalog (same JSON the engine ships with) ─────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/spawn_catalog.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Shoal Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Spawn catalog validation
    results.extend(validate_catalog(verbose));

    // 2. Probability curve sweep
    results.extend(validate_curves(verbose));

    // 3. Population control scenarios
    results.extend(validate_population(verbose));

    // 4. Food-chain event audit
    results.extend(validate_food_chain(verbose));

    // 5. Steering state scenarios
    results.extend(validate_steering(verbose));

    // 6. Hazard lifecycle scenarios
    results.extend(validate_hazards(verbose));

    // 7. Pooling and determinism
    results.extend(validate_pooling_and_determinism(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn quiet_config(seed: u64) -> SimConfig {
    // An empty tank: no spawner churn, no food polling, so scenarios can
    // place their own actors and watch them undisturbed
    let mut config = SimConfig::default();
    config.seed = seed;
    config.spawn.interval = f32::MAX;
    config.food_poll_interval = f32::MAX;
    config
}

// ── 1. Spawn Catalog ────────────────────────────────────────────────────

fn validate_catalog(_verbose: bool) -> Vec<TestResult> {
    println!("--- Spawn Catalog ---");
    let mut results = Vec::new();

    let raw: Vec<serde_json::Value> = match serde_json::from_str(CATALOG_JSON) {
        Ok(v) => v,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "catalog_not_empty".into(),
        passed: !raw.is_empty(),
        detail: format!("{} prototypes loaded", raw.len()),
    });

    let bad_speed: Vec<_> = raw
        .iter()
        .filter(|p| p["speed"].as_f64().unwrap_or(0.0) <= 0.0)
        .collect();
    results.push(TestResult {
        name: "catalog_positive_speeds".into(),
        passed: bad_speed.is_empty(),
        detail: if bad_speed.is_empty() {
            "all prototypes have positive speed".into()
        } else {
            format!("{} prototypes with non-positive speed", bad_speed.len())
        },
    });

    let bad_radius: Vec<_> = raw
        .iter()
        .filter(|p| p["radius"].as_f64().unwrap_or(0.0) <= 0.0)
        .collect();
    results.push(TestResult {
        name: "catalog_positive_radii".into(),
        passed: bad_radius.is_empty(),
        detail: if bad_radius.is_empty() {
            "all prototypes have positive radius".into()
        } else {
            format!("{} prototypes with non-positive radius", bad_radius.len())
        },
    });

    match SpawnCatalog::from_json(CATALOG_JSON) {
        Ok(catalog) => {
            // Every level in the span must resolve to some pool, exact or
            // nearest-below, or the spawner can stall at that player level
            let mut rng = seeded_rng(1);
            let unresolvable: Vec<u8> = (catalog.min_level()..=catalog.max_level())
                .filter(|&level| catalog.pick(level, &mut rng).is_none())
                .collect();
            results.push(TestResult {
                name: "catalog_levels_resolvable".into(),
                passed: unresolvable.is_empty(),
                detail: format!(
                    "levels {}..={}, unresolvable: {:?}",
                    catalog.min_level(),
                    catalog.max_level(),
                    unresolvable
                ),
            });

            results.push(TestResult {
                name: "catalog_has_golden".into(),
                passed: catalog.golden().is_some(),
                detail: "golden prototype present".into(),
            });
        }
        Err(e) => {
            results.push(TestResult {
                name: "catalog_typed_load".into(),
                passed: false,
                detail: format!("catalog rejected: {}", e),
            });
        }
    }

    results
}

// ── 2. Probability Curves ───────────────────────────────────────────────

fn validate_curves(_verbose: bool) -> Vec<TestResult> {
    println!("--- Probability Curves ---");
    let mut results = Vec::new();
    let config = SimConfig::default();

    let lower_ok = (1u8..=20).all(|level| {
        let c = config.lower_level_chance(level);
        (config.spawn.lower_level_min..=config.spawn.lower_level_max).contains(&c)
    });
    results.push(TestResult {
        name: "lower_level_chance_clamped".into(),
        passed: lower_ok,
        detail: format!(
            "clamped to [{:.2}, {:.2}] across levels 1..=20",
            config.spawn.lower_level_min, config.spawn.lower_level_max
        ),
    });

    let golden_monotone = (1u8..20).all(|level| {
        config.golden_chance(level) <= config.golden_chance(level + 1)
    });
    results.push(TestResult {
        name: "golden_chance_monotone".into(),
        passed: golden_monotone,
        detail: "golden chance never decreases with player level".into(),
    });

    let gate = config.hazards.hook_min_player_level;
    let hook_gated = (1..gate).all(|level| config.hook_chance(level) == 0.0)
        && config.hook_chance(gate) > 0.0;
    results.push(TestResult {
        name: "hook_chance_gated".into(),
        passed: hook_gated,
        detail: format!("zero below level {}, positive at it", gate),
    });

    let shark_gate = config.hazards.shark_min_player_level;
    let shark_gated = (1..shark_gate).all(|level| config.shark_chance(level) == 0.0)
        && config.shark_chance(shark_gate) > 0.0
        && config.shark_chance(config.hazards.shark_late_level)
            >= config.shark_chance(shark_gate);
    results.push(TestResult {
        name: "shark_chance_gated".into(),
        passed: shark_gated,
        detail: format!("zero below level {}, ramps up after", shark_gate),
    });

    results
}

// ── 3. Population Control ───────────────────────────────────────────────

fn validate_population(verbose: bool) -> Vec<TestResult> {
    println!("--- Population Control ---");
    let mut results = Vec::new();

    for &(seed, player_level) in &[(11u64, 1u8), (22, 2), (33, 3), (44, 5)] {
        let mut config = SimConfig::default();
        config.seed = seed;
        let cap = config.spawn.max_population + config.spawn.school_max_size;
        let predator_cap = config.spawn.predator_cap;

        let catalog = load_catalog();
        let mut sim = Simulation::new(config, catalog);
        sim.set_player(Player::new(player_level, Vec2::ZERO));

        let mut max_fish = 0;
        let mut max_predators = 0;
        let mut level_breach = None;
        for _ in 0..1500 {
            sim.tick(0.05);
            max_fish = max_fish.max(sim.fish_count());
            max_predators = max_predators.max(sim.predator_count());
            for event in sim.drain_events() {
                if let SimEvent::FishSpawned { level, golden, .. } = event {
                    if !golden && level > player_level + 1 {
                        level_breach = Some(level);
                    }
                }
            }
        }

        if verbose {
            println!(
                "  seed {} level {}: peak fish {}, peak predators {}",
                seed, player_level, max_fish, max_predators
            );
        }

        results.push(TestResult {
            name: format!("population_cap_seed{}_lvl{}", seed, player_level),
            passed: max_fish <= cap && max_fish > 0,
            detail: format!("peak {} of cap {}", max_fish, cap),
        });
        results.push(TestResult {
            name: format!("predator_cap_seed{}_lvl{}", seed, player_level),
            passed: max_predators <= predator_cap,
            detail: format!("peak {} of cap {}", max_predators, predator_cap),
        });
        results.push(TestResult {
            name: format!("spawn_levels_seed{}_lvl{}", seed, player_level),
            passed: level_breach.is_none(),
            detail: match level_breach {
                Some(level) => format!("level {} spawned vs player {}", level, player_level),
                None => format!("all spawns within level {}", player_level + 1),
            },
        });
    }

    // Schools must actually appear for a level-1 player
    let mut config = SimConfig::default();
    config.seed = 77;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(1, Vec2::ZERO));
    let mut saw_school = false;
    for _ in 0..1500 {
        sim.tick(0.05);
        if sim.world().query::<&SchoolMember>().iter().next().is_some() {
            saw_school = true;
            break;
        }
    }
    results.push(TestResult {
        name: "schools_form_at_level_one".into(),
        passed: saw_school,
        detail: "school membership observed within 75s".into(),
    });

    results
}

// ── 4. Food Chain ───────────────────────────────────────────────────────

fn validate_food_chain(_verbose: bool) -> Vec<TestResult> {
    println!("--- Food Chain ---");
    let mut results = Vec::new();

    // Long mixed run: everything the player eats must be strictly smaller
    let mut config = SimConfig::default();
    config.seed = 5;
    let player_level = 3u8;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(player_level, Vec2::ZERO));

    let mut ate = 0usize;
    let mut bad_meal = None;
    let mut died = false;
    for _ in 0..3000 {
        sim.tick(0.05);
        for event in sim.drain_events() {
            match event {
                SimEvent::PlayerAte { level, xp, .. } => {
                    ate += 1;
                    if level >= player_level || xp == 0 {
                        bad_meal = Some((level, xp));
                    }
                }
                SimEvent::PlayerDied { .. } => died = true,
                _ => {}
            }
        }
        if died {
            break;
        }
    }
    results.push(TestResult {
        name: "player_meals_strictly_smaller".into(),
        passed: bad_meal.is_none(),
        detail: match bad_meal {
            Some((level, xp)) => format!("ate level {} for {} xp", level, xp),
            None => format!("{} meals, all below level {}", ate, player_level),
        },
    });

    // Direct placements: smaller is eaten, equal passes through, bigger kills
    let mut config = quiet_config(6);
    config.food_poll_interval = 0.0;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(2, Vec2::ZERO));
    sim.spawn_fish_at(1, Vec2::new(0.1, 0.0));
    sim.drain_events();
    sim.tick(0.01);
    let events = sim.drain_events();
    let ate_small = events
        .iter()
        .any(|e| matches!(e, SimEvent::PlayerAte { level: 1, .. }));
    results.push(TestResult {
        name: "overlap_eats_smaller".into(),
        passed: ate_small && sim.player().map(|p| p.alive).unwrap_or(false),
        detail: "level 2 player ate overlapping level 1".into(),
    });

    let mut config = quiet_config(7);
    config.food_poll_interval = 0.0;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(2, Vec2::ZERO));
    sim.spawn_fish_at(2, Vec2::new(0.1, 0.0));
    sim.tick(0.01);
    let alive = sim.player().map(|p| p.alive).unwrap_or(false);
    let peer_alive = sim.fish_count() == 1;
    results.push(TestResult {
        name: "overlap_equal_passes_through".into(),
        passed: alive && peer_alive,
        detail: "equal levels coexist on contact".into(),
    });

    let mut config = quiet_config(8);
    config.food_poll_interval = 0.0;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(1, Vec2::ZERO));
    sim.spawn_fish_at(4, Vec2::new(0.1, 0.0));
    sim.tick(0.01);
    results.push(TestResult {
        name: "overlap_bigger_kills_player".into(),
        passed: !sim.player().map(|p| p.alive).unwrap_or(true),
        detail: "level 4 fish killed level 1 player".into(),
    });

    results
}

// ── 5. Steering States ──────────────────────────────────────────────────

fn steer_state(sim: &Simulation) -> Option<SteerState> {
    sim.world()
        .query::<&Steering>()
        .iter()
        .next()
        .map(|(_, s)| s.state)
}

fn validate_steering(_verbose: bool) -> Vec<TestResult> {
    println!("--- Steering States ---");
    let mut results = Vec::new();

    // Small fish flees a bigger player
    let mut sim = Simulation::new(quiet_config(10), load_catalog());
    sim.set_player(Player::new(5, Vec2::ZERO));
    sim.spawn_fish_at(1, Vec2::new(2.0, 0.0));
    sim.tick(0.02);
    results.push(TestResult {
        name: "smaller_flees_bigger".into(),
        passed: steer_state(&sim) == Some(SteerState::Flee),
        detail: format!("state {:?}", steer_state(&sim)),
    });

    // Bigger fish chases a smaller player
    let mut sim = Simulation::new(quiet_config(11), load_catalog());
    sim.set_player(Player::new(1, Vec2::ZERO));
    sim.spawn_fish_at(3, Vec2::new(3.0, 0.0));
    sim.tick(0.02);
    results.push(TestResult {
        name: "bigger_chases_smaller".into(),
        passed: steer_state(&sim) == Some(SteerState::Chase),
        detail: format!("state {:?}", steer_state(&sim)),
    });

    // A failed chase enters a cooldown refractory: the food chain is off,
    // so the predator orbits its uncatchable prey until the give-up timer
    let config = quiet_config(12);
    let max_chase = config.steering.max_chase_time;
    let cooldown = config.steering.chase_cooldown_time;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(1, Vec2::ZERO));
    sim.spawn_fish_at(3, Vec2::new(3.0, 0.0));

    let dt = 0.05;
    let chase_ticks = (max_chase / dt) as usize + 2;
    let mut chased = false;
    for _ in 0..chase_ticks {
        sim.tick(dt);
        if steer_state(&sim) == Some(SteerState::Chase) {
            chased = true;
        }
    }
    let gave_up = steer_state(&sim) == Some(SteerState::Wander);

    let cooldown_ticks = (cooldown / dt) as usize - 2;
    let mut relapsed = false;
    for _ in 0..cooldown_ticks {
        sim.tick(dt);
        if steer_state(&sim) == Some(SteerState::Chase) {
            relapsed = true;
        }
    }
    results.push(TestResult {
        name: "chase_gives_up_and_cools_down".into(),
        passed: chased && gave_up && !relapsed,
        detail: format!(
            "chased={} gave_up={} relapsed={}",
            chased, gave_up, relapsed
        ),
    });

    results
}

// ── 6. Hazard Lifecycles ────────────────────────────────────────────────

fn validate_hazards(_verbose: bool) -> Vec<TestResult> {
    println!("--- Hazard Lifecycles ---");
    let mut results = Vec::new();

    // Force hooks on every spawn roll and watch one full lifecycle
    let mut config = SimConfig::default();
    config.seed = 20;
    config.hazards.hook_chance = 1.0;
    config.hazards.hook_chance_early = 1.0;
    config.hazards.shark_chance = 0.0;
    config.hazards.shark_chance_late = 0.0;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(2, Vec2::new(100.0, 100.0)));

    let mut hook_spawned = false;
    let mut hook_despawned = false;
    for _ in 0..3000 {
        sim.tick(0.05);
        for event in sim.drain_events() {
            match event {
                SimEvent::HookSpawned { .. } => hook_spawned = true,
                SimEvent::HazardDespawned { .. } => hook_despawned = true,
                _ => {}
            }
        }
        if hook_despawned {
            break;
        }
    }
    results.push(TestResult {
        name: "hook_full_lifecycle".into(),
        passed: hook_spawned && hook_despawned,
        detail: format!("spawned={} despawned={}", hook_spawned, hook_despawned),
    });

    // Force sharks and check warning always precedes the charge
    let mut config = SimConfig::default();
    config.seed = 21;
    config.hazards.shark_chance = 1.0;
    config.hazards.shark_chance_late = 1.0;
    config.hazards.hook_chance = 0.0;
    config.hazards.hook_chance_early = 0.0;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(4, Vec2::new(100.0, 100.0)));

    let mut warned = false;
    let mut charged_without_warning = false;
    let mut shark_done = false;
    for _ in 0..3000 {
        sim.tick(0.05);
        for event in sim.drain_events() {
            match event {
                SimEvent::SharkWarning { .. } => warned = true,
                SimEvent::SharkSpawned { .. } => {
                    if !warned {
                        charged_without_warning = true;
                    }
                }
                SimEvent::HazardDespawned { .. } => shark_done = true,
                _ => {}
            }
        }
        if shark_done {
            break;
        }
    }
    results.push(TestResult {
        name: "shark_warns_then_charges".into(),
        passed: warned && !charged_without_warning && shark_done,
        detail: format!(
            "warned={} premature_charge={} completed={}",
            warned, charged_without_warning, shark_done
        ),
    });

    results
}

// ── 7. Pooling and Determinism ──────────────────────────────────────────

fn validate_pooling_and_determinism(verbose: bool) -> Vec<TestResult> {
    println!("--- Pooling and Determinism ---");
    let mut results = Vec::new();

    // Heavy churn must reuse released entities instead of allocating fresh
    // ones: far more spawns happen than the world ever holds
    let mut config = SimConfig::default();
    config.seed = 30;
    // Pools are keyed per prototype, so the world can hold a few idle
    // entities per species beyond the live cap
    let bound = 4 * config.spawn.max_population;
    let mut sim = Simulation::new(config, load_catalog());
    sim.set_player(Player::new(3, Vec2::ZERO));
    let mut total_spawned = 0usize;
    for _ in 0..4000 {
        sim.tick(0.05);
        for event in sim.drain_events() {
            if matches!(event, SimEvent::FishSpawned { .. }) {
                total_spawned += 1;
            }
        }
    }
    let world_len = sim.world().len() as usize;
    results.push(TestResult {
        name: "pool_reuses_released_entities".into(),
        passed: world_len <= bound && total_spawned > world_len,
        detail: format!(
            "{} spawns across {} world entities, bound {}",
            total_spawned, world_len, bound
        ),
    });

    // Same seed, same tick sequence, same event stream
    let run = |seed: u64| {
        let mut config = SimConfig::default();
        config.seed = seed;
        let mut sim = Simulation::new(config, load_catalog());
        sim.set_player(Player::new(2, Vec2::ZERO));
        let mut log = Vec::new();
        for _ in 0..800 {
            sim.tick(0.05);
            log.extend(sim.drain_events());
        }
        log
    };
    let a = run(40);
    let b = run(40);
    let c = run(41);
    if verbose {
        println!("  seed 40 produced {} events", a.len());
    }
    results.push(TestResult {
        name: "same_seed_reproduces".into(),
        passed: a == b,
        detail: format!("{} events matched", a.len()),
    });
    results.push(TestResult {
        name: "different_seed_diverges".into(),
        passed: a != c,
        detail: "seed 41 produced a different stream".into(),
    });

    results
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn load_catalog() -> SpawnCatalog {
    match SpawnCatalog::from_json(CATALOG_JSON) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("fatal: spawn catalog failed to load: {}", e);
            std::process::exit(1);
        }
    }
}

fn seeded_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}
