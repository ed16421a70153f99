//! Simulation configuration.
//!
//! Every probability curve, radius, cap, and interval the systems use lives
//! here as a tunable field. The defaults are the shipped gameplay tuning; a
//! host can deserialize a partial JSON config over them.

use serde::{Deserialize, Serialize};

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed. Identical seed + identical host inputs = identical run.
    pub seed: u64,
    /// Vertical world extent: fish and hazards spawn within +/- this y.
    pub world_half_height: f32,
    /// Horizontal world extent, used by shark travel and school drift bounds.
    pub world_half_width: f32,
    /// Seconds between food-chain overlap polls.
    pub food_poll_interval: f32,
    /// Expensive sensor queries run once every this many ticks per agent.
    pub sensor_throttle: u64,
    pub steering: SteeringConfig,
    pub spawn: SpawnConfig,
    pub hazards: HazardConfig,
    pub school: SchoolConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            world_half_height: 14.0,
            world_half_width: 45.0,
            food_poll_interval: 0.2,
            sensor_throttle: 5,
            steering: SteeringConfig::default(),
            spawn: SpawnConfig::default(),
            hazards: HazardConfig::default(),
            school: SchoolConfig::default(),
        }
    }
}

/// Fish AI tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub chase_radius: f32,
    pub flee_radius: f32,
    pub separation_radius: f32,
    /// Give up a chase after this long.
    pub max_chase_time: f32,
    /// Refractory period after giving up, during which Chase is suppressed.
    pub chase_cooldown_time: f32,
    /// Per-tick chance for a wandering fish to start drifting away.
    pub leave_chance: f32,
    pub leave_min_time: f32,
    pub leave_max_time: f32,
    /// Over-leveled fish alive longer than this leave permanently.
    pub predator_overstay: f32,
    pub flee_speed_mult: f32,
    pub chase_speed_mult: f32,
    /// Heading interpolation factor, per second.
    pub turn_smoothing: f32,
    /// Horizontal heading deadzone for sprite flipping (hysteresis).
    pub flip_deadzone: f32,
    pub avoid_distance: f32,
    pub avoid_weight: f32,
    pub separation_weight: f32,
    pub wander_radius: f32,
    pub wander_distance: f32,
    pub wander_jitter: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            chase_radius: 6.0,
            flee_radius: 4.5,
            separation_radius: 2.0,
            max_chase_time: 5.0,
            chase_cooldown_time: 3.0,
            leave_chance: 0.005,
            leave_min_time: 3.0,
            leave_max_time: 8.0,
            predator_overstay: 15.0,
            flee_speed_mult: 1.5,
            chase_speed_mult: 1.2,
            turn_smoothing: 5.0,
            flip_deadzone: 0.3,
            avoid_distance: 3.0,
            avoid_weight: 3.0,
            separation_weight: 1.5,
            wander_radius: 2.0,
            wander_distance: 3.0,
            wander_jitter: 1.0,
        }
    }
}

/// Population controller tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Seconds between spawn decisions.
    pub interval: f32,
    /// Hard cap on concurrently active fish.
    pub max_population: usize,
    /// Hard cap on concurrent fish with level above the player's.
    pub predator_cap: usize,
    /// Share of regular spawns drawn from the eatable pool (the rest are
    /// next-level predators). Forced to 1.0 while the predator cap is met.
    pub eatable_chance: f32,
    /// Lower-level spawn chance within the eatable pool:
    /// `clamp(base - slope * player_level, min, max)`.
    pub lower_level_base: f32,
    pub lower_level_slope: f32,
    pub lower_level_min: f32,
    pub lower_level_max: f32,
    /// Golden bonus fish chance by player-level band.
    pub golden_chance_base: f32,
    pub golden_chance_mid: f32,
    pub golden_chance_late: f32,
    pub golden_chance_end: f32,
    pub golden_speed_mult: f32,
    /// Schooling chance for lowest-level spawns while the player is still at
    /// the lowest level; `school_chance` applies once the player outgrows it.
    pub school_chance_level1: f32,
    pub school_chance: f32,
    pub school_min_size: usize,
    pub school_max_size: usize,
    /// Spawn just outside the viewport edge by this much.
    pub spawn_buffer: f32,
    /// Capacity cull: off-screen means outside viewport + this margin.
    pub cull_margin: f32,
    /// Maintenance cull: distant means outside viewport + this margin.
    pub distant_margin: f32,
    /// Seconds between maintenance cull sweeps.
    pub cull_interval: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            interval: 1.0,
            max_population: 30,
            predator_cap: 3,
            eatable_chance: 0.8,
            lower_level_base: 0.55,
            lower_level_slope: 0.05,
            lower_level_min: 0.30,
            lower_level_max: 0.50,
            golden_chance_base: 0.05,
            golden_chance_mid: 0.08,
            golden_chance_late: 0.15,
            golden_chance_end: 0.20,
            golden_speed_mult: 1.2,
            school_chance_level1: 0.6,
            school_chance: 0.1,
            school_min_size: 3,
            school_max_size: 5,
            spawn_buffer: 2.0,
            cull_margin: 5.0,
            distant_margin: 30.0,
            cull_interval: 1.0,
        }
    }
}

/// Hazard orchestration tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Hooks only spawn once the player reaches this level.
    pub hook_min_player_level: u8,
    pub hook_chance: f32,
    /// Boosted chance while the player is at or below `hook_min_player_level`
    /// (low levels have no sharks to worry about).
    pub hook_chance_early: f32,
    pub hook_fall_speed_min: f32,
    pub hook_fall_speed_max: f32,
    pub hook_retract_speed_min: f32,
    pub hook_retract_speed_max: f32,
    pub hook_roam_speed: f32,
    pub hook_roam_time_min: f32,
    pub hook_roam_time_max: f32,
    pub hook_radius: f32,
    /// Chance a hook event drops a second, delayed hook on the other half.
    pub hook_pair_chance: f32,
    /// Delay range for the second hook of a pair.
    pub hook_pair_delay_min: f32,
    pub hook_pair_delay_max: f32,
    /// Sharks only spawn once the player reaches this level.
    pub shark_min_player_level: u8,
    pub shark_chance: f32,
    pub shark_chance_late: f32,
    pub shark_late_level: u8,
    pub shark_speed: f32,
    pub shark_warn_time: f32,
    /// Despawn grace once fully past the far edge.
    pub shark_grace: f32,
    /// Absolute x where sharks start their run.
    pub shark_spawn_x: f32,
    pub shark_radius: f32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            hook_min_player_level: 2,
            hook_chance: 0.35,
            hook_chance_early: 0.5,
            hook_fall_speed_min: 2.5,
            hook_fall_speed_max: 4.0,
            hook_retract_speed_min: 7.0,
            hook_retract_speed_max: 10.0,
            hook_roam_speed: 1.5,
            hook_roam_time_min: 6.0,
            hook_roam_time_max: 10.0,
            hook_radius: 0.4,
            hook_pair_chance: 0.5,
            hook_pair_delay_min: 0.5,
            hook_pair_delay_max: 2.5,
            shark_min_player_level: 3,
            shark_chance: 0.10,
            shark_chance_late: 0.30,
            shark_late_level: 4,
            shark_speed: 12.0,
            shark_warn_time: 1.5,
            shark_grace: 5.0,
            shark_spawn_x: 45.5,
            shark_radius: 1.2,
        }
    }
}

/// School formation tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolConfig {
    /// Destination is re-picked once members are within this radius of it.
    pub arrive_radius: f32,
    /// How far ahead the next destination is placed.
    pub advance_distance: f32,
    pub vertical_jitter: f32,
    /// Formation offsets are drawn from an annulus with these radii...
    pub offset_min: f32,
    pub offset_max: f32,
    /// ...then stretched horizontally so the group reads as a swimming line.
    pub horizontal_stretch: f32,
    /// Organic drift applied to the formation target while wandering.
    pub drift_speed: f32,
    pub drift_amount: f32,
}

impl Default for SchoolConfig {
    fn default() -> Self {
        Self {
            arrive_radius: 1.5,
            advance_distance: 8.0,
            vertical_jitter: 2.0,
            offset_min: 0.5,
            offset_max: 2.0,
            horizontal_stretch: 1.5,
            drift_speed: 2.0,
            drift_amount: 0.5,
        }
    }
}

impl SimConfig {
    /// Golden bonus fish chance for the given player level.
    pub fn golden_chance(&self, player_level: u8) -> f32 {
        if player_level >= 5 {
            self.spawn.golden_chance_end
        } else if player_level >= 4 {
            self.spawn.golden_chance_late
        } else if player_level >= 3 {
            self.spawn.golden_chance_mid
        } else {
            self.spawn.golden_chance_base
        }
    }

    /// Lower-level spawn chance within the eatable pool. Shrinks as the
    /// player levels but never reaches zero, so popcorn fish keep appearing.
    pub fn lower_level_chance(&self, player_level: u8) -> f32 {
        let s = &self.spawn;
        (s.lower_level_base - s.lower_level_slope * player_level as f32)
            .clamp(s.lower_level_min, s.lower_level_max)
    }

    /// Hook spawn chance for the given player level (0 below the gate).
    pub fn hook_chance(&self, player_level: u8) -> f32 {
        let h = &self.hazards;
        if player_level < h.hook_min_player_level {
            0.0
        } else if player_level == h.hook_min_player_level {
            h.hook_chance_early.max(h.hook_chance)
        } else {
            h.hook_chance
        }
    }

    /// Shark spawn chance for the given player level (0 below the gate).
    pub fn shark_chance(&self, player_level: u8) -> f32 {
        let h = &self.hazards;
        if player_level < h.shark_min_player_level {
            0.0
        } else if player_level >= h.shark_late_level {
            h.shark_chance_late
        } else {
            h.shark_chance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = SimConfig::default();
        assert!(cfg.spawn.max_population > 0);
        assert!(cfg.spawn.predator_cap < cfg.spawn.max_population);
        assert!(cfg.steering.flee_radius < cfg.steering.chase_radius);
        assert!(cfg.spawn.school_min_size <= cfg.spawn.school_max_size);
    }

    #[test]
    fn test_golden_chance_rises_with_level() {
        let cfg = SimConfig::default();
        assert!(cfg.golden_chance(1) < cfg.golden_chance(3));
        assert!(cfg.golden_chance(3) < cfg.golden_chance(4));
        assert!(cfg.golden_chance(4) < cfg.golden_chance(5));
        assert_eq!(cfg.golden_chance(5), cfg.golden_chance(9));
    }

    #[test]
    fn test_lower_level_chance_clamped() {
        let cfg = SimConfig::default();
        for level in 1..=10u8 {
            let c = cfg.lower_level_chance(level);
            assert!(c >= cfg.spawn.lower_level_min);
            assert!(c <= cfg.spawn.lower_level_max);
        }
        // Shrinks with level until the floor
        assert!(cfg.lower_level_chance(2) > cfg.lower_level_chance(4));
    }

    #[test]
    fn test_hazard_gates() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.hook_chance(1), 0.0);
        assert!(cfg.hook_chance(2) >= cfg.hook_chance(3));
        assert_eq!(cfg.shark_chance(2), 0.0);
        assert!(cfg.shark_chance(4) > cfg.shark_chance(3));
    }

    #[test]
    fn test_partial_config_deserializes_over_defaults() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{ "seed": 7, "spawn": { "max_population": 12 } }"#)
                .expect("partial config parses");
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.spawn.max_population, 12);
        // Untouched fields keep their defaults
        assert_eq!(cfg.spawn.predator_cap, 3);
        assert_eq!(cfg.steering.chase_radius, 6.0);
    }
}
