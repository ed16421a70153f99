//! Fish components: identity, steering state, school membership.

use rand::Rng;

use super::common::Vec2;

/// Core identity of a fish-like entity. `level` strictly determines predation
/// direction: bigger level eats smaller level on contact.
#[derive(Debug, Clone, PartialEq)]
pub struct Fish {
    level: u8,
    pub speed: f32,
    /// Collision circle used by the food-chain overlap poll.
    pub radius: f32,
    /// Score reward granted to whoever eats this fish. 0 = derive from level.
    xp: u32,
    pub golden: bool,
}

impl Fish {
    pub fn new(level: u8, speed: f32, radius: f32) -> Self {
        Self {
            level,
            speed,
            radius,
            xp: 0,
            golden: false,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// One fish, one fixed level: assignment is a no-op once a level is set.
    pub fn assign_level(&mut self, level: u8) {
        if self.level > 0 {
            return;
        }
        self.level = level;
    }

    /// Unconditional override. Only the golden-fish spawn path uses this,
    /// to force bonus fish down to an edible level.
    pub fn force_level(&mut self, level: u8) {
        self.level = level;
    }

    pub fn xp(&self) -> u32 {
        if self.xp == 0 {
            (self.level as u32 * 15).max(10)
        } else {
            self.xp
        }
    }

    pub fn set_xp(&mut self, xp: u32) {
        self.xp = xp;
    }

    pub fn can_eat(&self, other_level: u8) -> bool {
        self.level > other_level
    }
}

/// Steering state machine states. Leaving and Cooldown are orthogonal
/// sub-flags layered on Wander, tracked on [`Steering`] directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SteerState {
    #[default]
    Wander,
    Chase,
    Flee,
}

/// Per-entity steering controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct Steering {
    pub state: SteerState,
    /// Current travel direction (unit). Velocity is `heading * speed`.
    pub heading: Vec2,
    /// Reynolds wander: jittered point on a circle ahead of the agent.
    pub wander_target: Vec2,
    pub chase_timer: f32,
    pub cooldown_timer: f32,
    pub leaving: bool,
    pub leave_timer: f32,
    pub leave_dir: Vec2,
    /// Seconds alive since spawn. Drives forced leaving for stale predators.
    pub lifetime: f32,
    /// Sensor results cached between throttled evaluations.
    pub cached_avoidance: Vec2,
    pub cached_separation: Vec2,
    /// Offset distributing throttled sensor queries across ticks.
    pub sensor_offset: u64,
}

impl Steering {
    pub fn new(heading: Vec2, wander_radius: f32, sensor_throttle: u64, rng: &mut impl Rng) -> Self {
        let theta = rng.gen_range(0.0..std::f32::consts::TAU);
        Self {
            state: SteerState::Wander,
            heading: heading.normalized_or(Vec2::new(1.0, 0.0)),
            wander_target: Vec2::from_angle(theta) * wander_radius,
            chase_timer: 0.0,
            cooldown_timer: 0.0,
            leaving: false,
            leave_timer: 0.0,
            leave_dir: Vec2::ZERO,
            lifetime: 0.0,
            cached_avoidance: Vec2::ZERO,
            cached_separation: Vec2::ZERO,
            sensor_offset: rng.gen_range(0..sensor_throttle.max(1)),
        }
    }
}

/// Handle to a school in the engine's [`crate::schools::SchoolRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchoolId(pub u32);

/// Membership in a school. The school owns the shared destination; the member
/// owns only its formation offset and this weak reference back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchoolMember {
    pub school: SchoolId,
    pub offset: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_immutable_once_assigned() {
        let mut fish = Fish::new(0, 3.0, 0.35);
        fish.assign_level(3);
        assert_eq!(fish.level(), 3);

        // Later assignment attempts are no-ops
        fish.assign_level(1);
        assert_eq!(fish.level(), 3);
        fish.assign_level(6);
        assert_eq!(fish.level(), 3);
    }

    #[test]
    fn test_force_level_overrides() {
        let mut fish = Fish::new(4, 4.0, 0.8);
        fish.force_level(1);
        assert_eq!(fish.level(), 1);
    }

    #[test]
    fn test_xp_defaults_from_level() {
        let fish = Fish::new(1, 3.0, 0.35);
        assert_eq!(fish.xp(), 15);

        let big = Fish::new(5, 4.5, 0.95);
        assert_eq!(big.xp(), 75);

        let mut custom = Fish::new(2, 3.5, 0.5);
        custom.set_xp(99);
        assert_eq!(custom.xp(), 99);
    }

    #[test]
    fn test_predation_is_strict() {
        let fish = Fish::new(3, 4.0, 0.65);
        assert!(fish.can_eat(2));
        assert!(!fish.can_eat(3));
        assert!(!fish.can_eat(4));
    }

    #[test]
    fn test_sensor_offset_spans_throttle_window() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let mut rng = SmallRng::seed_from_u64(7);
        let throttle = 12;
        let mut seen_above_default = false;
        for _ in 0..200 {
            let steer = Steering::new(Vec2::new(1.0, 0.0), 3.0, throttle, &mut rng);
            assert!(steer.sensor_offset < throttle);
            if steer.sensor_offset >= 5 {
                seen_above_default = true;
            }
        }
        assert!(seen_above_default);

        // A degenerate throttle of zero still yields a valid offset
        let steer = Steering::new(Vec2::new(1.0, 0.0), 3.0, 0, &mut rng);
        assert_eq!(steer.sensor_offset, 0);
    }
}
