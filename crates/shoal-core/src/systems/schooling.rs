//! School caravan control: advance the shared destination when the members
//! have caught up, and prune members the world no longer tracks.

use hecs::World;
use rand::rngs::SmallRng;
use rand::Rng;

use crate::components::{Dead, Dormant, Position, Vec2};
use crate::config::SimConfig;
use crate::schools::SchoolRegistry;

/// Advance each school's destination once all surviving members are within
/// the arrive radius. Destinations drift horizontally in the school's travel
/// direction with a little vertical jitter, clamped to the water column.
pub fn schooling_system(
    world: &World,
    schools: &mut SchoolRegistry,
    cfg: &SimConfig,
    rng: &mut SmallRng,
) {
    let y_limit = cfg.world_half_height - 2.0;

    for (_, school) in schools.iter_mut() {
        // Prune members that died or went back to the pool
        school.members.retain(|&member| {
            world.contains(member)
                && world.get::<&Dead>(member).is_err()
                && world.get::<&Dormant>(member).is_err()
        });
        if school.members.is_empty() {
            continue;
        }

        let arrive_sq = cfg.school.arrive_radius * cfg.school.arrive_radius;
        let all_arrived = school.members.iter().all(|&member| {
            world
                .get::<&Position>(member)
                .map(|pos| pos.0.distance_squared(school.destination) < arrive_sq)
                .unwrap_or(true)
        });

        if all_arrived {
            let dir = if school.moving_right { 1.0 } else { -1.0 };
            let jitter = rng.gen_range(-cfg.school.vertical_jitter..cfg.school.vertical_jitter);
            school.destination = Vec2::new(
                school.destination.x + dir * cfg.school.advance_distance,
                (school.destination.y + jitter).clamp(-y_limit, y_limit),
            );
        }
    }

    schools.drop_empty();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Dead, Fish, SchoolMember};
    use rand::SeedableRng;

    fn setup() -> (World, SchoolRegistry, SimConfig, SmallRng) {
        (
            World::new(),
            SchoolRegistry::new(),
            SimConfig::default(),
            SmallRng::seed_from_u64(7),
        )
    }

    #[test]
    fn test_destination_advances_when_members_arrive() {
        let (mut world, mut schools, cfg, mut rng) = setup();
        let dest = Vec2::new(5.0, 0.0);
        let id = schools.create(dest, true);
        let member = world.spawn((
            Position(dest),
            Fish::new(1, 4.0, 0.5),
            SchoolMember { school: id, offset: Vec2::ZERO },
        ));
        schools.add_member(id, member);

        schooling_system(&world, &mut schools, &cfg, &mut rng);

        let school = schools.get(id).unwrap();
        assert!(school.destination.x > dest.x);
        assert!(school.destination.y.abs() <= cfg.world_half_height - 2.0);
    }

    #[test]
    fn test_destination_holds_while_members_lag() {
        let (mut world, mut schools, cfg, mut rng) = setup();
        let dest = Vec2::new(5.0, 0.0);
        let id = schools.create(dest, true);
        let far = Vec2::new(dest.x - cfg.school.arrive_radius * 3.0, 0.0);
        let member = world.spawn((
            Position(far),
            Fish::new(1, 4.0, 0.5),
            SchoolMember { school: id, offset: Vec2::ZERO },
        ));
        schools.add_member(id, member);

        schooling_system(&world, &mut schools, &cfg, &mut rng);

        assert_eq!(schools.get(id).unwrap().destination.x, dest.x);
    }

    #[test]
    fn test_dead_members_are_pruned_and_empty_schools_dropped() {
        let (mut world, mut schools, cfg, mut rng) = setup();
        let id = schools.create(Vec2::ZERO, false);
        let member = world.spawn((Position(Vec2::ZERO), Fish::new(1, 4.0, 0.5), Dead));
        schools.add_member(id, member);

        schooling_system(&world, &mut schools, &cfg, &mut rng);

        assert!(schools.is_empty());
    }

    #[test]
    fn test_leftward_school_advances_left() {
        let (mut world, mut schools, cfg, mut rng) = setup();
        let dest = Vec2::new(-3.0, 1.0);
        let id = schools.create(dest, false);
        let member = world.spawn((Position(dest), Fish::new(1, 4.0, 0.5)));
        schools.add_member(id, member);

        schooling_system(&world, &mut schools, &cfg, &mut rng);

        assert!(schools.get(id).unwrap().destination.x < dest.x);
    }
}
