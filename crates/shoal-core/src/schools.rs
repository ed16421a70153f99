//! School registry: shared destinations for grouped wandering fish.
//!
//! Schools don't own their members' lifetimes - members carry a
//! [`SchoolMember`](crate::components::SchoolMember) component pointing back
//! here, and the roster is pruned as members die, flee, or pool out.

use hecs::Entity;
use std::collections::HashMap;

use crate::components::{SchoolId, Vec2};

/// A shared-destination group of same-tier wandering fish.
#[derive(Debug, Clone)]
pub struct School {
    pub destination: Vec2,
    pub moving_right: bool,
    pub members: Vec<Entity>,
}

/// Engine-owned table of active schools.
#[derive(Debug, Default)]
pub struct SchoolRegistry {
    schools: HashMap<SchoolId, School>,
    next_id: u32,
}

impl SchoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, destination: Vec2, moving_right: bool) -> SchoolId {
        let id = SchoolId(self.next_id);
        self.next_id += 1;
        self.schools.insert(
            id,
            School {
                destination,
                moving_right,
                members: Vec::new(),
            },
        );
        id
    }

    pub fn get(&self, id: SchoolId) -> Option<&School> {
        self.schools.get(&id)
    }

    pub fn get_mut(&mut self, id: SchoolId) -> Option<&mut School> {
        self.schools.get_mut(&id)
    }

    pub fn add_member(&mut self, id: SchoolId, entity: Entity) {
        if let Some(school) = self.schools.get_mut(&id) {
            school.members.push(entity);
        }
    }

    /// Remove a member (fleeing breaks formation). Empty schools linger until
    /// the next [`drop_empty`](Self::drop_empty) pass.
    pub fn remove_member(&mut self, id: SchoolId, entity: Entity) {
        if let Some(school) = self.schools.get_mut(&id) {
            school.members.retain(|&m| m != entity);
        }
    }

    pub fn drop_empty(&mut self) {
        self.schools.retain(|_, school| !school.members.is_empty());
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SchoolId, &mut School)> {
        self.schools.iter_mut().map(|(&id, school)| (id, school))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hecs::World;

    #[test]
    fn test_membership_lifecycle() {
        let mut world = World::new();
        let mut registry = SchoolRegistry::new();

        let id = registry.create(Vec2::new(5.0, 0.0), true);
        let a = world.spawn(());
        let b = world.spawn(());
        registry.add_member(id, a);
        registry.add_member(id, b);
        assert_eq!(registry.get(id).unwrap().members.len(), 2);

        registry.remove_member(id, a);
        assert_eq!(registry.get(id).unwrap().members.len(), 1);

        registry.remove_member(id, b);
        registry.drop_empty();
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut registry = SchoolRegistry::new();
        let a = registry.create(Vec2::ZERO, true);
        let b = registry.create(Vec2::ZERO, false);
        assert_ne!(a, b);
    }
}
