//! Reusable-instance pool keyed by prototype identity.
//!
//! Despawned entities are not destroyed: they stay in the world carrying the
//! [`Dormant`] marker and wait in a per-prototype free queue. Spawning pulls
//! from the queue before constructing anything new. An instance is tracked as
//! active xor sitting in exactly one free queue - never both.

use hecs::{Entity, World};
use log::warn;
use std::collections::{HashMap, VecDeque};

use crate::catalog::PrototypeId;
use crate::components::Dormant;

/// What kind of instance a pooled entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKey {
    Fish(PrototypeId),
    Hook,
    Shark,
}

/// Object lifecycle pool. The pool hands out entity handles; component
/// (re)initialization is the spawning code's job.
#[derive(Debug, Default)]
pub struct EntityPool {
    free: HashMap<PoolKey, VecDeque<Entity>>,
    active: HashMap<Entity, PoolKey>,
}

impl EntityPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recycle an inactive instance of `key`, removing its `Dormant` marker.
    /// Returns `None` when the free queue is empty and the caller should
    /// construct a fresh instance (and [`track`](Self::track) it).
    pub fn acquire(&mut self, world: &mut World, key: PoolKey) -> Option<Entity> {
        let queue = self.free.get_mut(&key)?;
        while let Some(entity) = queue.pop_front() {
            // The world can lose entities out from under us (host resets);
            // skip stale handles rather than reviving garbage.
            if !world.contains(entity) {
                continue;
            }
            let _ = world.remove_one::<Dormant>(entity);
            self.active.insert(entity, key);
            return Some(entity);
        }
        None
    }

    /// Register a freshly constructed instance as active under `key`.
    pub fn track(&mut self, entity: Entity, key: PoolKey) {
        self.active.insert(entity, key);
    }

    /// Deactivate an instance and enqueue it under its originating key.
    ///
    /// Releasing an instance the pool doesn't track (double-release, or a
    /// foreign entity) is a caller error: it is logged and the entity is
    /// destroyed outright rather than corrupting pool state. Returns whether
    /// the instance was actually pooled.
    pub fn release(&mut self, world: &mut World, entity: Entity) -> bool {
        let Some(key) = self.active.remove(&entity) else {
            warn!("release of untracked entity {:?}; destroying instead of pooling", entity);
            let _ = world.despawn(entity);
            return false;
        };
        if world.insert_one(entity, Dormant).is_err() {
            // Entity died outside the pool's control; nothing to recycle.
            return false;
        }
        self.free.entry(key).or_default().push_back(entity);
        true
    }

    pub fn is_active(&self, entity: Entity) -> bool {
        self.active.contains_key(&entity)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn free_count(&self, key: PoolKey) -> usize {
        self.free.get(&key).map_or(0, |q| q.len())
    }
}
