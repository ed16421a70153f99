//! Simulation systems, each a free function over the ECS world. The engine
//! owns the ordering and the timers; systems own the behavior.

pub mod food_chain;
pub mod hazards;
pub mod schooling;
pub mod spawning;
pub mod steering;

pub use food_chain::{food_chain_system, resolve_pair};
pub use hazards::{hook_system, shark_system};
pub use schooling::schooling_system;
pub use spawning::{
    active_fish_count, active_hook_count, maintenance_cull, predator_count, process_pending_hooks,
    shark_active, spawn_tick, PendingHook,
};
pub use steering::steering_system;
