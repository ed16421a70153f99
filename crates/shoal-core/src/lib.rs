//! Shoal Core - Arcade Aquarium Simulation Engine
//!
//! A headless simulation of a 2D "eat smaller fish, avoid bigger fish" arena:
//! steering fish AI, food-chain resolution, population management, and scripted
//! hazards, independent of any rendering or physics engine.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Fish, hazards (hooks and sharks), static obstacles
//! - **Components**: Pure data attached to entities (Position, Fish, Steering, etc.)
//! - **Systems**: Logic that queries and updates components
//!
//! The host drives the engine with a fixed timestep and feeds it the two things
//! it cannot know on its own: the camera viewport and the player's state.
//! Everything the host needs back - spawns, despawns, eats, player death,
//! cosmetic bursts - is emitted as [`events::SimEvent`]s.
//!
//! # Example
//!
//! ```rust,no_run
//! use shoal_core::prelude::*;
//! use shoal_core::catalog::SpawnCatalog;
//!
//! let catalog = SpawnCatalog::from_json(include_str!("../../../data/spawn_catalog.json"))
//!     .expect("valid catalog");
//! let mut sim = Simulation::new(SimConfig::default(), catalog);
//! sim.set_player(Player::new(1, Vec2::ZERO));
//!
//! // Run simulation
//! loop {
//!     sim.tick(1.0 / 50.0); // physics-aligned fixed timestep
//!     for event in sim.drain_events() {
//!         // forward to score/UI/VFX layers
//!         let _ = event;
//!     }
//! }
//! ```

pub mod catalog;
pub mod components;
pub mod config;
pub mod engine;
pub mod events;
pub mod pool;
pub mod schools;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::SimConfig;
    pub use crate::engine::Simulation;
    pub use crate::events::SimEvent;
}
