//! Component definitions for the ECS simulation.
//!
//! Components are pure data structs attached to entities.
//! They have no behavior - that lives in systems.

mod common;
mod fish;
mod hazards;

pub use common::*;
pub use fish::*;
pub use hazards::*;
