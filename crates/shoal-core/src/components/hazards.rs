//! Hazard components: the fishing hook and the charging shark.
//!
//! Hazards bypass the level-based food chain entirely - contact with the
//! player is instant death. Their state machines are one-directional per
//! spawn: a hook never drops twice, a shark never re-warns.

/// Hook lifecycle. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    /// Moving straight down toward `target_depth`.
    Dropping,
    /// Bouncing horizontally between soft bounds for `roam_duration`.
    Roaming,
    /// Moving straight up until clear of the viewport, then released.
    Retracting,
}

/// A fishing-hook hazard dropped from above the water line.
#[derive(Debug, Clone, PartialEq)]
pub struct Hook {
    pub state: HookState,
    pub target_depth: f32,
    pub fall_speed: f32,
    pub retract_speed: f32,
    pub roam_speed: f32,
    /// -1 = left, 1 = right.
    pub roam_dir: f32,
    pub roam_duration: f32,
    pub life_timer: f32,
    pub radius: f32,
}

/// Shark lifecycle. Transitions only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharkState {
    /// On-screen indicator is showing; the shark itself sits off-screen.
    Warning,
    /// Straight-line charge across the arena at constant speed.
    Charging,
    /// Fully off the far edge; lingers for a grace delay, then released.
    Passed,
}

/// A shark event charging straight across the arena on a fixed row.
#[derive(Debug, Clone, PartialEq)]
pub struct Shark {
    pub state: SharkState,
    /// -1 = charging leftward, 1 = rightward.
    pub dir: f32,
    /// The y row the charge is locked to.
    pub charge_row: f32,
    pub speed: f32,
    pub warn_timer: f32,
    pub grace_timer: f32,
    pub radius: f32,
}
