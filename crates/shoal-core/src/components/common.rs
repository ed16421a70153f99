//! Common components and 2D math used across multiple entity types.

use serde::{Deserialize, Serialize};

/// Minimum vector magnitude considered directionally meaningful.
/// Normalization below this falls back rather than dividing by near-zero.
pub const DIR_EPSILON: f32 = 1e-3;

/// 2D position/direction vector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at the given angle (radians, counter-clockwise from +x).
    pub fn from_angle(radians: f32) -> Self {
        Self {
            x: radians.cos(),
            y: radians.sin(),
        }
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance_squared(&self, other: Self) -> f32 {
        (*self - other).length_squared()
    }

    pub fn distance(&self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (z component of the 3D cross).
    pub fn cross(&self, other: Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Normalized copy, or `Vec2::ZERO` when degenerate.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > DIR_EPSILON {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Normalized copy, falling back to `fallback` when degenerate.
    pub fn normalized_or(&self, fallback: Self) -> Self {
        let n = self.normalized();
        if n == Self::ZERO {
            fallback
        } else {
            n
        }
    }

    /// Rotate counter-clockwise by `radians`.
    pub fn rotated(&self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Signed angle (radians) from `self` to `other`.
    pub fn angle_to(&self, other: Self) -> f32 {
        self.cross(other).atan2(self.dot(other))
    }

    /// Rotate toward `target` by fraction `t` of the remaining angle.
    /// Both vectors are assumed non-degenerate; degenerate targets return `self`.
    pub fn slerp_toward(&self, target: Self, t: f32) -> Self {
        if target.length_squared() < DIR_EPSILON * DIR_EPSILON {
            return *self;
        }
        let angle = self.angle_to(target);
        self.rotated(angle * t.clamp(0.0, 1.0))
    }

    /// Reflect off a surface with the given (unit) normal.
    pub fn reflected(&self, normal: Self) -> Self {
        *self - normal * (2.0 * self.dot(normal))
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Axis-aligned rectangle (center + half extents). The camera viewport the
/// host pushes into the engine each tick is one of these.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub center: Vec2,
    pub half: Vec2,
}

impl Bounds {
    pub fn new(center: Vec2, half: Vec2) -> Self {
        Self { center, half }
    }

    pub fn from_size(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            half: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.half.y
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.half.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.bottom()
            && point.y <= self.top()
    }

    /// Grown by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            center: self.center,
            half: self.half + Vec2::new(margin, margin),
        }
    }
}

/// Cast a ray against a circle. Returns the hit distance along the ray if the
/// circle is hit within `max_dist`. `dir` must be a unit vector.
pub fn ray_circle_hit(origin: Vec2, dir: Vec2, max_dist: f32, center: Vec2, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let proj = to_center.dot(dir);
    if proj < 0.0 || proj > max_dist + radius {
        return None;
    }
    let perp_sq = to_center.length_squared() - proj * proj;
    let r_sq = radius * radius;
    if perp_sq > r_sq {
        return None;
    }
    let t = proj - (r_sq - perp_sq).sqrt();
    if t >= 0.0 && t <= max_dist {
        Some(t)
    } else {
        None
    }
}

/// Spatial position component
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position(pub Vec2);

/// Which way an entity's sprite points. Updated with hysteresis so
/// near-vertical travel doesn't flicker the flip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// Static circular obstacle the steering sensors ray-test against.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub radius: f32,
}

/// Marker for pooled-out instances. Dormant entities stay in the world but
/// every system query filters them out; they live in exactly one free queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dormant;

/// Marker set during resolution for entities that die this tick. The engine's
/// despawn sweep releases them back to the pool at the end of the tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dead;

/// The player as seen by the simulation: an external collaborator handle,
/// refreshed by the host. Fish steer relative to it and the food chain
/// resolves against it, but the core never moves it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub level: u8,
    pub position: Vec2,
    pub radius: f32,
    pub alive: bool,
}

impl Player {
    pub fn new(level: u8, position: Vec2) -> Self {
        Self {
            level,
            position,
            radius: 0.5,
            alive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);

        let sum = a + b;
        assert_eq!(sum, Vec2::new(5.0, 8.0));

        let diff = b - a;
        assert_eq!(diff, Vec2::new(3.0, 4.0));
        assert!((diff.length() - 5.0).abs() < 1e-6);

        let scaled = a * 2.0;
        assert_eq!(scaled, Vec2::new(2.0, 4.0));
    }

    #[test]
    fn test_normalize_guards_degenerate() {
        let tiny = Vec2::new(1e-6, -1e-6);
        assert_eq!(tiny.normalized(), Vec2::ZERO);
        let fallback = Vec2::new(0.0, 1.0);
        assert_eq!(tiny.normalized_or(fallback), fallback);

        let v = Vec2::new(3.0, 4.0);
        assert!((v.normalized().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_slerp_toward_rotates_partially() {
        let from = Vec2::new(1.0, 0.0);
        let to = Vec2::new(0.0, 1.0);
        let mid = from.slerp_toward(to, 0.5);
        let expected = Vec2::from_angle(std::f32::consts::FRAC_PI_4);
        assert!((mid.x - expected.x).abs() < 1e-5);
        assert!((mid.y - expected.y).abs() < 1e-5);

        // Degenerate target keeps the current direction
        assert_eq!(from.slerp_toward(Vec2::ZERO, 0.5), from);
    }

    #[test]
    fn test_bounds_contains_and_expand() {
        let b = Bounds::from_size(Vec2::ZERO, 10.0, 6.0);
        assert!(b.contains(Vec2::new(4.9, 2.9)));
        assert!(!b.contains(Vec2::new(5.1, 0.0)));
        assert!(b.expanded(1.0).contains(Vec2::new(5.5, 3.5)));
    }

    #[test]
    fn test_ray_circle_hit() {
        // Circle dead ahead
        let hit = ray_circle_hit(Vec2::ZERO, Vec2::new(1.0, 0.0), 10.0, Vec2::new(5.0, 0.0), 1.0);
        assert!(hit.is_some());
        assert!((hit.unwrap() - 4.0).abs() < 1e-4);

        // Circle behind the origin
        assert!(ray_circle_hit(Vec2::ZERO, Vec2::new(1.0, 0.0), 10.0, Vec2::new(-5.0, 0.0), 1.0).is_none());

        // Circle off to the side beyond its radius
        assert!(ray_circle_hit(Vec2::ZERO, Vec2::new(1.0, 0.0), 10.0, Vec2::new(5.0, 3.0), 1.0).is_none());
    }
}
