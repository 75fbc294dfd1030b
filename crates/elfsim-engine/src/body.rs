//! Kinematic movement for elves.
//!
//! [`KinematicBody`] is the engine's movement layer: it walks in a straight
//! line towards its destination at a fixed speed inside the square world
//! `[-half_extent, half_extent]` on x and z. It stands in for a navigation
//! mesh, so "walkable" means "inside the square".

use elfsim_agents::MovementHandle;
use elfsim_types::Vec3;

/// Straight-line mover confined to a square.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    position: Vec3,
    velocity: Vec3,
    destination: Option<Vec3>,
    speed: f32,
    half_extent: f32,
    halted: bool,
    enabled: bool,
}

impl KinematicBody {
    /// Place a body at `position` (clamped into the world).
    pub fn new(position: Vec3, speed: f32, half_extent: f32) -> Self {
        let half_extent = half_extent.abs();
        Self {
            position: clamp_to_square(position, half_extent),
            velocity: Vec3::ZERO,
            destination: None,
            speed: speed.max(0.0),
            half_extent,
            halted: false,
            enabled: true,
        }
    }

    /// Move along the current path for `delta` seconds.
    pub fn integrate(&mut self, delta: f32) {
        if self.halted || !self.enabled {
            self.velocity = Vec3::ZERO;
            return;
        }
        let Some(destination) = self.destination else {
            self.velocity = Vec3::ZERO;
            return;
        };

        let to_target = destination - self.position;
        let distance = to_target.length();
        let step = self.speed * delta.max(0.0);
        if distance <= step || distance <= f32::EPSILON {
            self.position = destination;
            self.destination = None;
            self.velocity = Vec3::ZERO;
        } else {
            let direction = to_target * distance.recip();
            self.velocity = direction * self.speed;
            self.position = self.position + direction * step;
        }
    }

    /// Enable or disable the body. A disabled body ignores commands.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.velocity = Vec3::ZERO;
        }
    }

    fn contains(&self, point: Vec3) -> bool {
        point.x.abs() <= self.half_extent && point.z.abs() <= self.half_extent
    }
}

impl MovementHandle for KinematicBody {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn stop(&mut self) {
        self.halted = true;
        self.destination = None;
        self.velocity = Vec3::ZERO;
    }

    fn resume(&mut self) {
        self.halted = false;
    }

    fn velocity_magnitude(&self) -> f32 {
        self.velocity.length()
    }

    fn teleport(&mut self, position: Vec3) -> bool {
        if !self.enabled || !self.contains(position) {
            return false;
        }
        self.position = position;
        self.velocity = Vec3::ZERO;
        true
    }

    fn set_destination(&mut self, target: Vec3) -> bool {
        if !self.enabled || !self.contains(target) {
            return false;
        }
        self.destination = Some(target);
        // Velocity follows the new path immediately.
        if !self.halted {
            let to_target = target - self.position;
            let distance = to_target.length();
            if distance > f32::EPSILON {
                self.velocity = to_target * (self.speed / distance);
            }
        }
        true
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn sample_walkable(&self, candidate: Vec3, max_distance: f32) -> Option<Vec3> {
        let clamped = clamp_to_square(candidate, self.half_extent);
        (clamped.distance(candidate) <= max_distance).then_some(clamped)
    }
}

/// Clamp `point` into the square `[-half_extent, half_extent]` on x and z.
///
/// The sign of `half_extent` is ignored; NaN collapses the square to the
/// origin.
pub fn clamp_to_square(point: Vec3, half_extent: f32) -> Vec3 {
    let half_extent = if half_extent.is_nan() {
        0.0
    } else {
        half_extent.abs()
    };
    Vec3::new(
        point.x.clamp(-half_extent, half_extent),
        point.y,
        point.z.clamp(-half_extent, half_extent),
    )
}
