//! Core value structs shared across the workspace: positions, rotations,
//! and the static profile an elf is spawned from.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::ElfColor;
use crate::ids::Archetype;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// A point or direction in world space.
///
/// `y` is the vertical axis; wandering and spawn jitter happen in the
/// horizontal `x`/`z` plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec3 {
    /// East-west coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
    /// North-south coordinate.
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Squared Euclidean length.
    pub fn length_squared(self) -> f32 {
        self.x.mul_add(self.x, self.y.mul_add(self.y, self.z * self.z))
    }

    /// Distance between two points.
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Offset this point horizontally by `(dx, dz)`, keeping its height.
    pub const fn offset_horizontal(self, dx: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.y, self.z + dz)
    }

}

impl core::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl core::ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl core::ops::Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Heading of an instance around the vertical axis, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rotation {
    /// Yaw angle in radians.
    pub yaw: f32,
}

impl Rotation {
    /// No rotation.
    pub const IDENTITY: Self = Self { yaw: 0.0 };
}

// ---------------------------------------------------------------------------
// Elf profile
// ---------------------------------------------------------------------------

/// Range of seconds between wander direction changes.
///
/// An elf in the `Normal` phase picks a new wander target after a delay
/// drawn uniformly from `[min_secs, max_secs]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WanderInterval {
    /// Shortest delay before changing direction.
    pub min_secs: f32,
    /// Longest delay before changing direction.
    pub max_secs: f32,
}

impl WanderInterval {
    /// Create an interval, raising `max_secs` to `min_secs` if inverted.
    pub const fn new(min_secs: f32, max_secs: f32) -> Self {
        Self {
            min_secs,
            max_secs: if max_secs < min_secs { min_secs } else { max_secs },
        }
    }
}

impl Default for WanderInterval {
    fn default() -> Self {
        Self::new(2.0, 5.0)
    }
}

/// Static description of an elf, shared by every elf a spawner produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ElfProfile {
    /// The elf's color, which drives the collision rule.
    pub color: ElfColor,
    /// Template the elf's pooled body is created from.
    pub archetype: Archetype,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Delay range between wander direction changes.
    pub wander_interval: WanderInterval,
}

impl ElfProfile {
    /// Default movement speed in units per second.
    pub const DEFAULT_SPEED: f32 = 3.0;

    /// Create a profile for `color` with default speed and wander cadence.
    ///
    /// The archetype is named after the color (`elf.red`, `elf.blue`, ...).
    pub fn for_color(color: ElfColor) -> Self {
        Self {
            color,
            archetype: Archetype::new(format!("elf.{color}")),
            speed: Self::DEFAULT_SPEED,
            wander_interval: WanderInterval::default(),
        }
    }
}
