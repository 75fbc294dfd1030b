//! Enumeration types for the Exploding Elves simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// The color of an elf.
///
/// Color is the only attribute the collision rule looks at: two elves of
/// the same color multiply, two elves of different colors destroy each
/// other. Each color has at most one dedicated spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ElfColor {
    /// Black elves.
    Black,
    /// Red elves.
    Red,
    /// White elves.
    White,
    /// Blue elves.
    Blue,
}

impl ElfColor {
    /// Every color, in declaration order.
    pub const ALL: [Self; 4] = [Self::Black, Self::Red, Self::White, Self::Blue];
}

impl core::fmt::Display for ElfColor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Black => write!(f, "black"),
            Self::Red => write!(f, "red"),
            Self::White => write!(f, "white"),
            Self::Blue => write!(f, "blue"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Observable lifecycle phase of an elf.
///
/// This is the data-free projection of the lifecycle state machine, used
/// for queries, summaries, and anything that crosses a crate boundary.
/// `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum LifecyclePhase {
    /// Wandering freely.
    Normal,
    /// Frozen after a collision, counting down to `Normal`.
    Stunned,
    /// Destroyed. Never leaves this phase.
    Dead,
}

impl core::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Stunned => write!(f, "stunned"),
            Self::Dead => write!(f, "dead"),
        }
    }
}
