//! Collision policy: what two colliding elves turn into.
//!
//! A policy is a pure function of the two colors. [`ColorMatchPolicy`] is
//! the standard rule; alternative rules are new [`CollisionPolicy`]
//! implementations, never branches inside this one.

use elfsim_types::ElfColor;

/// Outcome of evaluating one collision.
///
/// Exactly one outcome holds per evaluation, so duplicate and destroy can
/// never both be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionDecision {
    /// Produce one extra elf of the shared color (subject to cooldown).
    Duplicate,
    /// Both elves explode.
    DestroyBoth,
    /// Nothing happens beyond the stun.
    Neither,
}

impl CollisionDecision {
    /// Whether this decision asks for an extra elf.
    pub const fn should_duplicate(self) -> bool {
        matches!(self, Self::Duplicate)
    }

    /// Whether this decision destroys both elves.
    pub const fn should_destroy_both(self) -> bool {
        matches!(self, Self::DestroyBoth)
    }
}

impl core::fmt::Display for CollisionDecision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Duplicate => write!(f, "duplicate"),
            Self::DestroyBoth => write!(f, "destroy_both"),
            Self::Neither => write!(f, "neither"),
        }
    }
}

/// Rule deciding a collision from the colors involved.
///
/// `None` stands for a side whose color could not be determined.
/// Implementations must be symmetric in their arguments.
pub trait CollisionPolicy {
    /// Decide the outcome of a collision between colors `a` and `b`.
    fn decide(&self, a: Option<ElfColor>, b: Option<ElfColor>) -> CollisionDecision;
}

/// Same color duplicates, different colors destroy each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorMatchPolicy;

impl CollisionPolicy for ColorMatchPolicy {
    fn decide(&self, a: Option<ElfColor>, b: Option<ElfColor>) -> CollisionDecision {
        match (a, b) {
            (Some(a), Some(b)) if a == b => CollisionDecision::Duplicate,
            (Some(_), Some(_)) => CollisionDecision::DestroyBoth,
            _ => CollisionDecision::Neither,
        }
    }
}

impl<P: CollisionPolicy + ?Sized> CollisionPolicy for Box<P> {
    fn decide(&self, a: Option<ElfColor>, b: Option<ElfColor>) -> CollisionDecision {
        (**self).decide(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_inputs() -> Vec<Option<ElfColor>> {
        let mut inputs: Vec<Option<ElfColor>> = ElfColor::ALL.iter().copied().map(Some).collect();
        inputs.push(None);
        inputs
    }

    #[test]
    fn same_color_duplicates() {
        for color in ElfColor::ALL {
            assert_eq!(
                ColorMatchPolicy.decide(Some(color), Some(color)),
                CollisionDecision::Duplicate
            );
        }
    }

    #[test]
    fn different_colors_destroy() {
        let decision = ColorMatchPolicy.decide(Some(ElfColor::Red), Some(ElfColor::Blue));
        assert_eq!(decision, CollisionDecision::DestroyBoth);
        assert!(decision.should_destroy_both());
        assert!(!decision.should_duplicate());
    }

    #[test]
    fn missing_color_is_neither() {
        assert_eq!(
            ColorMatchPolicy.decide(None, Some(ElfColor::Red)),
            CollisionDecision::Neither
        );
        assert_eq!(
            ColorMatchPolicy.decide(Some(ElfColor::Red), None),
            CollisionDecision::Neither
        );
        assert_eq!(ColorMatchPolicy.decide(None, None), CollisionDecision::Neither);
    }

    #[test]
    fn decision_is_symmetric() {
        for a in all_inputs() {
            for b in all_inputs() {
                assert_eq!(ColorMatchPolicy.decide(a, b), ColorMatchPolicy.decide(b, a));
            }
        }
    }

    #[test]
    fn never_both_facets() {
        for a in all_inputs() {
            for b in all_inputs() {
                let d = ColorMatchPolicy.decide(a, b);
                assert!(!(d.should_duplicate() && d.should_destroy_both()));
            }
        }
    }

    #[test]
    fn boxed_policy_delegates() {
        let policy: Box<dyn CollisionPolicy> = Box::new(ColorMatchPolicy);
        assert_eq!(
            policy.decide(Some(ElfColor::White), Some(ElfColor::White)),
            CollisionDecision::Duplicate
        );
    }
}
