use bitflags::bitflags;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

bitflags! {
    /// Allegiance bits. Two actors are allies when their sets intersect.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Factions: u64 {
        const PLAYER = 1 << 0;
        const ENEMY = 1 << 1;
        const POWERUP = 1 << 2;
        const VIRUS = 1 << 24;
        const COMMON = 1 << 56;
    }
}

impl Factions {
    pub fn is_allied_with(self, other: Factions) -> bool {
        self.intersects(other)
    }
}

/// How a faction task combines its operand with the current set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SetOperation {
    #[default]
    Replace,
    Union,
    Intersection,
    SymmetricDifference,
    Difference,
}

impl SetOperation {
    pub fn apply(self, current: Factions, operand: Factions) -> Factions {
        match self {
            Self::Replace => operand,
            Self::Union => current | operand,
            Self::Intersection => current & operand,
            Self::SymmetricDifference => current ^ operand,
            Self::Difference => current - operand,
        }
    }
}
