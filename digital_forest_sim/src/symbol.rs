// The growth language.
//
// A tree's growth state is an ordered `Vec<Symbol>`. Branch symbols are the
// only ones subject to rewriting (see `species.rs`); command symbols are
// terminal — the identity rule passes them through unchanged, and the turtle
// interpreter (`turtle.rs`) executes them. The turtle in turn ignores branch
// symbols, so the two halves of the language never collide.
//
// Angles are carried in degrees, matching the gene templates; the turtle
// converts to radians at execution time. A right turn is the negation of a
// left turn — there is a single `Yaw` command with a signed angle.

use serde::{Deserialize, Serialize};

/// Rewritable branch tags. Which tags a species actually expands is up to
/// its rewrite rule; a tag the rule does not recognize passes through
/// unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BranchTag {
    /// Apical growth point (Honda, Fern).
    Apex,
    /// Horizontal runner (Shrub, first phase).
    Runner,
    /// Lateral shoot (Shrub cushion phase, Pine whorls).
    Shoot,
    /// Continuing trunk segment (Pine).
    Trunk,
}

/// One instruction of the growth language.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Symbol {
    /// A growing branch segment: rewritten each growth step.
    Branch { tag: BranchTag, len: f64, width: f64 },
    /// Move the turtle forward along its local up axis, emitting a point.
    Forward(f64),
    /// Rotate about the local vertical axis (degrees, signed).
    Yaw(f64),
    /// Rotate about the local depth axis (degrees, signed).
    Roll(f64),
    /// Change the current segment width without moving.
    SetWidth(f64),
    /// Save the turtle transform, width, and point index.
    Push,
    /// Restore the matching `Push` snapshot.
    Pop,
}

impl Symbol {
    /// `true` for terminal command symbols, `false` for branch symbols.
    pub fn is_command(&self) -> bool {
        !matches!(self, Symbol::Branch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_is_not_a_command() {
        let branch = Symbol::Branch {
            tag: BranchTag::Apex,
            len: 1.0,
            width: 0.2,
        };
        assert!(!branch.is_command());
        assert!(Symbol::Forward(1.0).is_command());
        assert!(Symbol::Push.is_command());
        assert!(Symbol::Pop.is_command());
        assert!(Symbol::Yaw(-30.0).is_command());
    }

    #[test]
    fn serde_roundtrip() {
        let seq = vec![
            Symbol::SetWidth(0.3),
            Symbol::Forward(0.7),
            Symbol::Push,
            Symbol::Yaw(25.0),
            Symbol::Roll(137.0),
            Symbol::Branch {
                tag: BranchTag::Apex,
                len: 0.42,
                width: 0.18,
            },
            Symbol::Pop,
        ];
        let json = serde_json::to_string(&seq).unwrap();
        let restored: Vec<Symbol> = serde_json::from_str(&json).unwrap();
        assert_eq!(seq, restored);
    }
}
