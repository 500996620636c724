// Core types shared across the simulation.
//
// Defines the closed set of tree species, the cause-of-death taxonomy, the
// seasonal cycle with its per-season sunlight weights, and the champion
// ranking metric. All types derive `Serialize`/`Deserialize` for snapshot
// and exact-resume support.
//
// Species selection is a closed enum rather than a string tag: a gene set
// referencing a species with no rewrite rule is unrepresentable. The only
// place a species name can be wrong is external configuration, which goes
// through `Species::from_name` and surfaces `UnknownSpeciesError` immediately.
//
// **Critical constraint: determinism.** `Species`, `DeathReason`, and
// `Season` derive `Ord` so keyed collections (`BTreeMap`) iterate in a
// stable order, which fixes the RNG draw sequence of every pass.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// The closed set of tree species. Each species binds an axiom, a rewrite
/// rule (see `species.rs`), and a default gene template (see `genes.rs`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Classic bifurcating form: two gene-angled sub-branches per expansion.
    Honda,
    /// Wide-first shrub: horizontal runners that fold into a radial cushion
    /// once segment length drops below a threshold.
    Shrub,
    /// Conifer: a single continuing trunk with periodic long lateral whorls.
    Pine,
    /// Frond-layering form: three forward segments with mirrored sub-branches.
    Fern,
}

impl Species {
    /// All species, in the canonical (enum) order.
    pub const ALL: [Species; 4] = [Species::Honda, Species::Shrub, Species::Pine, Species::Fern];

    /// The lowercase name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Species::Honda => "honda",
            Species::Shrub => "shrub",
            Species::Pine => "pine",
            Species::Fern => "fern",
        }
    }

    /// Parse a configuration species name. Unknown names are a configuration
    /// error and must be surfaced to the caller, never defaulted.
    pub fn from_name(name: &str) -> Result<Self, UnknownSpeciesError> {
        match name {
            "honda" => Ok(Species::Honda),
            "shrub" => Ok(Species::Shrub),
            "pine" => Ok(Species::Pine),
            "fern" => Ok(Species::Fern),
            other => Err(UnknownSpeciesError(other.to_string())),
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A species name with no registered rewrite rule or gene template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSpeciesError(pub String);

impl fmt::Display for UnknownSpeciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown species name: {:?}", self.0)
    }
}

impl Error for UnknownSpeciesError {}

// ---------------------------------------------------------------------------
// Death taxonomy
// ---------------------------------------------------------------------------

/// Why a tree left the grid. Set if and only if the tree is dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeathReason {
    /// Lost the probabilistic roll with the age term dominating.
    Age,
    /// Lost the probabilistic roll with the shading term dominating.
    Shadow,
    /// Sunlight intake fell below the size-derived survival requirement.
    Size,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeathReason::Age => "age",
            DeathReason::Shadow => "shadow",
            DeathReason::Size => "size",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// The four-phase seasonal cycle. The cycle order is fixed; the forest
/// advances one phase every `season_length` generations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    Autumn,
    Winter,
    Spring,
    Summer,
}

impl Season {
    /// The fixed cycle order, starting phase first.
    pub const CYCLE: [Season; 4] = [Season::Autumn, Season::Winter, Season::Spring, Season::Summer];

    /// Season-dependent weights `(alpha, beta, gamma)` for the sunlight
    /// fitness `alpha·h + beta·w + gamma·sqrt(h·w)`.
    ///
    /// High-sun seasons reward canopy width, low-angle-sun seasons reward
    /// height (a tall tree catches slanted light that a broad one misses).
    pub fn sunlight_weights(self) -> (f64, f64, f64) {
        match self {
            Season::Autumn => (1.2, 0.8, 1.0),
            Season::Winter => (1.5, 0.5, 1.0),
            Season::Spring => (1.0, 1.0, 1.0),
            Season::Summer => (0.5, 1.5, 1.0),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Season::Autumn => "autumn",
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Champion ranking
// ---------------------------------------------------------------------------

/// Which scalar decides the per-species champion when a tree dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChampionMetric {
    /// Oldest tree observed.
    FinalAge,
    /// Tallest tree observed.
    Height,
}
