// Lifecycle events emitted by the forest.
//
// The engine does not log to a console or file; it emits structured events
// that a driver polls out with `Forest::drain_events()` after each step.
// Deaths additionally leave a one-shot geometry snapshot behind (see
// `Forest::reached_termination`), so a renderer can capture a tree's final
// shape; the event stream is the narrative record.
//
// Grid coordinates in events are interior indices (1..=size on both axes).

use crate::types::{DeathReason, Season, Species};
use serde::{Deserialize, Serialize};

/// One narrative event, stamped with the generation that produced it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestEvent {
    pub generation: u64,
    pub kind: ForestEventKind,
}

/// Types of events visible to drivers and statistics tooling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ForestEventKind {
    /// A tree appeared (initial spawn or reproduction).
    TreeSpawned {
        row: usize,
        col: usize,
        species: Species,
    },
    /// A tree failed its survival roll and left the grid.
    TreeDied {
        row: usize,
        col: usize,
        species: Species,
        reason: DeathReason,
        age: u32,
    },
    /// A cell won its spawn roll but no species had a breedable pool.
    ReproductionSkipped { row: usize, col: usize },
    /// The seasonal cycle advanced to a new phase.
    SeasonChanged { season: Season },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip() {
        let events = vec![
            ForestEvent {
                generation: 3,
                kind: ForestEventKind::TreeDied {
                    row: 2,
                    col: 5,
                    species: Species::Pine,
                    reason: DeathReason::Shadow,
                    age: 12,
                },
            },
            ForestEvent {
                generation: 5,
                kind: ForestEventKind::SeasonChanged {
                    season: Season::Winter,
                },
            },
        ];
        let json = serde_json::to_string(&events).unwrap();
        let restored: Vec<ForestEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(events, restored);
    }
}
