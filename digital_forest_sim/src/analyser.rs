// Read-only statistics over a forest.
//
// The analyser never mutates the forest and never touches the RNG, so
// running it between steps cannot perturb a deterministic replay. Live
// counts come from the grid, mortality counts from the graveyard.

use crate::forest::Forest;
use crate::types::{DeathReason, Species};
use std::collections::BTreeMap;

/// Snapshot statistics over a borrowed forest.
pub struct Analyser<'a> {
    forest: &'a Forest,
}

impl<'a> Analyser<'a> {
    pub fn new(forest: &'a Forest) -> Self {
        Self { forest }
    }

    /// Count of living trees per species. Species with no living members
    /// are absent from the map.
    pub fn population_distribution(&self) -> BTreeMap<Species, usize> {
        let mut counts = BTreeMap::new();
        for (_, _, tree) in self.forest.trees() {
            *counts.entry(tree.genes.species).or_insert(0) += 1;
        }
        counts
    }

    /// Per-species breakdown of causes of death, over the whole run.
    pub fn reason_of_death(&self) -> BTreeMap<Species, BTreeMap<DeathReason, usize>> {
        let mut out: BTreeMap<Species, BTreeMap<DeathReason, usize>> = BTreeMap::new();
        for (species, records) in self.forest.graveyard().iter() {
            let per_species = out.entry(species).or_default();
            for record in records {
                *per_species.entry(record.death_reason).or_insert(0) += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ForestConfig, SurvivalParams};

    #[test]
    fn population_distribution_counts_live_trees() {
        let config = ForestConfig {
            size: 4,
            initial_population: 1.0,
            spawn_probability: 0.0,
            species: vec![Species::Honda, Species::Fern],
            ..ForestConfig::default()
        };
        let forest = Forest::new(config, 2);
        let dist = Analyser::new(&forest).population_distribution();
        let total: usize = dist.values().sum();
        assert_eq!(total, 16);
        for species in dist.keys() {
            assert!(matches!(species, Species::Honda | Species::Fern));
        }
    }

    #[test]
    fn reason_of_death_matches_graveyard() {
        let config = ForestConfig {
            size: 4,
            initial_population: 1.0,
            spawn_probability: 0.0,
            survival: SurvivalParams {
                size_cost: 0.0,
                age_mortality_scale: 0.5,
                shade_mortality: 0.0,
            },
            species: vec![Species::Pine],
            ..ForestConfig::default()
        };
        let mut forest = Forest::new(config, 4);
        forest.step();

        let reasons = Analyser::new(&forest).reason_of_death();
        let pine = reasons.get(&Species::Pine).expect("no pine deaths recorded");
        assert_eq!(pine.get(&DeathReason::Age), Some(&16));
        assert!(Analyser::new(&forest).population_distribution().is_empty());
    }

    #[test]
    fn empty_forest_yields_empty_maps() {
        let config = ForestConfig {
            size: 3,
            initial_population: 0.0,
            spawn_probability: 0.0,
            ..ForestConfig::default()
        };
        let forest = Forest::new(config, 0);
        let analyser = Analyser::new(&forest);
        assert!(analyser.population_distribution().is_empty());
        assert!(analyser.reason_of_death().is_empty());
    }
}
