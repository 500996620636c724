// Genetic algorithm: breeding new gene sets from surviving individuals.
//
// `breed` picks two distinct parents uniformly from a species' gene pool,
// performs field-wise uniform (50/50) crossover over every gene key, then
// applies per-key mutation: with probability `mutation_rate`, a value is
// scaled by a uniform factor in `[1 - mutation_strength, 1 + mutation_strength)`.
// The species tag is immutable and never crossed or mutated.
//
// A pool with fewer than two members cannot breed; `breed` returns `None`
// and the forest's reproduction pass skips that species for the step
// instead of erroring.
//
// Gene values are visited in `BTreeMap` key order, so the RNG draw sequence
// per breeding is fixed — with a rate of 0.75 and strength 0.5 you get some
// interesting results.
//
// See also: `genes.rs` for `GeneSet`, `forest.rs` for pool construction.

use crate::genes::{GeneSet, MAX_RELATIVE_PERTURBATION};
use digital_forest_prng::ForestRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Breeding parameters. Owned by the forest, applied every reproduction pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneticAlgorithm {
    pub mutation_rate: f64,
    pub mutation_strength: f64,
}

impl GeneticAlgorithm {
    pub fn new(mutation_rate: f64, mutation_strength: f64) -> Self {
        Self {
            mutation_rate,
            mutation_strength,
        }
    }

    /// Breed one child gene set from a pool. Returns `None` when the pool
    /// has fewer than two members — the caller skips that species.
    pub fn breed(&self, pool: &[GeneSet], rng: &mut ForestRng) -> Option<GeneSet> {
        if pool.len() < 2 {
            return None;
        }
        let (a, b) = rng.two_distinct(pool.len());
        let child = self.crossover(&pool[a], &pool[b], rng);
        Some(self.mutate(child, rng))
    }

    /// Breed `n` independent children. Empty when the pool cannot breed.
    pub fn generate_children(
        &self,
        pool: &[GeneSet],
        n: usize,
        rng: &mut ForestRng,
    ) -> Vec<GeneSet> {
        (0..n).filter_map(|_| self.breed(pool, rng)).collect()
    }

    /// Field-wise 50/50 crossover. Both parents come from the same species
    /// pool, so they carry the same key set; a key missing from the second
    /// parent falls back to the first.
    fn crossover(&self, parent1: &GeneSet, parent2: &GeneSet, rng: &mut ForestRng) -> GeneSet {
        let mut values = BTreeMap::new();
        for (key, v1) in parent1.values() {
            let v = if rng.random_bool(0.5) {
                *v1
            } else {
                parent2.values().get(key).copied().unwrap_or(*v1)
            };
            values.insert(*key, v);
        }
        GeneSet::from_values(parent1.species, values)
    }

    /// Per-key mutation: each value independently, with probability
    /// `mutation_rate`, is perturbed by a fraction of itself drawn
    /// uniformly from `[-mutation_strength, mutation_strength)`. The drawn
    /// fraction is clamped strictly inside `(-1, 1)`: a mutated value keeps
    /// its sign and stays finite, so rewrite rules never see a gene that
    /// crossed zero (a negative `q` under a fractional exponent is NaN).
    fn mutate(&self, genes: GeneSet, rng: &mut ForestRng) -> GeneSet {
        let species = genes.species;
        let mut values = genes.values().clone();
        for v in values.values_mut() {
            if rng.next_f64() < self.mutation_rate && self.mutation_strength > 0.0 {
                let f = rng
                    .range_f64(-self.mutation_strength, self.mutation_strength)
                    .clamp(-MAX_RELATIVE_PERTURBATION, MAX_RELATIVE_PERTURBATION);
                *v += f * *v;
            }
        }
        GeneSet::from_values(species, values)
    }
}
