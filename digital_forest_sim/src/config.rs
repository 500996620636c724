// Data-driven forest configuration.
//
// All tunable simulation parameters live in `ForestConfig`, loadable from
// JSON. The engine never uses magic numbers for ecological balance — it
// reads from the config, so balance iteration needs no recompilation and a
// saved run records exactly the parameters it ran with.
//
// Survival-model coefficients are grouped into `SurvivalParams`; everything
// else is flat. `with_species_names` is the fallible entry point for
// configs that carry species as strings — an unknown name is surfaced
// immediately as `UnknownSpeciesError`, never defaulted.
//
// See also: `forest.rs` which owns the config as part of `Forest`,
// `tree.rs` for the survival model that reads `SurvivalParams`.

use crate::types::{ChampionMetric, Species, UnknownSpeciesError};
use serde::{Deserialize, Serialize};

/// Coefficients of the survival model (see `Tree::survival_roll`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SurvivalParams {
    /// Scale of the size-derived requirement:
    /// `requirement = size_cost · (height · width²)² + shadow`.
    pub size_cost: f64,
    /// Age at which the age term of the mortality roll reaches 1.0 (certain
    /// death): `age_term = (age / age_mortality_scale)²`.
    pub age_mortality_scale: f64,
    /// Weight of the shading term of the mortality roll:
    /// `shade_term = shade_mortality · shadow / (sunlight + 1)`.
    pub shade_mortality: f64,
}

/// Top-level forest configuration. Loaded once, never mutated at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Interior grid edge length. The stored grid is `(size+2)²` with a
    /// permanent empty sentinel border.
    pub size: usize,

    /// Probability that each interior cell starts with a tree.
    pub initial_population: f64,

    /// Per-empty-cell spawn probability during the reproduction pass.
    pub spawn_probability: f64,

    /// Per-gene mutation probability during breeding.
    pub mutation_rate: f64,

    /// Mutation magnitude as a fraction of the gene's current value.
    pub mutation_strength: f64,

    /// Age beyond which symbolic growth freezes (species-independent).
    /// Age keeps advancing; only the rewrite/geometry step stops.
    pub growth_cutoff_age: u32,

    /// Generations per seasonal phase of the four-phase cycle.
    pub season_length: u64,

    /// Uniform jitter (fraction of each value) applied when sampling
    /// species default gene templates at initial spawn.
    pub default_gene_jitter: f64,

    /// Survival-model coefficients.
    pub survival: SurvivalParams,

    /// Which scalar decides per-species champions.
    pub champion_metric: ChampionMetric,

    /// Species participating in this run. Initial spawn samples uniformly
    /// from this list.
    pub species: Vec<Species>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            size: 10,
            initial_population: 0.5,
            spawn_probability: 0.1,
            mutation_rate: 0.05,
            mutation_strength: 0.1,
            growth_cutoff_age: 8,
            season_length: 5,
            default_gene_jitter: 0.05,
            survival: SurvivalParams {
                size_cost: 0.002,
                age_mortality_scale: 60.0,
                shade_mortality: 0.5,
            },
            champion_metric: ChampionMetric::FinalAge,
            species: Species::ALL.to_vec(),
        }
    }
}

impl ForestConfig {
    /// Default config restricted to the named species. Unknown names are a
    /// configuration error.
    pub fn with_species_names(names: &[&str]) -> Result<Self, UnknownSpeciesError> {
        let species = names
            .iter()
            .map(|n| Species::from_name(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            species,
            ..Self::default()
        })
    }
}
