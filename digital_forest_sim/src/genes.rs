// Gene sets and per-species default templates.
//
// A `GeneSet` is a mapping from gene key to numeric value plus the immutable
// species tag it was drawn from. The numeric side drives everything the
// rewrite rules do: branch-length ratios, yaw/roll angles, and the
// thickness-allometry pair `(q, e)`. Gene sets are immutable once assigned
// to a tree; new ones are produced only by `GeneticAlgorithm::breed`
// (see `genetic.rs`) or by `sample_defaults`, which copies a species
// template and applies a small uniform jitter per value.
//
// Values live in a `BTreeMap<GeneKey, f64>` so crossover and mutation visit
// keys in a stable order — the RNG draw sequence per breeding is fixed.
//
// The templates reproduce the species default parameter tables of the
// original forest: five Honda variants, three shrub cushions, three pines,
// one fern.

use crate::types::Species;
use digital_forest_prng::ForestRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every gene key used by any species. A species' template defines which
/// subset it carries; rules only read keys their template guarantees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeneKey {
    /// First / only branch-length ratio (Honda, Fern).
    R1,
    /// Second branch-length ratio (Honda).
    R2,
    /// Runner length ratio (Shrub).
    RHoriz,
    /// Cushion shoot length ratio (Shrub).
    RBush,
    /// Trunk length ratio (Pine).
    RTrunk,
    /// Whorl branch length ratio (Pine).
    RBranch,
    /// First / only yaw angle, degrees (Honda, Fern).
    Alpha1,
    /// Second yaw angle, degrees (Honda).
    Alpha2,
    /// Yaw angle, degrees (Shrub, Pine).
    Alpha,
    /// First / only roll angle, degrees (Honda, Fern).
    Phi1,
    /// Second roll angle, degrees (Honda).
    Phi2,
    /// Roll angle, degrees (Shrub, Pine).
    Phi,
    /// Shoots per cushion expansion (Shrub; truncated to an integer).
    NBushy,
    /// Runner length below which the shrub folds into its cushion phase.
    BushyStart,
    /// Trunk length below which the pine starts emitting whorls.
    MinBranchSize,
    /// Thickness factor: a child's width is `w · q^e` (first child `w · q^e`,
    /// second `w · (1-q)^e` for bifurcating forms).
    Q,
    /// Thickness allometry exponent.
    E,
}

/// Largest admissible magnitude for a relative perturbation of a gene
/// value. Jitter and mutation fractions are clamped strictly inside
/// `(-1, 1)`: a perturbed value keeps its sign and stays finite no matter
/// how large the configured strength is.
pub(crate) const MAX_RELATIVE_PERTURBATION: f64 = 0.99;

type Template = &'static [(GeneKey, f64)];

// Five Honda parameter variants (the original's D/E/G/H/I trees).
const HONDA_TEMPLATES: [Template; 5] = [
    &[
        (GeneKey::R1, 0.60),
        (GeneKey::R2, 0.85),
        (GeneKey::Alpha1, 25.0),
        (GeneKey::Alpha2, -15.0),
        (GeneKey::Phi1, 180.0),
        (GeneKey::Phi2, 180.0),
        (GeneKey::Q, 0.45),
        (GeneKey::E, 0.50),
    ],
    &[
        (GeneKey::R1, 0.58),
        (GeneKey::R2, 0.83),
        (GeneKey::Alpha1, 30.0),
        (GeneKey::Alpha2, 15.0),
        (GeneKey::Phi1, 0.0),
        (GeneKey::Phi2, 180.0),
        (GeneKey::Q, 0.40),
        (GeneKey::E, 0.50),
    ],
    &[
        (GeneKey::R1, 0.80),
        (GeneKey::R2, 0.80),
        (GeneKey::Alpha1, 30.0),
        (GeneKey::Alpha2, -30.0),
        (GeneKey::Phi1, 137.0),
        (GeneKey::Phi2, 137.0),
        (GeneKey::Q, 0.50),
        (GeneKey::E, 0.50),
    ],
    &[
        (GeneKey::R1, 0.95),
        (GeneKey::R2, 0.80),
        (GeneKey::Alpha1, 5.0),
        (GeneKey::Alpha2, -30.0),
        (GeneKey::Phi1, -90.0),
        (GeneKey::Phi2, 90.0),
        (GeneKey::Q, 0.60),
        (GeneKey::E, 0.45),
    ],
    &[
        (GeneKey::R1, 0.55),
        (GeneKey::R2, 0.95),
        (GeneKey::Alpha1, -5.0),
        (GeneKey::Alpha2, 30.0),
        (GeneKey::Phi1, 137.0),
        (GeneKey::Phi2, 137.0),
        (GeneKey::Q, 0.40),
        (GeneKey::E, 0.00),
    ],
];

const SHRUB_TEMPLATES: [Template; 3] = [
    // Low, very broad cushion.
    &[
        (GeneKey::RHoriz, 0.80),
        (GeneKey::RBush, 0.60),
        (GeneKey::Alpha, 45.0),
        (GeneKey::Phi, 90.0),
        (GeneKey::NBushy, 2.0),
        (GeneKey::BushyStart, 0.30),
        (GeneKey::Q, 0.50),
        (GeneKey::E, 0.55),
    ],
    // Medium cushion.
    &[
        (GeneKey::RHoriz, 0.78),
        (GeneKey::RBush, 0.62),
        (GeneKey::Alpha, 35.0),
        (GeneKey::Phi, 90.0),
        (GeneKey::NBushy, 2.0),
        (GeneKey::BushyStart, 0.25),
        (GeneKey::Q, 0.48),
        (GeneKey::E, 0.55),
    ],
    // Tighter, slightly taller mound.
    &[
        (GeneKey::RHoriz, 0.75),
        (GeneKey::RBush, 0.58),
        (GeneKey::Alpha, 30.0),
        (GeneKey::Phi, 90.0),
        (GeneKey::NBushy, 3.0),
        (GeneKey::BushyStart, 0.28),
        (GeneKey::Q, 0.52),
        (GeneKey::E, 0.55),
    ],
];

const PINE_TEMPLATES: [Template; 3] = [
    &[
        (GeneKey::RTrunk, 0.75),
        (GeneKey::RBranch, 0.80),
        (GeneKey::Alpha, 80.0),
        (GeneKey::Phi, 110.0),
        (GeneKey::MinBranchSize, 0.40),
        (GeneKey::Q, 0.35),
        (GeneKey::E, 0.50),
    ],
    &[
        (GeneKey::RTrunk, 0.70),
        (GeneKey::RBranch, 0.78),
        (GeneKey::Alpha, 90.0),
        (GeneKey::Phi, 120.0),
        (GeneKey::MinBranchSize, 0.35),
        (GeneKey::Q, 0.32),
        (GeneKey::E, 0.50),
    ],
    &[
        (GeneKey::RTrunk, 0.78),
        (GeneKey::RBranch, 0.85),
        (GeneKey::Alpha, 75.0),
        (GeneKey::Phi, 105.0),
        (GeneKey::MinBranchSize, 0.45),
        (GeneKey::Q, 0.38),
        (GeneKey::E, 0.50),
    ],
];

const FERN_TEMPLATES: [Template; 1] = [&[
    (GeneKey::R1, 0.60),
    (GeneKey::Alpha1, 25.0),
    (GeneKey::Phi1, 50.0),
    (GeneKey::Q, 0.40),
    (GeneKey::E, 0.50),
]];

fn templates_for(species: Species) -> &'static [Template] {
    match species {
        Species::Honda => &HONDA_TEMPLATES,
        Species::Shrub => &SHRUB_TEMPLATES,
        Species::Pine => &PINE_TEMPLATES,
        Species::Fern => &FERN_TEMPLATES,
    }
}

/// Named numeric parameters controlling a species' branching geometry,
/// plus the immutable species tag they were drawn from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneSet {
    pub species: Species,
    values: BTreeMap<GeneKey, f64>,
}

impl GeneSet {
    /// Build a gene set from explicit key/value pairs.
    pub fn from_pairs(species: Species, pairs: &[(GeneKey, f64)]) -> Self {
        Self {
            species,
            values: pairs.iter().copied().collect(),
        }
    }

    /// Build a gene set from an already-assembled value map (used by the
    /// genetic algorithm when constructing children).
    pub fn from_values(species: Species, values: BTreeMap<GeneKey, f64>) -> Self {
        Self { species, values }
    }

    /// Sample a species' default template with a small uniform jitter
    /// applied to every value (`±jitter` as a fraction of the value).
    ///
    /// Species with several templates (the five Honda variants, three shrub
    /// and pine presets) pick one uniformly first.
    pub fn sample_defaults(species: Species, rng: &mut ForestRng, jitter: f64) -> Self {
        let templates = templates_for(species);
        let template = if templates.len() > 1 {
            templates[rng.range_usize(0, templates.len())]
        } else {
            templates[0]
        };
        let mut set = Self::from_pairs(species, template);
        if jitter > 0.0 {
            // Jitter in map-key order so the draw sequence is stable.
            for value in set.values.values_mut() {
                let f = rng
                    .range_f64(-jitter, jitter)
                    .clamp(-MAX_RELATIVE_PERTURBATION, MAX_RELATIVE_PERTURBATION);
                *value *= 1.0 + f;
            }
        }
        set
    }

    /// Read a gene value. The species' template guarantees which keys are
    /// present; asking for a key outside the template is a programming error.
    pub fn get(&self, key: GeneKey) -> f64 {
        self.values[&key]
    }

    /// The underlying value map, in stable key order.
    pub fn values(&self) -> &BTreeMap<GeneKey, f64> {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_species_has_a_template() {
        for species in Species::ALL {
            assert!(!templates_for(species).is_empty());
        }
    }

    #[test]
    fn all_template_values_are_finite() {
        for species in Species::ALL {
            for template in templates_for(species) {
                for (key, value) in template.iter() {
                    assert!(value.is_finite(), "{species}/{key:?} not finite");
                }
            }
        }
    }

    #[test]
    fn sample_defaults_without_jitter_matches_a_template() {
        let mut rng = ForestRng::new(7);
        let genes = GeneSet::sample_defaults(Species::Pine, &mut rng, 0.0);
        let matched = PINE_TEMPLATES
            .iter()
            .any(|t| GeneSet::from_pairs(Species::Pine, t) == genes);
        assert!(matched, "unjittered sample must equal one of the templates");
    }

    #[test]
    fn sample_defaults_jitter_is_bounded() {
        let mut rng = ForestRng::new(11);
        for _ in 0..100 {
            let genes = GeneSet::sample_defaults(Species::Fern, &mut rng, 0.05);
            let template = GeneSet::from_pairs(Species::Fern, FERN_TEMPLATES[0]);
            for (key, value) in genes.values() {
                let base = template.get(*key);
                assert!(
                    (value - base).abs() <= 0.05 * base.abs() + 1e-12,
                    "{key:?} jittered beyond bound: {value} vs {base}"
                );
            }
        }
    }

    #[test]
    fn extreme_jitter_keeps_defaults_finite_and_signed() {
        // A jitter fraction above 1 is clamped inside (-1, 1), so sampled
        // values never cross zero or go non-finite.
        let mut rng = ForestRng::new(19);
        for _ in 0..200 {
            for species in Species::ALL {
                let genes = GeneSet::sample_defaults(species, &mut rng, 5.0);
                for (key, value) in genes.values() {
                    assert!(value.is_finite(), "{species}/{key:?}: {value}");
                }
            }
            // Single-template species: the base sign is unambiguous.
            let template = GeneSet::from_pairs(Species::Fern, FERN_TEMPLATES[0]);
            let genes = GeneSet::sample_defaults(Species::Fern, &mut rng, 5.0);
            for (key, value) in genes.values() {
                let base = template.get(*key);
                assert!(
                    *value == 0.0 || value.signum() == base.signum(),
                    "{key:?} crossed zero: {value} from {base}"
                );
            }
        }
    }

    #[test]
    fn honda_variants_are_all_reachable() {
        let mut rng = ForestRng::new(2);
        let mut seen_r1 = std::collections::BTreeSet::new();
        for _ in 0..500 {
            let genes = GeneSet::sample_defaults(Species::Honda, &mut rng, 0.0);
            seen_r1.insert(genes.get(GeneKey::R1).to_bits());
        }
        assert_eq!(seen_r1.len(), HONDA_TEMPLATES.len());
    }

    #[test]
    fn serde_roundtrip() {
        let mut rng = ForestRng::new(1);
        let genes = GeneSet::sample_defaults(Species::Shrub, &mut rng, 0.05);
        let json = serde_json::to_string(&genes).unwrap();
        let restored: GeneSet = serde_json::from_str(&json).unwrap();
        assert_eq!(genes, restored);
    }
}
