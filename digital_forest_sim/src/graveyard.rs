// Graveyard and champions: the run's permanent record of the dead.
//
// The graveyard collects every tree that dies, grouped by species, keeping
// genes, final age, cause of death, and final size for later analysis
// (`analyser.rs`). Champions keeps the single best individual observed per
// species, ranked by the configured metric. Both collections are
// append-only and never consulted by the simulation itself.

use crate::genes::GeneSet;
use crate::tree::Tree;
use crate::types::{ChampionMetric, DeathReason, Species};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What outlives a tree: enough to analyse or re-seed from, without the
/// full symbol sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub genes: GeneSet,
    pub age: u32,
    pub death_reason: DeathReason,
    pub height: f64,
    pub width: f64,
}

impl TreeRecord {
    pub fn from_tree(tree: &Tree, reason: DeathReason) -> Self {
        Self {
            genes: tree.genes.clone(),
            age: tree.age,
            death_reason: reason,
            height: tree.height,
            width: tree.width,
        }
    }

    pub fn species(&self) -> Species {
        self.genes.species
    }
}

/// Every tree that ever died, grouped by species. Append-only.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Graveyard {
    tombs: BTreeMap<Species, Vec<TreeRecord>>,
}

impl Graveyard {
    pub fn collect(&mut self, record: TreeRecord) {
        self.tombs.entry(record.species()).or_default().push(record);
    }

    pub fn records(&self, species: Species) -> &[TreeRecord] {
        self.tombs.get(&species).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All species with at least one record, in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (Species, &[TreeRecord])> {
        self.tombs.iter().map(|(s, v)| (*s, v.as_slice()))
    }

    pub fn total(&self) -> usize {
        self.tombs.values().map(Vec::len).sum()
    }

    /// Records of one species, oldest-lived first.
    pub fn ranked_by_age(&self, species: Species) -> Vec<&TreeRecord> {
        let mut out: Vec<&TreeRecord> = self.records(species).iter().collect();
        out.sort_by(|a, b| b.age.cmp(&a.age));
        out
    }
}

/// Best individual observed per species across the run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Champions {
    metric: ChampionMetric,
    best: BTreeMap<Species, TreeRecord>,
}

impl Champions {
    pub fn new(metric: ChampionMetric) -> Self {
        Self {
            metric,
            best: BTreeMap::new(),
        }
    }

    fn score(&self, record: &TreeRecord) -> f64 {
        match self.metric {
            ChampionMetric::FinalAge => f64::from(record.age),
            ChampionMetric::Height => record.height,
        }
    }

    /// Consider a dead tree for its species' champion slot.
    pub fn observe(&mut self, record: TreeRecord) {
        let species = record.species();
        match self.best.get(&species) {
            Some(current) if self.score(current) >= self.score(&record) => {}
            _ => {
                self.best.insert(species, record);
            }
        }
    }

    pub fn champion(&self, species: Species) -> Option<&TreeRecord> {
        self.best.get(&species)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Species, &TreeRecord)> {
        self.best.iter().map(|(s, r)| (*s, r))
    }
}
