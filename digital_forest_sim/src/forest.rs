// The forest: a bounded grid of trees and the per-step ecology protocol.
//
// The grid is `(size + 2)²` cells of `Option<Tree>`, row-major, with a
// one-cell sentinel border that is never populated and never iterated.
// Neighbor-kernel lookups from any interior cell therefore never need a
// bounds check. Interior cells index `1..=size` on both axes.
//
// `step()` runs four ordered passes:
//   1. shadow    — write every live tree's sunlight into a scalar grid,
//                  convolve each tree's 3x3 neighborhood against the fixed
//                  kernel (corners 0.05, edges 0.10, center 0), store the
//                  result as the tree's `shadow`.
//   2. survival  — row-major over live trees: roll survival; losers move to
//                  the graveyard and the cell's last-known-state slot,
//                  winners grow under the current season.
//   3. spawn     — rebuild per-species gene pools from the survivors, then
//                  for each empty interior cell roll `spawn_probability`;
//                  winners that are no more shaded than the interior mean
//                  breed a child from a random species with a pool of at
//                  least two and plant it at age 1.
//   4. season    — advance the four-phase cycle every `season_length`
//                  generations.
//
// **Critical constraint: determinism.** Every pass traverses the grid
// row-major, gene pools are keyed by `BTreeMap`, and all randomness flows
// through the single owned `ForestRng`. Same config + seed, same forest,
// step for step. The whole struct (RNG state included) serializes, so a
// snapshot resumes exactly.
//
// See also: `tree.rs` for the survival model, `genetic.rs` for breeding,
// `event.rs` for the narrative output drivers poll with `drain_events`.

use crate::config::ForestConfig;
use crate::event::{ForestEvent, ForestEventKind};
use crate::genes::GeneSet;
use crate::genetic::GeneticAlgorithm;
use crate::graveyard::{Champions, Graveyard, TreeRecord};
use crate::tree::Tree;
use crate::types::{Season, Species};
use digital_forest_prng::ForestRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kernel weights for the 3x3 shadow convolution. The center cell does not
/// shade itself; a uniform neighborhood of value `v` convolves to `0.6·v`.
const KERNEL_CORNER: f64 = 0.05;
const KERNEL_EDGE: f64 = 0.10;

/// The simulation world. Owns all state; drivers call `step` and poll
/// events and cell contents between steps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Forest {
    config: ForestConfig,
    /// `(size+2)²` cells, row-major. Border cells are always `None`.
    grid: Vec<Option<Tree>>,
    /// Per-cell one-shot slot holding a tree's final pre-death snapshot.
    last_known: Vec<Option<Tree>>,
    /// Per-species breeding pools, rebuilt from survivors each spawn pass.
    gene_pools: BTreeMap<Species, Vec<GeneSet>>,
    graveyard: Graveyard,
    champions: Champions,
    events: Vec<ForestEvent>,
    rng: ForestRng,
    genetic: GeneticAlgorithm,
    season: Season,
    generation: u64,
}

impl Forest {
    /// Build a forest and run the initial spawn: each interior cell gets a
    /// tree with probability `initial_population`, of a species drawn
    /// uniformly from the configured list, with jittered default genes.
    pub fn new(config: ForestConfig, seed: u64) -> Self {
        let stride = config.size + 2;
        let cells = stride * stride;
        let genetic = GeneticAlgorithm::new(config.mutation_rate, config.mutation_strength);
        let mut forest = Self {
            champions: Champions::new(config.champion_metric),
            config,
            grid: vec![None; cells],
            last_known: vec![None; cells],
            gene_pools: BTreeMap::new(),
            graveyard: Graveyard::default(),
            events: Vec::new(),
            rng: ForestRng::new(seed),
            genetic,
            season: Season::CYCLE[0],
            generation: 0,
        };
        forest.initial_spawn();
        forest
    }

    fn stride(&self) -> usize {
        self.config.size + 2
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.stride() + col
    }

    fn initial_spawn(&mut self) {
        if self.config.species.is_empty() {
            return;
        }
        let size = self.config.size;
        for row in 1..=size {
            for col in 1..=size {
                if !self.rng.random_bool(self.config.initial_population) {
                    continue;
                }
                let pick = self.rng.range_usize(0, self.config.species.len());
                let species = self.config.species[pick];
                let genes = GeneSet::sample_defaults(
                    species,
                    &mut self.rng,
                    self.config.default_gene_jitter,
                );
                self.plant(row, col, Tree::new(genes, self.season));
            }
        }
    }

    /// Place a tree at an interior cell, replacing whatever was there, and
    /// record the spawn event. Exposed so drivers can pre-seed scenarios.
    pub fn plant(&mut self, row: usize, col: usize, tree: Tree) {
        debug_assert!(row >= 1 && row <= self.config.size);
        debug_assert!(col >= 1 && col <= self.config.size);
        let species = tree.genes.species;
        let idx = self.index(row, col);
        self.grid[idx] = Some(tree);
        self.push_event(ForestEventKind::TreeSpawned { row, col, species });
    }

    /// Advance the simulation by one generation.
    pub fn step(&mut self) {
        self.generation += 1;
        self.update_shadows();
        self.death_or_growth();
        self.spawn_new_trees();
        self.advance_season();
    }

    // -- pass 1: shadow ----------------------------------------------------

    /// Current sunlight of every cell; empty cells contribute 0.
    fn sunlight_grid(&self) -> Vec<f64> {
        let mut sun = vec![0.0; self.grid.len()];
        for (idx, cell) in self.grid.iter().enumerate() {
            if let Some(tree) = cell {
                sun[idx] = tree.sunlight;
            }
        }
        sun
    }

    /// Convolve the sunlight grid against the shadow kernel for every
    /// interior cell. The border guarantees all eight lookups are in range.
    fn convolved_shade(&self) -> Vec<f64> {
        let sun = self.sunlight_grid();
        let stride = self.stride();
        let mut shade = vec![0.0; sun.len()];
        for row in 1..=self.config.size {
            for col in 1..=self.config.size {
                let idx = row * stride + col;
                let corners = sun[idx - stride - 1]
                    + sun[idx - stride + 1]
                    + sun[idx + stride - 1]
                    + sun[idx + stride + 1];
                let edges =
                    sun[idx - stride] + sun[idx + stride] + sun[idx - 1] + sun[idx + 1];
                shade[idx] = KERNEL_CORNER * corners + KERNEL_EDGE * edges;
            }
        }
        shade
    }

    fn update_shadows(&mut self) {
        let shade = self.convolved_shade();
        for (idx, cell) in self.grid.iter_mut().enumerate() {
            if let Some(tree) = cell.as_mut() {
                tree.shadow = shade[idx];
            }
        }
    }

    // -- pass 2: survival / growth -----------------------------------------

    fn death_or_growth(&mut self) {
        let size = self.config.size;
        for row in 1..=size {
            for col in 1..=size {
                let idx = self.index(row, col);
                let Some(mut tree) = self.grid[idx].take() else {
                    continue;
                };
                match tree.survival_roll(&self.config.survival, &mut self.rng) {
                    Some(reason) => {
                        tree.death_reason = Some(reason);
                        let record = TreeRecord::from_tree(&tree, reason);
                        self.push_event(ForestEventKind::TreeDied {
                            row,
                            col,
                            species: tree.genes.species,
                            reason,
                            age: tree.age,
                        });
                        self.champions.observe(record.clone());
                        self.graveyard.collect(record);
                        self.last_known[idx] = Some(tree);
                    }
                    None => {
                        tree.grow(self.season, self.config.growth_cutoff_age);
                        self.grid[idx] = Some(tree);
                    }
                }
            }
        }
    }

    // -- pass 3: reproduction ----------------------------------------------

    fn rebuild_gene_pools(&mut self) {
        self.gene_pools.clear();
        for cell in self.grid.iter().flatten() {
            self.gene_pools
                .entry(cell.genes.species)
                .or_default()
                .push(cell.genes.clone());
        }
    }

    fn spawn_new_trees(&mut self) {
        self.rebuild_gene_pools();

        // Species with at least two living members, in config order.
        let breedable: Vec<Species> = self
            .config
            .species
            .iter()
            .copied()
            .filter(|s| self.gene_pools.get(s).is_some_and(|p| p.len() >= 2))
            .collect();

        // Shade of the post-survival canopy; fixed for the whole pass so
        // trees planted this step do not shade later candidate cells.
        let shade = self.convolved_shade();
        let size = self.config.size;
        let interior = (size * size) as f64;
        let mean_shade: f64 = shade.iter().sum::<f64>() / interior;

        for row in 1..=size {
            for col in 1..=size {
                let idx = self.index(row, col);
                if self.grid[idx].is_some() {
                    continue;
                }
                if !self.rng.random_bool(self.config.spawn_probability) {
                    continue;
                }
                if shade[idx] > mean_shade {
                    continue;
                }
                if breedable.is_empty() {
                    self.push_event(ForestEventKind::ReproductionSkipped { row, col });
                    continue;
                }
                let species = breedable[self.rng.range_usize(0, breedable.len())];
                // The pool has >= 2 members, so breeding cannot fail.
                let Some(genes) = self
                    .genetic
                    .breed(&self.gene_pools[&species], &mut self.rng)
                else {
                    continue;
                };
                let tree = Tree::new(genes, self.season);
                self.grid[idx] = Some(tree);
                self.push_event(ForestEventKind::TreeSpawned { row, col, species });
            }
        }
    }

    // -- pass 4: season ----------------------------------------------------

    fn advance_season(&mut self) {
        if self.config.season_length == 0 || self.generation % self.config.season_length != 0 {
            return;
        }
        let at = Season::CYCLE
            .iter()
            .position(|s| *s == self.season)
            .unwrap_or(0);
        self.season = Season::CYCLE[(at + 1) % Season::CYCLE.len()];
        self.push_event(ForestEventKind::SeasonChanged {
            season: self.season,
        });
    }

    fn push_event(&mut self, kind: ForestEventKind) {
        self.events.push(ForestEvent {
            generation: self.generation,
            kind,
        });
    }

    // -- external interface ------------------------------------------------

    /// One-shot pop of a cell's final pre-death snapshot. Returns the dead
    /// tree the first time it is asked after the death, `None` after.
    pub fn reached_termination(&mut self, row: usize, col: usize) -> Option<Tree> {
        let idx = self.index(row, col);
        self.last_known[idx].take()
    }

    /// Take all events accumulated since the last drain.
    pub fn drain_events(&mut self) -> Vec<ForestEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn tree_at(&self, row: usize, col: usize) -> Option<&Tree> {
        self.grid[self.index(row, col)].as_ref()
    }

    /// All live trees with their interior coordinates, row-major.
    pub fn trees(&self) -> impl Iterator<Item = (usize, usize, &Tree)> {
        let stride = self.stride();
        self.grid.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref().map(|tree| (idx / stride, idx % stride, tree))
        })
    }

    pub fn population(&self) -> usize {
        self.grid.iter().flatten().count()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn season(&self) -> Season {
        self.season
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn graveyard(&self) -> &Graveyard {
        &self.graveyard
    }

    pub fn champions(&self) -> &Champions {
        &self.champions
    }

    pub fn gene_pool(&self, species: Species) -> &[GeneSet] {
        self.gene_pools
            .get(&species)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Snapshot the entire forest, RNG state included.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Restore a forest from `to_json` output. The restored forest replays
    /// identically to the original from the snapshot point.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
