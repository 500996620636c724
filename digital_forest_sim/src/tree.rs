// A single tree: genes, symbolic growth state, derived geometry, and
// ecological state.
//
// Lifecycle: spawned at age 1 with its species' frozen axiom; while age is
// at or below the growth cutoff, each `grow` call rewrites every symbol via
// the species rule, re-derives geometry through the turtle interpreter, and
// recomputes the season-weighted sunlight intake. Past the cutoff the
// symbolic state freezes but age keeps advancing. A tree leaves the grid
// when `survival_roll` returns a death reason; the `Forest` then stamps
// `death_reason` and moves the snapshot to the graveyard and the cell's
// last-known-state slot.
//
// `shadow` is written onto the tree by the forest's shadow pass before the
// survival pass reads it — a tree never computes its own shading.
//
// See also: `species.rs` for the rewrite rules, `turtle.rs` for geometry,
// `forest.rs` for the per-step protocol, `config.rs` for `SurvivalParams`.

use crate::config::SurvivalParams;
use crate::genes::GeneSet;
use crate::symbol::Symbol;
use crate::turtle;
use crate::types::{DeathReason, Season};
use digital_forest_prng::ForestRng;
use serde::{Deserialize, Serialize};

/// One organism on the grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tree {
    /// Immutable once assigned; only the genetic algorithm or default
    /// sampling produce new gene sets.
    pub genes: GeneSet,
    /// Current growth-state sequence, replaced wholesale each growth step.
    pub lsystem: Vec<Symbol>,
    /// Generations lived. Starts at 1, never decreases.
    pub age: u32,
    /// Vertical extent of the current skeleton.
    pub height: f64,
    /// Larger horizontal extent of the current skeleton.
    pub width: f64,
    /// Season-weighted fitness, recomputed on each growth step.
    pub sunlight: f64,
    /// Convolved neighborhood shading, written by the forest's shadow pass.
    pub shadow: f64,
    /// Size-derived threshold from the most recent survival roll.
    pub survival_requirement: f64,
    /// Set if and only if the tree has left the grid.
    pub death_reason: Option<DeathReason>,
}

impl Tree {
    /// Spawn a tree from a gene set: age 1, the species' axiom, and
    /// geometry/sunlight derived from that axiom under the current season.
    pub fn new(genes: GeneSet, season: Season) -> Self {
        let lsystem = genes.species.axiom();
        let mut tree = Self {
            genes,
            lsystem,
            age: 1,
            height: 0.0,
            width: 0.0,
            sunlight: 0.0,
            shadow: 0.0,
            survival_requirement: 0.0,
            death_reason: None,
        };
        tree.refresh_derived(season);
        tree
    }

    /// The current skeleton, as a renderer would consume it.
    pub fn skeleton(&self) -> turtle::TreeSkeleton {
        turtle::realize(&self.lsystem)
    }

    /// One growth step. Symbolic growth, geometry, and sunlight update only
    /// while age is at or below `cutoff_age`; age advances regardless.
    pub fn grow(&mut self, season: Season, cutoff_age: u32) {
        if self.age <= cutoff_age {
            let mut grown = Vec::with_capacity(self.lsystem.len() * 4);
            for sym in &self.lsystem {
                grown.extend(self.genes.species.expand(*sym, &self.genes));
            }
            self.lsystem = grown;
            self.refresh_derived(season);
        }
        self.age += 1;
    }

    /// Derive geometry and sunlight from the current symbol sequence.
    fn refresh_derived(&mut self, season: Season) {
        let skeleton = self.skeleton();
        self.height = skeleton.height();
        self.width = skeleton.width();
        self.sunlight = self.sunlight_intake(season);
    }

    /// Season-weighted fitness `alpha·h + beta·w + gamma·sqrt(h·w)`.
    fn sunlight_intake(&self, season: Season) -> f64 {
        let (alpha, beta, gamma) = season.sunlight_weights();
        alpha * self.height + beta * self.width + gamma * (self.height * self.width).sqrt()
    }

    /// Decide whether the tree lives through this step.
    ///
    /// Two checks, in order:
    /// 1. Size: `survival_requirement = size_cost · (h·w²)² + shadow`; the
    ///    tree dies of `Size` when its sunlight no longer meets it. No RNG.
    /// 2. Mortality roll: one uniform draw against
    ///    `age_term + shade_term`, where `age_term = (age / scale)²` and
    ///    `shade_term = shade_mortality · shadow / (sunlight + 1)`. The
    ///    larger term names the cause (`Age` or `Shadow`).
    ///
    /// Returns `Some(reason)` on death. The caller stamps `death_reason`
    /// when it removes the tree from the grid.
    pub fn survival_roll(
        &mut self,
        params: &SurvivalParams,
        rng: &mut ForestRng,
    ) -> Option<DeathReason> {
        let volume = self.height * self.width * self.width;
        self.survival_requirement = params.size_cost * volume * volume + self.shadow;

        if self.sunlight < self.survival_requirement {
            return Some(DeathReason::Size);
        }

        let age_term = (f64::from(self.age) / params.age_mortality_scale).powi(2);
        let shade_term = params.shade_mortality * self.shadow / (self.sunlight + 1.0);
        if rng.next_f64() < age_term + shade_term {
            Some(if shade_term > age_term {
                DeathReason::Shadow
            } else {
                DeathReason::Age
            })
        } else {
            None
        }
    }
}
