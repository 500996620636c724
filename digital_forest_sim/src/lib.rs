// digital_forest_sim — pure Rust forest-ecology simulation library.
//
// This crate contains all simulation logic for Digital Forest: the bounded
// grid world, procedurally grown trees, the genetic algorithm, the PRNG,
// and the per-step ecology protocol. It has zero rendering dependencies
// and can be tested, benchmarked, and run headless.
//
// Module overview:
// - `forest.rs`:    Top-level Forest, the four-pass step loop, gene pools,
//                   event log, snapshot/resume.
// - `tree.rs`:      Tree lifecycle — symbolic growth, derived geometry,
//                   seasonal sunlight, the survival model.
// - `species.rs`:   Per-species axioms and rewrite rules (Honda, Shrub,
//                   Pine, Fern).
// - `symbol.rs`:    The growth-language symbol alphabet.
// - `turtle.rs`:    Stateless turtle interpreter — symbols to 3D skeletons.
// - `genes.rs`:     GeneSet, gene keys, per-species default templates.
// - `genetic.rs`:   Crossover + mutation breeding over gene pools.
// - `graveyard.rs`: Per-species records of the dead, per-species champions.
// - `analyser.rs`:  Read-only population and mortality statistics.
// - `event.rs`:     ForestEvent — narrative output drained by the driver.
// - `config.rs`:    ForestConfig — all tunable parameters, JSON-loadable.
// - `prng`:         Re-exported from `digital_forest_prng` — xoshiro256++
//                   PRNG with SplitMix64 seeding.
// - `types.rs`:     Species, DeathReason, Season, ChampionMetric.
//
// **Critical constraint: determinism.** The simulation is a pure function:
// `(state, seed) -> (new_state, events)`. All randomness comes from a
// seeded xoshiro256++ PRNG (re-exported from `digital_forest_prng`). No
// `HashMap`, no system time, no OS entropy. Use `BTreeMap` for ordered
// collections.

pub mod analyser;
pub mod config;
pub mod event;
pub mod forest;
pub mod genes;
pub mod genetic;
pub mod graveyard;
pub use digital_forest_prng as prng;
pub mod species;
pub mod symbol;
pub mod tree;
pub mod turtle;
pub mod types;
