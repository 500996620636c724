// Per-species rewrite rules and axioms.
//
// Each species is a pure function: one growth symbol in, a short replacement
// sequence out, parameterized by an immutable gene set. Dispatch is a single
// match on the `Species` enum — the set of species is closed, so a gene set
// referencing an unregistered rule cannot exist.
//
// Every rule shares the same skeleton: a branch symbol of length `s` and
// width `w` expands into a set-width command, a forward move, and zero or
// more bracketed sub-branches (push, yaw/roll from genes, a smaller branch
// symbol, pop). Child lengths scale by a gene ratio; child widths follow the
// allometric pair `(q, e)`. Any symbol a rule does not recognize — all
// command symbols, plus branch tags of other species — passes through
// unchanged, which is what keeps commands terminal.
//
// See also: `genes.rs` for the templates each rule reads, `symbol.rs` for
// the growth language, `tree.rs` for the grow step that applies the rule to
// a whole sequence.

use crate::genes::{GeneKey, GeneSet};
use crate::symbol::{BranchTag, Symbol};
use crate::types::Species;
use smallvec::{SmallVec, smallvec};

/// Replacement sequence for one symbol. Expansions are short (at most a
/// dozen or so symbols), so they stay on the stack.
pub type Expansion = SmallVec<[Symbol; 16]>;

/// Twig cutoff: branch segments shorter than this stop subdividing and
/// terminate as a bare forward move.
const TWIG_LEN: f64 = 0.05;

impl Species {
    /// The frozen starting sequence for a newly spawned tree.
    pub fn axiom(self) -> Vec<Symbol> {
        let (tag, len, width) = match self {
            Species::Honda => (BranchTag::Apex, 0.7, 0.3),
            Species::Shrub => (BranchTag::Runner, 0.5, 0.25),
            Species::Pine => (BranchTag::Trunk, 1.5, 0.25),
            Species::Fern => (BranchTag::Apex, 0.6, 0.1),
        };
        vec![Symbol::Branch { tag, len, width }]
    }

    /// Expand one symbol for one growth step.
    pub fn expand(self, sym: Symbol, genes: &GeneSet) -> Expansion {
        match self {
            Species::Honda => honda_rule(sym, genes),
            Species::Shrub => shrub_rule(sym, genes),
            Species::Pine => pine_rule(sym, genes),
            Species::Fern => fern_rule(sym, genes),
        }
    }
}

/// Classic Honda bifurcation: two sub-branches per apex, each with its own
/// length ratio, yaw, and roll. Widths split the parent allometrically:
/// `w·q^e` and `w·(1-q)^e`.
fn honda_rule(sym: Symbol, genes: &GeneSet) -> Expansion {
    let Symbol::Branch { tag: BranchTag::Apex, len: s, width: w } = sym else {
        return smallvec![sym];
    };
    // The thickness split is a proportion; a gene that drifted past the
    // unit interval would put `1 - q` under a fractional exponent.
    let q = genes.get(GeneKey::Q).clamp(0.0, 1.0);
    let e = genes.get(GeneKey::E);
    let w1 = w * q.powf(e);
    let w2 = w * (1.0 - q).powf(e);
    smallvec![
        Symbol::SetWidth(w),
        Symbol::Forward(s),
        Symbol::Push,
        Symbol::Yaw(genes.get(GeneKey::Alpha1)),
        Symbol::Roll(genes.get(GeneKey::Phi1)),
        Symbol::Branch {
            tag: BranchTag::Apex,
            len: s * genes.get(GeneKey::R1),
            width: w1,
        },
        Symbol::Pop,
        Symbol::Push,
        Symbol::Yaw(genes.get(GeneKey::Alpha2)),
        Symbol::Roll(genes.get(GeneKey::Phi2)),
        Symbol::Branch {
            tag: BranchTag::Apex,
            len: s * genes.get(GeneKey::R2),
            width: w2,
        },
        Symbol::Pop,
    ]
}

/// Wide-first shrub. Horizontal runners split left/right until their length
/// drops below `BushyStart`, then the node converts to a cushion shoot that
/// fills the local area with short radial branches.
fn shrub_rule(sym: Symbol, genes: &GeneSet) -> Expansion {
    let q = genes.get(GeneKey::Q);
    let e = genes.get(GeneKey::E);
    match sym {
        Symbol::Branch { tag: BranchTag::Runner, len: s, width: w } => {
            let w_next = w * q.powf(e);
            let mut out: Expansion = smallvec![
                Symbol::SetWidth(w),
                // Tilt the runner toward horizontal before moving.
                Symbol::Yaw(90.0),
                Symbol::Roll(genes.get(GeneKey::Phi)),
                Symbol::Forward(s),
            ];
            if s > genes.get(GeneKey::BushyStart) {
                // Keep sending out two opposite runners.
                let alpha = genes.get(GeneKey::Alpha);
                for sign in [1.0, -1.0] {
                    out.push(Symbol::Push);
                    out.push(Symbol::Yaw(sign * alpha));
                    out.push(Symbol::Branch {
                        tag: BranchTag::Runner,
                        len: s * genes.get(GeneKey::RHoriz),
                        width: w_next,
                    });
                    out.push(Symbol::Pop);
                }
            } else {
                // Convert to the cushion phase.
                out.push(Symbol::Branch {
                    tag: BranchTag::Shoot,
                    len: s * genes.get(GeneKey::RBush),
                    width: w_next,
                });
            }
            out
        }
        Symbol::Branch { tag: BranchTag::Shoot, len: s, width: w } => {
            if s < TWIG_LEN {
                return smallvec![Symbol::SetWidth(w), Symbol::Forward(s)];
            }
            let w_next = w * q.powf(e);
            let n_bushy = (genes.get(GeneKey::NBushy).floor() as usize).max(1);
            let yaw_step = 360.0 / n_bushy as f64;
            let mut out: Expansion = smallvec![Symbol::SetWidth(w), Symbol::Forward(s * 0.6)];
            // Spread the shoots radially, equally spaced in yaw.
            for i in 0..n_bushy {
                out.push(Symbol::Push);
                out.push(Symbol::Yaw(i as f64 * yaw_step));
                out.push(Symbol::Roll(60.0));
                out.push(Symbol::Branch {
                    tag: BranchTag::Shoot,
                    len: s * genes.get(GeneKey::RBush),
                    width: w_next,
                });
                out.push(Symbol::Pop);
            }
            out
        }
        other => smallvec![other],
    }
}

/// Conifer: a single continuing trunk that starts emitting paired lateral
/// whorls once the trunk segment narrows past `MinBranchSize`. Whorl
/// branches are longer than the trunk segment that bears them.
fn pine_rule(sym: Symbol, genes: &GeneSet) -> Expansion {
    let q = genes.get(GeneKey::Q);
    let e = genes.get(GeneKey::E);
    match sym {
        Symbol::Branch { tag: BranchTag::Trunk, len: s, width: w } => {
            let w_next = w * q.powf(e);
            let mut out: Expansion = smallvec![Symbol::SetWidth(w), Symbol::Forward(s)];
            if s > genes.get(GeneKey::MinBranchSize) {
                // Still climbing.
                out.push(Symbol::Branch {
                    tag: BranchTag::Trunk,
                    len: s * genes.get(GeneKey::RTrunk),
                    width: w_next,
                });
            } else {
                // Whorl pair, longer than the trunk segment.
                let s_branch = s / genes.get(GeneKey::RBranch);
                let alpha = genes.get(GeneKey::Alpha);
                let phi = genes.get(GeneKey::Phi);
                for sign in [1.0, -1.0] {
                    out.push(Symbol::Push);
                    out.push(Symbol::Yaw(sign * alpha));
                    out.push(Symbol::Roll(phi));
                    out.push(Symbol::Branch {
                        tag: BranchTag::Shoot,
                        len: s_branch,
                        width: w_next,
                    });
                    out.push(Symbol::Pop);
                }
                out.push(Symbol::Branch {
                    tag: BranchTag::Trunk,
                    len: s * genes.get(GeneKey::RTrunk),
                    width: w_next,
                });
            }
            out
        }
        Symbol::Branch { tag: BranchTag::Shoot, len: s, width: w } => {
            if s < TWIG_LEN {
                return smallvec![Symbol::SetWidth(w), Symbol::Forward(s)];
            }
            let w_next = w * q.powf(e);
            let r_b = genes.get(GeneKey::RBranch);
            // Grow straight once, then fork.
            smallvec![
                Symbol::SetWidth(w),
                Symbol::Forward(s),
                Symbol::Branch {
                    tag: BranchTag::Shoot,
                    len: s * r_b,
                    width: w_next,
                },
                Symbol::Push,
                Symbol::Yaw(25.0),
                Symbol::Branch {
                    tag: BranchTag::Shoot,
                    len: s * r_b,
                    width: w_next,
                },
                Symbol::Pop,
                Symbol::Push,
                Symbol::Yaw(-25.0),
                Symbol::Branch {
                    tag: BranchTag::Shoot,
                    len: s * r_b,
                    width: w_next,
                },
                Symbol::Pop,
            ]
        }
        other => smallvec![other],
    }
}

/// Fern: three forward segments per expansion with a mirrored bracketed
/// frond after each of the first two.
fn fern_rule(sym: Symbol, genes: &GeneSet) -> Expansion {
    let Symbol::Branch { tag: BranchTag::Apex, len: s, width: w } = sym else {
        return smallvec![sym];
    };
    let q = genes.get(GeneKey::Q);
    let e = genes.get(GeneKey::E);
    let r = genes.get(GeneKey::R1);
    let alpha = genes.get(GeneKey::Alpha1);
    let phi = genes.get(GeneKey::Phi1);
    let w_new = w * q.powf(e);
    smallvec![
        Symbol::SetWidth(w),
        Symbol::Forward(s),
        Symbol::Push,
        Symbol::Yaw(alpha),
        Symbol::Roll(phi),
        Symbol::Branch { tag: BranchTag::Apex, len: s * r, width: w_new },
        Symbol::Pop,
        Symbol::Forward(s),
        Symbol::Push,
        Symbol::Yaw(-alpha),
        Symbol::Roll(-phi),
        Symbol::Branch { tag: BranchTag::Apex, len: s * r, width: w_new },
        Symbol::Pop,
        Symbol::Forward(s),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use digital_forest_prng::ForestRng;

    fn defaults(species: Species) -> GeneSet {
        let mut rng = ForestRng::new(0);
        GeneSet::sample_defaults(species, &mut rng, 0.0)
    }

    #[test]
    fn command_symbols_are_terminal_for_every_species() {
        let commands = [
            Symbol::Forward(1.0),
            Symbol::Yaw(30.0),
            Symbol::Roll(-60.0),
            Symbol::SetWidth(0.2),
            Symbol::Push,
            Symbol::Pop,
        ];
        for species in Species::ALL {
            let genes = defaults(species);
            for cmd in commands {
                let out = species.expand(cmd, &genes);
                assert_eq!(out.as_slice(), &[cmd], "{species} rewrote a command");
            }
        }
    }

    #[test]
    fn foreign_branch_tags_pass_through() {
        // Honda only expands Apex; a Trunk symbol must survive unchanged.
        let genes = defaults(Species::Honda);
        let foreign = Symbol::Branch {
            tag: BranchTag::Trunk,
            len: 1.0,
            width: 0.2,
        };
        assert_eq!(Species::Honda.expand(foreign, &genes).as_slice(), &[foreign]);
    }

    #[test]
    fn honda_expansion_bifurcates() {
        let genes = defaults(Species::Honda);
        let axiom = Species::Honda.axiom();
        let out = Species::Honda.expand(axiom[0], &genes);

        let pushes = out.iter().filter(|s| **s == Symbol::Push).count();
        let pops = out.iter().filter(|s| **s == Symbol::Pop).count();
        let branches = out
            .iter()
            .filter(|s| matches!(s, Symbol::Branch { .. }))
            .count();
        assert_eq!(pushes, 2);
        assert_eq!(pops, 2);
        assert_eq!(branches, 2);
        // Expansion starts by committing width then moving.
        assert!(matches!(out[0], Symbol::SetWidth(_)));
        assert!(matches!(out[1], Symbol::Forward(_)));
    }

    #[test]
    fn honda_child_widths_follow_allometry() {
        let genes = defaults(Species::Honda);
        let out = Species::Honda.expand(
            Symbol::Branch {
                tag: BranchTag::Apex,
                len: 1.0,
                width: 0.2,
            },
            &genes,
        );
        let q = genes.get(GeneKey::Q);
        let e = genes.get(GeneKey::E);
        let widths: Vec<f64> = out
            .iter()
            .filter_map(|s| match s {
                Symbol::Branch { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        assert_eq!(widths.len(), 2);
        assert!((widths[0] - 0.2 * q.powf(e)).abs() < 1e-12);
        assert!((widths[1] - 0.2 * (1.0 - q).powf(e)).abs() < 1e-12);
    }

    #[test]
    fn honda_widths_stay_finite_when_q_drifts_past_one() {
        let mut genes = defaults(Species::Honda)
            .values()
            .iter()
            .map(|(k, v)| (*k, *v))
            .collect::<Vec<_>>();
        for (key, value) in &mut genes {
            if *key == GeneKey::Q {
                *value = 1.2;
            }
        }
        let genes = GeneSet::from_pairs(Species::Honda, &genes);
        let out = Species::Honda.expand(
            Symbol::Branch {
                tag: BranchTag::Apex,
                len: 1.0,
                width: 0.2,
            },
            &genes,
        );
        for sym in &out {
            if let Symbol::Branch { len, width, .. } = sym {
                assert!(len.is_finite() && width.is_finite(), "{sym:?}");
                assert!(*width >= 0.0);
            }
        }
    }

    #[test]
    fn shrub_converts_to_cushion_below_threshold() {
        let genes = defaults(Species::Shrub);
        let threshold = genes.get(GeneKey::BushyStart);

        // Long runner keeps producing runners.
        let long = Species::Shrub.expand(
            Symbol::Branch {
                tag: BranchTag::Runner,
                len: threshold + 0.1,
                width: 0.2,
            },
            &genes,
        );
        assert!(long.iter().any(|s| matches!(
            s,
            Symbol::Branch { tag: BranchTag::Runner, .. }
        )));

        // Short runner folds into a cushion shoot.
        let short = Species::Shrub.expand(
            Symbol::Branch {
                tag: BranchTag::Runner,
                len: threshold - 0.1,
                width: 0.2,
            },
            &genes,
        );
        assert!(short.iter().any(|s| matches!(
            s,
            Symbol::Branch { tag: BranchTag::Shoot, .. }
        )));
        assert!(!short.iter().any(|s| matches!(
            s,
            Symbol::Branch { tag: BranchTag::Runner, .. }
        )));
    }

    #[test]
    fn shrub_cushion_is_radial() {
        let genes = defaults(Species::Shrub);
        let n_bushy = genes.get(GeneKey::NBushy).floor() as usize;
        let out = Species::Shrub.expand(
            Symbol::Branch {
                tag: BranchTag::Shoot,
                len: 0.2,
                width: 0.1,
            },
            &genes,
        );
        let shoots = out
            .iter()
            .filter(|s| matches!(s, Symbol::Branch { tag: BranchTag::Shoot, .. }))
            .count();
        assert_eq!(shoots, n_bushy);
    }

    #[test]
    fn pine_trunk_continues_until_narrow_then_whorls() {
        let genes = defaults(Species::Pine);
        let min = genes.get(GeneKey::MinBranchSize);

        let climbing = Species::Pine.expand(
            Symbol::Branch {
                tag: BranchTag::Trunk,
                len: min + 0.5,
                width: 0.25,
            },
            &genes,
        );
        // Still climbing: exactly one branch symbol, the continuing trunk.
        assert_eq!(
            climbing
                .iter()
                .filter(|s| matches!(s, Symbol::Branch { .. }))
                .count(),
            1
        );

        let whorling = Species::Pine.expand(
            Symbol::Branch {
                tag: BranchTag::Trunk,
                len: min - 0.05,
                width: 0.25,
            },
            &genes,
        );
        // Two whorl shoots plus the continuing trunk.
        let shoots = whorling
            .iter()
            .filter(|s| matches!(s, Symbol::Branch { tag: BranchTag::Shoot, .. }))
            .count();
        let trunks = whorling
            .iter()
            .filter(|s| matches!(s, Symbol::Branch { tag: BranchTag::Trunk, .. }))
            .count();
        assert_eq!(shoots, 2);
        assert_eq!(trunks, 1);
    }

    #[test]
    fn tiny_twigs_terminate() {
        let shrub = defaults(Species::Shrub);
        let pine = defaults(Species::Pine);
        let twig = |tag| Symbol::Branch {
            tag,
            len: TWIG_LEN / 2.0,
            width: 0.01,
        };
        for (species, genes) in [(Species::Shrub, &shrub), (Species::Pine, &pine)] {
            let out = species.expand(twig(BranchTag::Shoot), genes);
            assert!(
                !out.iter().any(|s| matches!(s, Symbol::Branch { .. })),
                "{species} twig should stop subdividing"
            );
        }
    }

    #[test]
    fn fern_emits_three_forward_segments() {
        let genes = defaults(Species::Fern);
        let axiom = Species::Fern.axiom();
        let out = Species::Fern.expand(axiom[0], &genes);
        let forwards = out
            .iter()
            .filter(|s| matches!(s, Symbol::Forward(_)))
            .count();
        assert_eq!(forwards, 3);
        // Mirrored fronds: the two yaws negate each other.
        let yaws: Vec<f64> = out
            .iter()
            .filter_map(|s| match s {
                Symbol::Yaw(a) => Some(*a),
                _ => None,
            })
            .collect();
        assert_eq!(yaws.len(), 2);
        assert!((yaws[0] + yaws[1]).abs() < 1e-12);
    }
}
