// Turtle interpreter: growth-state sequence → 3-D line skeleton.
//
// A cursor transform (4×4 homogeneous matrix) walks the symbol sequence.
// `Forward` advances along the cursor's local up axis and appends a point,
// an edge to the previous point, and the current width as that point's
// radius. `Yaw`/`Roll` rotate the local frame; angles arrive in degrees and
// are converted here. `Push`/`Pop` save and restore (transform, width) on an
// explicit stack, and `Pop` additionally rewinds the current point index, so
// sibling branches share their fork point. Points live in an append-only
// arena addressed by index — the skeleton is edges over indices, never
// references.
//
// Branch symbols (and anything else the interpreter does not execute) are
// ignored, which keeps the growth language forward-compatible. The whole
// pass is deterministic: no randomness, no external state.
//
// See also: `symbol.rs` for the language, `tree.rs` which derives height and
// width from the skeleton each growth step.

use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};

type Mat4 = [[f64; 4]; 4];

const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn mat_mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0; 4]; 4];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..4).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Rotation about one local axis. The rotation plane is spanned by the two
/// axes following `axis` cyclically (axis 1 rotates the 2–0 plane, etc.).
fn rotation_matrix(angle_rad: f64, axis: usize) -> Mat4 {
    let (i1, i2) = ((axis + 1) % 3, (axis + 2) % 3);
    let (sin, cos) = angle_rad.sin_cos();
    let mut m = IDENTITY;
    m[i1][i1] = cos;
    m[i1][i2] = -sin;
    m[i2][i1] = sin;
    m[i2][i2] = cos;
    m
}

fn translation_matrix(v: [f64; 3]) -> Mat4 {
    let mut m = IDENTITY;
    m[0][3] = v[0];
    m[1][3] = v[1];
    m[2][3] = v[2];
    m
}

/// The cursor: local frame + current segment width.
struct Turtle {
    t: Mat4,
    width: f64,
    stack: Vec<(Mat4, f64)>,
}

impl Turtle {
    fn new(width: f64) -> Self {
        Self {
            t: IDENTITY,
            width,
            stack: Vec::new(),
        }
    }

    /// Advance along the local up (+Y) axis.
    fn forward(&mut self, d: f64) {
        self.t = mat_mul(&self.t, &translation_matrix([0.0, d, 0.0]));
    }

    /// Rotate about the local vertical axis.
    fn yaw(&mut self, deg: f64) {
        self.t = mat_mul(&self.t, &rotation_matrix(deg.to_radians(), 1));
    }

    /// Rotate about the local depth axis.
    fn roll(&mut self, deg: f64) {
        self.t = mat_mul(&self.t, &rotation_matrix(deg.to_radians(), 0));
    }

    fn push(&mut self) {
        self.stack.push((self.t, self.width));
    }

    fn pop(&mut self) {
        // A pop without a matching push is a malformed sequence; treat it as
        // a no-op rather than failing mid-interpretation.
        if let Some((t, width)) = self.stack.pop() {
            self.t = t;
            self.width = width;
        }
    }

    fn position(&self) -> [f64; 3] {
        [self.t[0][3], self.t[1][3], self.t[2][3]]
    }
}

/// A tree-shaped line skeleton rooted at point 0.
///
/// This is the sole geometry contract a renderer needs: ordered points,
/// (child, parent) edges, and a radius per point.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSkeleton {
    pub points: Vec<[f64; 3]>,
    /// `(child, parent)` index pairs into `points`.
    pub edges: Vec<(usize, usize)>,
    /// Segment radius at each point, parallel to `points`.
    pub radii: Vec<f64>,
}

impl TreeSkeleton {
    /// Extent of the skeleton along the vertical (Y) axis. Zero for
    /// degenerate geometry.
    pub fn height(&self) -> f64 {
        extent(self.points.iter().map(|p| p[1]))
    }

    /// The larger of the two horizontal-plane extents. Zero for degenerate
    /// geometry.
    pub fn width(&self) -> f64 {
        let x = extent(self.points.iter().map(|p| p[0]));
        let z = extent(self.points.iter().map(|p| p[2]));
        x.max(z)
    }
}

fn extent(values: impl Iterator<Item = f64>) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut any = false;
    for v in values {
        min = min.min(v);
        max = max.max(v);
        any = true;
    }
    if any { max - min } else { 0.0 }
}

/// The root point's radius before the first `SetWidth`: the width of the
/// first branch symbol if any, else the first explicit width command.
fn initial_width(symbols: &[Symbol]) -> f64 {
    symbols
        .iter()
        .find_map(|s| match s {
            Symbol::Branch { width, .. } => Some(*width),
            Symbol::SetWidth(w) => Some(*w),
            _ => None,
        })
        .unwrap_or(0.0)
}

/// Interpret a growth-state sequence into a skeleton.
///
/// Deterministic in the input; an empty sequence yields an empty skeleton
/// (a tree with pathological genes degrades rather than fails).
pub fn realize(symbols: &[Symbol]) -> TreeSkeleton {
    if symbols.is_empty() {
        return TreeSkeleton::default();
    }

    let mut turtle = Turtle::new(initial_width(symbols));
    let mut skeleton = TreeSkeleton {
        points: vec![turtle.position()],
        edges: Vec::new(),
        radii: vec![turtle.width],
    };
    let mut current = 0usize;
    let mut index_stack: Vec<usize> = Vec::new();

    for sym in symbols {
        match *sym {
            Symbol::Forward(d) => {
                turtle.forward(d);
                let parent = current;
                current = skeleton.points.len();
                skeleton.points.push(turtle.position());
                skeleton.edges.push((current, parent));
                skeleton.radii.push(turtle.width);
            }
            Symbol::Yaw(a) => turtle.yaw(a),
            Symbol::Roll(a) => turtle.roll(a),
            Symbol::SetWidth(w) => turtle.width = w,
            Symbol::Push => {
                turtle.push();
                index_stack.push(current);
            }
            Symbol::Pop => {
                turtle.pop();
                if let Some(idx) = index_stack.pop() {
                    current = idx;
                }
            }
            // Branch symbols carry no drawing instruction.
            Symbol::Branch { .. } => {}
        }
    }

    skeleton
}
