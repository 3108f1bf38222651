//! Racing line: a Catmull-Rom spline through the sampled traversal.
//!
//! Each traversed piece is sampled along its centerline, reversed when it was
//! traveled end-to-start, and concatenated with shared seam points dropped.
//! The curve wraps around when the traversal is a closed loop.

use nalgebra::Vector3;
use trackkit_core::math::{distance, Position};
use trackkit_core::{PieceCatalog, PlacedPiece};
use trackkit_settings::RacingLineSettings;

use crate::geometry::world_point_at;
use crate::traversal::TraversalResult;

const SEAM_EPSILON: f64 = 1e-6;
const MIN_KNOT_SPACING: f64 = 1e-4;

/// Catmull-Rom curve with `alpha`-parametrized knots (0.5 = centripetal).
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRomCurve {
    points: Vec<Position>,
    closed: bool,
    alpha: f64,
}

impl CatmullRomCurve {
    /// Needs at least two control points.
    pub fn new(points: Vec<Position>, closed: bool, alpha: f64) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        Some(Self {
            points,
            closed,
            alpha,
        })
    }

    pub fn points(&self) -> &[Position] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn segment_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Segment index and local weight for curve parameter `t` in `[0, 1]`.
    fn locate(&self, t: f64) -> (usize, f64) {
        let segments = self.segment_count();
        let p = segments as f64 * t.clamp(0.0, 1.0);
        let mut index = p.floor() as usize;
        let mut weight = p - index as f64;
        if index >= segments {
            if self.closed {
                // t == 1 lands exactly on the first point again
                index = 0;
                weight = 0.0;
            } else {
                index = segments - 1;
                weight = 1.0;
            }
        }
        (index, weight)
    }

    /// Control points around segment `index`, with mirrored phantoms at open ends.
    fn neighborhood(&self, index: usize) -> [Position; 4] {
        let pts = &self.points;
        let n = pts.len();
        if self.closed {
            [
                pts[(index + n - 1) % n],
                pts[index % n],
                pts[(index + 1) % n],
                pts[(index + 2) % n],
            ]
        } else {
            let p1 = pts[index];
            let p2 = pts[index + 1];
            let p0 = if index > 0 {
                pts[index - 1]
            } else {
                p1 - (p2 - p1)
            };
            let p3 = if index + 2 < n {
                pts[index + 2]
            } else {
                p2 + (p2 - p1)
            };
            [p0, p1, p2, p3]
        }
    }

    /// Cubic coefficients of segment `index` in Hermite form.
    fn coefficients(&self, index: usize) -> [Vector3<f64>; 4] {
        let [p0, p1, p2, p3] = self.neighborhood(index);

        let knot = |a: &Position, b: &Position| distance(a, b).powf(self.alpha);
        let mut dt1 = knot(&p1, &p2);
        if dt1 < MIN_KNOT_SPACING {
            dt1 = 1.0;
        }
        let mut dt0 = knot(&p0, &p1);
        if dt0 < MIN_KNOT_SPACING {
            dt0 = dt1;
        }
        let mut dt2 = knot(&p2, &p3);
        if dt2 < MIN_KNOT_SPACING {
            dt2 = dt1;
        }

        let m1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let m2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        let x0 = p1.coords;
        let x1 = p2.coords;
        [
            x0,
            m1,
            -3.0 * x0 + 3.0 * x1 - 2.0 * m1 - m2,
            2.0 * x0 - 2.0 * x1 + m1 + m2,
        ]
    }

    /// Point at curve parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f64) -> Position {
        let (index, w) = self.locate(t);
        let [c0, c1, c2, c3] = self.coefficients(index);
        Position::from(c0 + c1 * w + c2 * (w * w) + c3 * (w * w * w))
    }

    /// Unit tangent at curve parameter `t`.
    pub fn tangent_at(&self, t: f64) -> Vector3<f64> {
        let (index, w) = self.locate(t);
        let [_, c1, c2, c3] = self.coefficients(index);
        let d = c1 + c2 * (2.0 * w) + c3 * (3.0 * w * w);
        d.try_normalize(f64::EPSILON).unwrap_or_else(|| {
            let [_, p1, p2, _] = self.neighborhood(index);
            (p2 - p1).try_normalize(f64::EPSILON).unwrap_or_else(Vector3::z)
        })
    }

    /// `divisions + 1` evenly spaced parameter samples, both ends included.
    pub fn sample(&self, divisions: usize) -> Vec<Position> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.point_at(i as f64 / divisions as f64))
            .collect()
    }
}

/// Centerline samples of one piece in world space, start to end.
pub fn sample_piece(piece: &PlacedPiece, catalog: &PieceCatalog, samples: usize) -> Vec<Position> {
    let Some(def) = catalog.get(&piece.piece_type) else {
        return Vec::new();
    };
    let samples = samples.max(2);
    let pose = piece.pose();
    (0..samples)
        .map(|i| {
            let t = i as f64 / (samples - 1) as f64;
            world_point_at(&pose, def, t).position
        })
        .collect()
}

/// Concatenated samples in travel order, without repeated seam points.
pub fn traversal_points(
    traversal: &TraversalResult,
    pieces: &[PlacedPiece],
    catalog: &PieceCatalog,
    samples: usize,
) -> Vec<Position> {
    let mut points: Vec<Position> = Vec::new();
    for (i, step) in traversal.steps.iter().enumerate() {
        let Some(piece) = pieces.get(step.piece) else {
            continue;
        };
        let mut local = sample_piece(piece, catalog, samples);
        if step.reversed {
            local.reverse();
        }
        let skip = usize::from(i > 0 && !local.is_empty());
        points.extend(local.into_iter().skip(skip));
    }

    if traversal.closed && points.len() > 2 {
        let first = points[0];
        if points
            .last()
            .is_some_and(|last| distance(last, &first) < SEAM_EPSILON)
        {
            points.pop();
        }
    }
    points
}

/// The authoritative path for lap progress and vehicle placement.
#[derive(Debug, Clone)]
pub struct RacingLine {
    curve: CatmullRomCurve,
    /// Cumulative length at each of `divisions + 1` parameter samples
    lengths: Vec<f64>,
    samples: Vec<Position>,
}

impl RacingLine {
    /// Builds the line for a traversal, or `None` with fewer than two points.
    ///
    /// Open traversals produce an open best-effort path.
    pub fn build(
        traversal: &TraversalResult,
        pieces: &[PlacedPiece],
        catalog: &PieceCatalog,
        settings: &RacingLineSettings,
    ) -> Option<Self> {
        let points = traversal_points(traversal, pieces, catalog, settings.samples_per_piece);
        let curve = CatmullRomCurve::new(points, traversal.closed, settings.catmull_rom_alpha)?;
        let line = Self::from_curve(curve, settings.arc_length_divisions);
        tracing::debug!(
            "Built racing line: {} control points, length {:.1}, closed: {}",
            line.curve.points().len(),
            line.length(),
            line.is_closed()
        );
        Some(line)
    }

    pub fn from_curve(curve: CatmullRomCurve, divisions: usize) -> Self {
        let samples = curve.sample(divisions);
        let mut lengths = Vec::with_capacity(samples.len());
        let mut total = 0.0;
        lengths.push(0.0);
        for pair in samples.windows(2) {
            total += distance(&pair[0], &pair[1]);
            lengths.push(total);
        }
        Self {
            curve,
            lengths,
            samples,
        }
    }

    pub fn curve(&self) -> &CatmullRomCurve {
        &self.curve
    }

    pub fn is_closed(&self) -> bool {
        self.curve.is_closed()
    }

    /// Approximate arc length.
    pub fn length(&self) -> f64 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    pub fn point_at(&self, t: f64) -> Position {
        self.curve.point_at(t)
    }

    pub fn tangent_at(&self, t: f64) -> Vector3<f64> {
        self.curve.tangent_at(t)
    }

    pub fn sample(&self, divisions: usize) -> Vec<Position> {
        self.curve.sample(divisions)
    }

    /// Point at a distance along the line, wrapping on closed loops.
    pub fn point_at_distance(&self, along: f64) -> Position {
        let total = self.length();
        if total <= 0.0 {
            return self.curve.point_at(0.0);
        }
        let along = if self.is_closed() {
            along.rem_euclid(total)
        } else {
            along.clamp(0.0, total)
        };
        let i = self.lengths.partition_point(|&l| l < along);
        if i == 0 {
            return self.samples[0];
        }
        let (l0, l1) = (self.lengths[i - 1], self.lengths[i]);
        let w = if l1 > l0 { (along - l0) / (l1 - l0) } else { 0.0 };
        let (a, b) = (self.samples[i - 1], self.samples[i]);
        a + (b - a) * w
    }

    /// Fraction of the lap completed at the point nearest `position`, in `[0, 1)`
    /// for closed lines and `[0, 1]` for open ones.
    pub fn progress_of(&self, position: &Position) -> f64 {
        let total = self.length();
        if total <= 0.0 {
            return 0.0;
        }
        let nearest = self
            .samples
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                distance(a, position).total_cmp(&distance(b, position))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let fraction = self.lengths[nearest] / total;
        if self.is_closed() {
            fraction % 1.0
        } else {
            fraction
        }
    }
}
