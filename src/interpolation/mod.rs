//! Smooth interpolation of scattered samples.
//!
//! Samples are Delaunay-triangulated and a C1 piecewise-cubic (Clough-Tocher) surface is
//! fitted through them, with vertex gradients estimated globally from the data. Queries
//! outside the convex hull of the samples have no value.

pub mod clough_tocher;
pub mod delaunay;
pub mod gradient;

use crate::interpolation::clough_tocher::barycentric;
use crate::interpolation::delaunay::Delaunay;
use crate::interpolation::gradient::estimate_gradients;
use ordered_float::OrderedFloat;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::RTree;
use std::collections::HashSet;

/// Per-axis distance under which a query is treated as sitting on a sample.
const COINCIDENT_TOLERANCE: f64 = 1e-12;
/// Slack allowed on barycentric coordinates when testing containment.
const CONTAINMENT_TOLERANCE: f64 = 1e-10;

type TriangleBox = GeomWithData<Rectangle<[f64; 2]>, usize>;
type SampleSite = GeomWithData<[f64; 2], usize>;

fn is_finite_point(p: (f64, f64)) -> bool {
    p.0.is_finite() && p.1.is_finite()
}

/// Interpolates `values`, sampled at `points`, at `query`.
///
/// Returns `None` when the query lies outside the convex hull of the usable samples, when
/// the samples cannot be triangulated (fewer than three, or all collinear) or when
/// `points` and `values` differ in length. Samples with a non-finite coordinate or value
/// are ignored, as are later duplicates of an already seen position. A query that
/// coincides with a sample returns that sample's value exactly, whatever the sample count.
///
/// # Examples
///
/// ```
/// use climatrend::interpolate;
///
/// let points = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
/// let values = [1.0, 3.0, 2.0, 4.0]; // 1 + 2x + y
/// let v = interpolate(&points, &values, (0.25, 0.5)).unwrap();
/// assert!((v - 2.0).abs() < 1e-3);
/// assert_eq!(interpolate(&points, &values, (2.0, 2.0)), None);
/// ```
pub fn interpolate(points: &[(f64, f64)], values: &[f64], query: (f64, f64)) -> Option<f64> {
    if points.len() != values.len() {
        return None;
    }
    let (usable_points, usable_values): (Vec<(f64, f64)>, Vec<f64>) = points
        .iter()
        .zip(values)
        .filter(|(p, v)| is_finite_point(**p) && v.is_finite())
        .map(|(p, v)| (*p, *v))
        .unzip();
    Triangulation::new(&usable_points).interpolate(&usable_values, query)
}

/// A triangulation of one set of sample positions, reusable for any number of value
/// arrays sampled at those positions.
#[derive(Debug)]
pub struct Triangulation {
    points: Vec<(f64, f64)>,
    /// Index into `points` of each triangulation vertex.
    vertex_source: Vec<usize>,
    mesh: Delaunay,
    adjacency: Vec<Vec<usize>>,
    triangle_index: RTree<TriangleBox>,
    vertex_index: RTree<SampleSite>,
}

impl Triangulation {
    pub fn new(points: &[(f64, f64)]) -> Self {
        let mut seen = HashSet::new();
        let mut vertex_source = Vec::new();
        let mut vertices = Vec::new();
        for (i, &p) in points.iter().enumerate() {
            if is_finite_point(p) && seen.insert((OrderedFloat(p.0), OrderedFloat(p.1))) {
                vertex_source.push(i);
                vertices.push([p.0, p.1]);
            }
        }

        let vertex_index = RTree::bulk_load(
            vertices
                .iter()
                .enumerate()
                .map(|(v, &p)| SampleSite::new(p, v))
                .collect(),
        );
        let mesh = Delaunay::new(vertices);
        let adjacency = mesh.vertex_adjacency();
        let triangle_index = RTree::bulk_load(
            (0..mesh.triangles.len())
                .map(|t| {
                    let [a, b, c] = mesh.corners(t);
                    let lower = [a[0].min(b[0]).min(c[0]), a[1].min(b[1]).min(c[1])];
                    let upper = [a[0].max(b[0]).max(c[0]), a[1].max(b[1]).max(c[1])];
                    TriangleBox::new(Rectangle::from_corners(lower, upper), t)
                })
                .collect(),
        );

        Self {
            points: points.to_vec(),
            vertex_source,
            mesh,
            adjacency,
            triangle_index,
            vertex_index,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangles.len()
    }

    /// Interpolates `values` (one per point given to [`Triangulation::new`]) at `query`.
    ///
    /// Behaves exactly like [`interpolate`] called with the same points. When some values
    /// are non-finite the samples carrying them are dropped and the remaining ones are
    /// triangulated afresh.
    pub fn interpolate(&self, values: &[f64], query: (f64, f64)) -> Option<f64> {
        if values.len() != self.points.len() || !is_finite_point(query) {
            return None;
        }
        if values.iter().any(|v| !v.is_finite()) {
            return interpolate(&self.points, values, query);
        }
        let vertex_values: Vec<f64> = self.vertex_source.iter().map(|&i| values[i]).collect();

        let q = [query.0, query.1];
        if let Some(site) = self.vertex_index.nearest_neighbor(&q) {
            let p = site.geom();
            if (p[0] - q[0]).abs() <= COINCIDENT_TOLERANCE
                && (p[1] - q[1]).abs() <= COINCIDENT_TOLERANCE
            {
                return Some(vertex_values[site.data]);
            }
        }
        if self.mesh.is_empty() {
            return None;
        }

        let (triangle, bary) = self.locate(q)?;
        let gradients = estimate_gradients(&self.mesh.vertices, &vertex_values, &self.adjacency);
        let value = clough_tocher::evaluate(&self.mesh, triangle, &vertex_values, &gradients, bary);
        value.is_finite().then_some(value)
    }

    /// The triangle containing `q` together with the barycentric coordinates of `q` in it.
    /// On a shared edge the triangle holding `q` most firmly is chosen.
    fn locate(&self, q: [f64; 2]) -> Option<(usize, [f64; 3])> {
        self.triangle_index
            .locate_all_at_point(&q)
            .filter_map(|cell| {
                let bary = barycentric(self.mesh.corners(cell.data), q)?;
                let min = bary[0].min(bary[1]).min(bary[2]);
                (min >= -CONTAINMENT_TOLERANCE).then_some((cell.data, bary, min))
            })
            .max_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(triangle, bary, _)| (triangle, bary))
    }
}
