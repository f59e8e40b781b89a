//! Bowyer-Watson Delaunay triangulation of scattered 2-D points.

use std::collections::HashMap;

/// Half-width of the enclosing triangle, in units of the normalised data extent.
const SUPER_TRIANGLE_SCALE: f64 = 100.0;

/// A Delaunay triangulation over a fixed vertex list.
///
/// Triangles are stored counter-clockwise as vertex indices. `neighbors[t][k]` is the
/// triangle sharing the edge of `t` opposite to its `k`-th vertex, or `None` on the hull.
#[derive(Debug, Clone)]
pub struct Delaunay {
    pub vertices: Vec<[f64; 2]>,
    pub triangles: Vec<[usize; 3]>,
    pub neighbors: Vec<[Option<usize>; 3]>,
}

impl Delaunay {
    /// Triangulates `vertices`. Fewer than three points, or points that are all
    /// collinear, produce a triangulation without triangles.
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        let triangles = triangulate(&vertices);
        let neighbors = find_neighbors(&triangles);
        Self {
            vertices,
            triangles,
            neighbors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// For every vertex, the sorted list of vertices it shares an edge with.
    pub fn vertex_adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.vertices.len()];
        for tri in &self.triangles {
            for k in 0..3 {
                let a = tri[k];
                let b = tri[(k + 1) % 3];
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
        }
        for list in &mut adjacency {
            list.sort_unstable();
            list.dedup();
        }
        adjacency
    }

    pub fn corners(&self, triangle: usize) -> [[f64; 2]; 3] {
        self.triangles[triangle].map(|v| self.vertices[v])
    }
}

/// Twice the signed area of `abc`; positive when counter-clockwise.
pub(crate) fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Strictly inside the circumcircle of the counter-clockwise triangle `abc`.
fn in_circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> bool {
    let (adx, ady) = (a[0] - p[0], a[1] - p[1]);
    let (bdx, bdy) = (b[0] - p[0], b[1] - p[1]);
    let (cdx, cdy) = (c[0] - p[0], c[1] - p[1]);
    let det = (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        + (bdx * bdx + bdy * bdy) * (cdx * ady - adx * cdy)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady);
    det > 0.0
}

/// Side of the grid used to order insertions along a Hilbert curve.
const HILBERT_ORDER: u32 = 16;

/// Position of `(x, y)` along a Hilbert curve filling a `2^HILBERT_ORDER` square grid.
fn hilbert_index(mut x: u32, mut y: u32) -> u64 {
    let n: u32 = 1 << HILBERT_ORDER;
    let mut d = 0u64;
    let mut s = n / 2;
    while s > 0 {
        let rx = u32::from(x & s > 0);
        let ry = u32::from(y & s > 0);
        d += u64::from(s) * u64::from(s) * u64::from((3 * rx) ^ ry);
        if ry == 0 {
            if rx == 1 {
                x = n - 1 - x;
                y = n - 1 - y;
            }
            std::mem::swap(&mut x, &mut y);
        }
        s /= 2;
    }
    d
}

/// Incremental triangulation state. Triangles are never removed from the arrays; a
/// cavity's slots are reused for the triangles that replace it.
struct Builder {
    pts: Vec<[f64; 2]>,
    triangles: Vec<[usize; 3]>,
    adjacent: Vec<[Option<usize>; 3]>,
    alive: Vec<bool>,
    /// Index of the point whose cavity last visited each triangle.
    visited_by: Vec<usize>,
}

impl Builder {
    fn new(pts: Vec<[f64; 2]>, first: [usize; 3]) -> Self {
        Self {
            pts,
            triangles: vec![first],
            adjacent: vec![[None; 3]],
            alive: vec![true],
            visited_by: vec![usize::MAX],
        }
    }

    fn edge(&self, t: usize, k: usize) -> (usize, usize) {
        let tri = self.triangles[t];
        (tri[(k + 1) % 3], tri[(k + 2) % 3])
    }

    /// Walks from `start` towards `p` across edges that separate the two, returning a
    /// triangle containing `p` (possibly on its boundary).
    fn locate(&self, start: usize, p: [f64; 2]) -> Option<usize> {
        let mut t = start;
        'walk: for _ in 0..self.triangles.len() {
            for k in 0..3 {
                let (a, b) = self.edge(t, k);
                if orient(self.pts[a], self.pts[b], p) < 0.0 {
                    match self.adjacent[t][k] {
                        Some(next) => {
                            t = next;
                            continue 'walk;
                        }
                        None => break 'walk,
                    }
                }
            }
            return Some(t);
        }
        // The walk only fails on numerically degenerate input; fall back to a scan.
        (0..self.triangles.len()).find(|&t| {
            self.alive[t]
                && (0..3).all(|k| {
                    let (a, b) = self.edge(t, k);
                    orient(self.pts[a], self.pts[b], p) >= 0.0
                })
        })
    }

    /// Inserts point `i`, returning one of the triangles created around it.
    fn insert(&mut self, i: usize, start: usize) -> usize {
        let p = self.pts[i];
        let Some(first) = self.locate(start, p) else {
            return start;
        };

        // Grow the cavity from the containing triangle through its neighbours.
        let mut cavity = vec![first];
        let mut stack = vec![first];
        let mut boundary: Vec<(usize, usize, Option<usize>)> = Vec::new();
        self.visited_by[first] = i;
        while let Some(t) = stack.pop() {
            for k in 0..3 {
                let (a, b) = self.edge(t, k);
                let Some(n) = self.adjacent[t][k] else {
                    boundary.push((a, b, None));
                    continue;
                };
                if self.visited_by[n] == i {
                    continue;
                }
                let [x, y, z] = self.triangles[n].map(|v| self.pts[v]);
                // `p` on or behind the shared edge would leave a folded triangle.
                let behind = orient(self.pts[a], self.pts[b], p) <= 0.0;
                if behind || in_circumcircle(x, y, z, p) {
                    self.visited_by[n] = i;
                    cavity.push(n);
                    stack.push(n);
                } else {
                    boundary.push((a, b, Some(n)));
                }
            }
        }
        // A neighbour rejected from one side may have been pulled in from another.
        boundary.retain(|&(_, _, n)| n.map_or(true, |n| self.visited_by[n] != i));

        let mut free = cavity.into_iter();
        let mut created = Vec::with_capacity(boundary.len());
        for &(a, b, outside) in &boundary {
            let tri = [a, b, i];
            let slot = match free.next() {
                Some(slot) => {
                    self.triangles[slot] = tri;
                    self.adjacent[slot] = [None, None, outside];
                    slot
                }
                None => {
                    self.triangles.push(tri);
                    self.adjacent.push([None, None, outside]);
                    self.alive.push(true);
                    self.visited_by.push(usize::MAX);
                    self.triangles.len() - 1
                }
            };
            if let Some(n) = outside {
                if let Some(k) = (0..3).find(|&k| self.edge(n, k) == (b, a)) {
                    self.adjacent[n][k] = Some(slot);
                }
            }
            created.push(slot);
        }
        for slot in free {
            self.alive[slot] = false;
        }

        // New triangles meet along the spokes from `p` to the cavity boundary.
        for &slot in &created {
            let [a, b, _] = self.triangles[slot];
            let after = created.iter().copied().find(|&o| self.triangles[o][0] == b);
            let before = created.iter().copied().find(|&o| self.triangles[o][1] == a);
            self.adjacent[slot][0] = after;
            self.adjacent[slot][1] = before;
        }

        created.last().copied().unwrap_or(start)
    }
}

fn triangulate(points: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    // Work in coordinates centred on the data and scaled to roughly [-1, 1].
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }
    let half_extent = (max_x - min_x).max(max_y - min_y) / 2.0;
    if !(half_extent.is_finite() && half_extent > 0.0) {
        return Vec::new();
    }
    let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
    let mut pts: Vec<[f64; 2]> = points
        .iter()
        .map(|p| [(p[0] - cx) / half_extent, (p[1] - cy) / half_extent])
        .collect();

    // Consecutive insertions stay close together, which keeps every walk short.
    let cell = |v: f64| (((v + 1.0) / 2.0).clamp(0.0, 1.0) * f64::from(u16::MAX)) as u32;
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| hilbert_index(cell(pts[i][0]), cell(pts[i][1])));

    let m = SUPER_TRIANGLE_SCALE;
    pts.push([-m, -m]);
    pts.push([m, -m]);
    pts.push([0.0, m]);
    let mut builder = Builder::new(pts, [n, n + 1, n + 2]);

    let mut last = 0;
    for i in order {
        last = builder.insert(i, last);
    }

    builder
        .triangles
        .iter()
        .zip(&builder.alive)
        .filter(|(t, alive)| **alive && t.iter().all(|&v| v < n))
        .map(|(t, _)| *t)
        .collect()
}

fn find_neighbors(triangles: &[[usize; 3]]) -> Vec<[Option<usize>; 3]> {
    let mut edge_owner: HashMap<(usize, usize), usize> = HashMap::with_capacity(triangles.len() * 3);
    for (t, tri) in triangles.iter().enumerate() {
        for k in 0..3 {
            edge_owner.insert((tri[(k + 1) % 3], tri[(k + 2) % 3]), t);
        }
    }
    triangles
        .iter()
        .map(|tri| {
            let mut neighbors = [None; 3];
            for (k, slot) in neighbors.iter_mut().enumerate() {
                let (a, b) = (tri[(k + 1) % 3], tri[(k + 2) % 3]);
                *slot = edge_owner.get(&(b, a)).copied();
            }
            neighbors
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_area(mesh: &Delaunay) -> f64 {
        (0..mesh.triangles.len())
            .map(|t| {
                let [a, b, c] = mesh.corners(t);
                orient(a, b, c) / 2.0
            })
            .sum()
    }

    #[test]
    fn test_square_splits_into_two_triangles() {
        let mesh = Delaunay::new(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert_eq!(mesh.triangles.len(), 2);
        assert!((total_area(&mesh) - 1.0).abs() < 1e-12);
        let shared = mesh
            .neighbors
            .iter()
            .flatten()
            .filter(|n| n.is_some())
            .count();
        assert_eq!(shared, 2);
    }

    #[test]
    fn test_regular_grid_is_fully_covered() {
        let mut vertices = Vec::new();
        for y in 0..3 {
            for x in 0..3 {
                vertices.push([x as f64, y as f64]);
            }
        }
        let mesh = Delaunay::new(vertices);
        // 2n - h - 2 with n = 9 points and h = 8 on the boundary.
        assert_eq!(mesh.triangles.len(), 8);
        assert!((total_area(&mesh) - 4.0).abs() < 1e-12);
        for t in 0..mesh.triangles.len() {
            let [a, b, c] = mesh.corners(t);
            assert!(orient(a, b, c) > 0.0, "triangle {} is not counter-clockwise", t);
        }
    }

    #[test]
    fn test_neighbors_are_symmetric() {
        let vertices = vec![
            [0.0, 0.0],
            [4.0, 0.3],
            [3.7, 3.9],
            [0.2, 4.1],
            [2.1, 1.8],
            [1.1, 2.9],
            [3.0, 1.2],
        ];
        let mesh = Delaunay::new(vertices);
        for (t, neighbors) in mesh.neighbors.iter().enumerate() {
            for other in neighbors.iter().flatten() {
                assert!(mesh.neighbors[*other].contains(&Some(t)));
            }
        }
        let adjacency = mesh.vertex_adjacency();
        assert!(adjacency.iter().all(|list| list.len() >= 2));
    }

    #[test]
    fn test_large_grid_is_delaunay() {
        let m = 55;
        let mut vertices = Vec::with_capacity(m * m);
        for i in 0..m {
            for j in 0..m {
                let interior = i > 0 && j > 0 && i < m - 1 && j < m - 1;
                let jitter = if interior { ((i * 31 + j * 17) % 13) as f64 * 0.01 - 0.06 } else { 0.0 };
                vertices.push([i as f64 + jitter, j as f64 - jitter * 0.7]);
            }
        }
        let n = vertices.len();
        let mesh = Delaunay::new(vertices);

        let hull = 4 * (m - 1);
        assert_eq!(mesh.triangles.len(), 2 * n - hull - 2);
        let side = (m - 1) as f64;
        assert!((total_area(&mesh) - side * side).abs() < 1e-6);

        for t in 0..mesh.triangles.len() {
            let [a, b, c] = mesh.corners(t);
            assert!(orient(a, b, c) > 0.0, "triangle {} is not counter-clockwise", t);
            for (k, other) in mesh.neighbors[t].iter().enumerate() {
                let Some(other) = other else { continue };
                let tri = mesh.triangles[*other];
                let (p, q) = (mesh.triangles[t][(k + 1) % 3], mesh.triangles[t][(k + 2) % 3]);
                let far = tri.into_iter().find(|&v| v != p && v != q).unwrap();
                let d = mesh.vertices[far];
                // Strictly inside means the edge should have been flipped.
                let (adx, ady) = (a[0] - d[0], a[1] - d[1]);
                let (bdx, bdy) = (b[0] - d[0], b[1] - d[1]);
                let (cdx, cdy) = (c[0] - d[0], c[1] - d[1]);
                let det = (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
                    + (bdx * bdx + bdy * bdy) * (cdx * ady - adx * cdy)
                    + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady);
                assert!(det < 1e-6, "edge {}-{} of triangle {} is not locally Delaunay", p, q, t);
            }
        }
    }

    #[test]
    fn test_collinear_points_have_no_triangles() {
        let mesh = Delaunay::new(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]);
        assert!(mesh.is_empty());
        assert!(Delaunay::new(vec![[0.0, 0.0], [1.0, 0.0]]).is_empty());
    }
}
