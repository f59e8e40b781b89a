//! Evaluation of the Clough-Tocher cubic on a single triangle.
//!
//! Each triangle is split at its centroid into three cubic Bézier patches. Control points
//! come from the vertex values and gradients; the remaining freedom along each edge is fixed
//! so that the cross-edge derivative varies linearly, which makes neighbouring triangles
//! join with continuous gradients.

use crate::interpolation::delaunay::Delaunay;

fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

fn dot(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[0] + a[1] * b[1]
}

/// Barycentric coordinates of `p` with respect to `abc`, or `None` for a degenerate triangle.
pub(crate) fn barycentric(corners: [[f64; 2]; 3], p: [f64; 2]) -> Option<[f64; 3]> {
    let [a, b, c] = corners;
    let det = (b[1] - c[1]) * (a[0] - c[0]) + (c[0] - b[0]) * (a[1] - c[1]);
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    let l1 = ((b[1] - c[1]) * (p[0] - c[0]) + (c[0] - b[0]) * (p[1] - c[1])) / det;
    let l2 = ((c[1] - a[1]) * (p[0] - c[0]) + (a[0] - c[0]) * (p[1] - c[1])) / det;
    Some([l1, l2, 1.0 - l1 - l2])
}

/// Direction parameters of the three inner edges of `triangle`.
///
/// For edge `k` (opposite vertex `k`) this describes the line towards the centroid of the
/// neighbouring triangle; on the hull it falls back to the edge midpoint direction.
fn edge_directions(mesh: &Delaunay, triangle: usize) -> [f64; 3] {
    let corners = mesh.corners(triangle);
    let mut g = [-0.5; 3];
    for (k, slot) in g.iter_mut().enumerate() {
        let Some(other) = mesh.neighbors[triangle][k] else {
            continue;
        };
        let [a, b, c] = mesh.corners(other);
        let centroid = [(a[0] + b[0] + c[0]) / 3.0, (a[1] + b[1] + c[1]) / 3.0];
        if let Some(bary) = barycentric(corners, centroid) {
            *slot = (bary[(k + 2) % 3] - bary[k]) / (3.0 * bary[k] - 1.0);
        }
    }
    g
}

/// Value of the interpolant at barycentric position `b` inside `triangle`.
pub(crate) fn evaluate(
    mesh: &Delaunay,
    triangle: usize,
    values: &[f64],
    gradients: &[[f64; 2]],
    b: [f64; 3],
) -> f64 {
    let tri = mesh.triangles[triangle];
    let p = tri.map(|v| mesh.vertices[v]);
    let f = tri.map(|v| values[v]);
    let df = tri.map(|v| gradients[v]);

    let e12 = sub(p[1], p[0]);
    let e23 = sub(p[2], p[1]);
    let e31 = sub(p[0], p[2]);

    let df12 = dot(df[0], e12);
    let df21 = -dot(df[1], e12);
    let df23 = dot(df[1], e23);
    let df32 = -dot(df[2], e23);
    let df31 = dot(df[2], e31);
    let df13 = -dot(df[0], e31);

    let c3000 = f[0];
    let c2100 = (df12 + 3.0 * c3000) / 3.0;
    let c2010 = (df13 + 3.0 * c3000) / 3.0;
    let c0300 = f[1];
    let c1200 = (df21 + 3.0 * c0300) / 3.0;
    let c0210 = (df23 + 3.0 * c0300) / 3.0;
    let c0030 = f[2];
    let c1020 = (df31 + 3.0 * c0030) / 3.0;
    let c0120 = (df32 + 3.0 * c0030) / 3.0;

    let c2001 = (c2100 + c2010 + c3000) / 3.0;
    let c0201 = (c1200 + c0300 + c0210) / 3.0;
    let c0021 = (c1020 + c0120 + c0030) / 3.0;

    let g = edge_directions(mesh, triangle);

    let c0111 = (g[0] * (-c0300 + 3.0 * c0210 - 3.0 * c0120 + c0030)
        + (-c0300 + 2.0 * c0210 - c0120 + c0021 + c0201))
        / 2.0;
    let c1011 = (g[1] * (-c0030 + 3.0 * c1020 - 3.0 * c2010 + c3000)
        + (-c0030 + 2.0 * c1020 - c2010 + c2001 + c0021))
        / 2.0;
    let c1101 = (g[2] * (-c3000 + 3.0 * c2100 - 3.0 * c1200 + c0300)
        + (-c3000 + 2.0 * c2100 - c1200 + c2001 + c0201))
        / 2.0;

    let c1002 = (c1101 + c1011 + c2001) / 3.0;
    let c0102 = (c1101 + c0111 + c0201) / 3.0;
    let c0012 = (c1011 + c0111 + c0021) / 3.0;
    let c0003 = (c1002 + c0102 + c0012) / 3.0;

    // Coordinates relative to the sub-triangle containing the point; the centroid takes
    // the fourth slot.
    let min = b[0].min(b[1]).min(b[2]);
    let b1 = b[0] - min;
    let b2 = b[1] - min;
    let b3 = b[2] - min;
    let b4 = 3.0 * min;

    b1.powi(3) * c3000
        + 3.0 * b1 * b1 * b2 * c2100
        + 3.0 * b1 * b1 * b3 * c2010
        + 3.0 * b1 * b1 * b4 * c2001
        + 3.0 * b1 * b2 * b2 * c1200
        + 6.0 * b1 * b2 * b4 * c1101
        + 3.0 * b1 * b3 * b3 * c1020
        + 6.0 * b1 * b3 * b4 * c1011
        + 3.0 * b1 * b4 * b4 * c1002
        + b2.powi(3) * c0300
        + 3.0 * b2 * b2 * b3 * c0210
        + 3.0 * b2 * b2 * b4 * c0201
        + 3.0 * b2 * b3 * b3 * c0120
        + 6.0 * b2 * b3 * b4 * c0111
        + 3.0 * b2 * b4 * b4 * c0102
        + b3.powi(3) * c0030
        + 3.0 * b3 * b3 * b4 * c0021
        + 3.0 * b3 * b4 * b4 * c0012
        + b4.powi(3) * c0003
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barycentric_of_corners_and_centroid() {
        let corners = [[0.0, 0.0], [3.0, 0.0], [0.0, 3.0]];
        assert_eq!(barycentric(corners, [0.0, 0.0]), Some([1.0, 0.0, 0.0]));
        let centre = barycentric(corners, [1.0, 1.0]).unwrap();
        for l in centre {
            assert!((l - 1.0 / 3.0).abs() < 1e-12);
        }
        assert!(barycentric([[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]], [0.5, 0.0]).is_none());
    }

    #[test]
    fn test_vertices_reproduce_their_values() {
        let mesh = Delaunay::new(vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let values = [2.0, -1.0, 4.0];
        let gradients = [[0.3, 0.1], [-0.2, 0.5], [1.0, -1.0]];
        for (k, &v) in mesh.triangles[0].iter().enumerate() {
            let mut b = [0.0; 3];
            b[k] = 1.0;
            let got = evaluate(&mesh, 0, &values, &gradients, b);
            assert!((got - values[v]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_linear_data_is_exact_inside_triangle() {
        let mesh = Delaunay::new(vec![[0.0, 0.0], [2.0, 0.0], [0.5, 1.5]]);
        let f = |p: [f64; 2]| 1.5 * p[0] - 0.5 * p[1] + 2.0;
        let values: Vec<f64> = mesh.vertices.iter().map(|&p| f(p)).collect();
        let gradients = vec![[1.5, -0.5]; 3];
        let corners = mesh.corners(0);
        for q in [[0.8, 0.4], [0.3, 0.2], [1.2, 0.6]] {
            let b = barycentric(corners, q).unwrap();
            let got = evaluate(&mesh, 0, &values, &gradients, b);
            assert!((got - f(q)).abs() < 1e-9, "at {:?}: {} vs {}", q, got, f(q));
        }
    }
}
