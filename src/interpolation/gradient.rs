//! Vertex gradient estimation for the Clough-Tocher scheme.
//!
//! Gradients are chosen to minimise the curvature of the piecewise-cubic surface along
//! every triangulation edge (Nielson's global method), solved by Gauss-Seidel sweeps over
//! the vertices.

const GRADIENT_TOLERANCE: f64 = 1e-6;
const GRADIENT_MAX_SWEEPS: usize = 400;

/// Estimates `[df/dx, df/dy]` at every vertex from the values at its edge neighbours.
///
/// Isolated vertices, and vertices whose local system is singular, keep a zero gradient.
pub fn estimate_gradients(
    vertices: &[[f64; 2]],
    values: &[f64],
    adjacency: &[Vec<usize>],
) -> Vec<[f64; 2]> {
    let mut gradients = vec![[0.0; 2]; vertices.len()];

    for _ in 0..GRADIENT_MAX_SWEEPS {
        let mut max_change = 0.0f64;

        for i in 0..vertices.len() {
            let (mut qxx, mut qxy, mut qyy) = (0.0, 0.0, 0.0);
            let (mut sx, mut sy) = (0.0, 0.0);

            for &j in &adjacency[i] {
                let ex = vertices[j][0] - vertices[i][0];
                let ey = vertices[j][1] - vertices[i][1];
                let len = (ex * ex + ey * ey).sqrt();
                let len3 = len * len * len;
                if len3 == 0.0 {
                    continue;
                }

                // Derivative at the far end, taken back along the edge.
                let df2 = -(gradients[j][0] * ex + gradients[j][1] * ey);
                qxx += 4.0 * ex * ex / len3;
                qxy += 4.0 * ex * ey / len3;
                qyy += 4.0 * ey * ey / len3;
                let r = (6.0 * (values[i] - values[j]) - 2.0 * df2) / len3;
                sx += r * ex;
                sy += r * ey;
            }

            let det = qxx * qyy - qxy * qxy;
            if det == 0.0 || !det.is_finite() {
                continue;
            }
            let r0 = (qyy * sx - qxy * sy) / det;
            let r1 = (qxx * sy - qxy * sx) / det;

            let change = (gradients[i][0] + r0)
                .abs()
                .max((gradients[i][1] + r1).abs())
                / r0.abs().max(r1.abs()).max(1.0);
            gradients[i] = [-r0, -r1];
            max_change = max_change.max(change);
        }

        if max_change < GRADIENT_TOLERANCE {
            break;
        }
    }

    gradients
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::delaunay::Delaunay;

    #[test]
    fn test_recovers_gradient_of_linear_field() {
        let vertices = vec![
            [0.0, 0.0],
            [2.0, 0.1],
            [2.2, 2.0],
            [-0.1, 1.9],
            [1.0, 1.1],
            [0.6, 0.4],
            [1.5, 1.6],
        ];
        let values: Vec<f64> = vertices.iter().map(|v| 3.0 * v[0] - 2.0 * v[1] + 5.0).collect();
        let mesh = Delaunay::new(vertices.clone());
        let gradients = estimate_gradients(&vertices, &values, &mesh.vertex_adjacency());
        for g in gradients {
            assert!((g[0] - 3.0).abs() < 1e-3, "dx was {}", g[0]);
            assert!((g[1] + 2.0).abs() < 1e-3, "dy was {}", g[1]);
        }
    }

    #[test]
    fn test_isolated_vertex_keeps_zero_gradient() {
        let vertices = vec![[0.0, 0.0], [1.0, 0.0]];
        let gradients = estimate_gradients(&vertices, &[1.0, 2.0], &[Vec::new(), Vec::new()]);
        assert_eq!(gradients, vec![[0.0, 0.0], [0.0, 0.0]]);
    }
}
