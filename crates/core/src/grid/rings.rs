//! Concentric elliptical ring cluster.
//!
//! The mesh can be partitioned into nested elliptical annuli sharing a
//! centre at (0, 0) and a common aspect ratio. Chemistry may then be solved
//! once per ring instead of once per cell. A cell belongs to the innermost
//! ring whose ellipse contains its centre; the outermost ring stands for the
//! in-mesh ambient residual.

use tracing::debug;

use super::mesh::Mesh;

/// One annulus: the region inside ellipse `i` and outside ellipse `i - 1`.
#[derive(Debug, Clone)]
pub struct Ring {
    /// Outer semi-axis along x [m].
    pub a_x: f64,
    /// Outer semi-axis along y [m].
    pub a_y: f64,
}

/// Nested rings plus the cell membership map.
#[derive(Debug, Clone)]
pub struct RingCluster {
    rings: Vec<Ring>,
    /// `members[r]` lists the (i, j) cells of ring `r`.
    members: Vec<Vec<(usize, usize)>>,
    /// Physical area of each ring: sum of member cell areas [m^2].
    areas: Vec<f64>,
}

impl RingCluster {
    /// Build `n_ring` nested ellipses from the plume semi-axes and map them
    /// onto the mesh. `is_contrail` shrinks the innermost ring, matching the
    /// tighter core of an ice-forming plume.
    ///
    /// The innermost ring is floored at one and a half cells per axis so a
    /// vortex-scale plume still owns the centre cells; the semi-axes then
    /// grow geometrically, capped so the outermost ellipse stays inside the
    /// mesh.
    #[must_use]
    pub fn new(n_ring: usize, is_contrail: bool, semi_x: f64, semi_y: f64, mesh: &Mesh) -> Self {
        assert!(n_ring >= 1, "need at least one ring");
        let inner_scale = if is_contrail { 0.75 } else { 1.0 };
        let ax0 = semi_x.max(1.5 * mesh.dx()) * inner_scale;
        let ay0 = semi_y.max(1.5 * mesh.dy()) * inner_scale;
        let max_x = mesh.x().last().copied().unwrap_or(ax0).abs();
        let max_y = mesh.y().last().copied().unwrap_or(ay0).abs();
        let growth_limit = (max_x / ax0).min(max_y / ay0).max(1.0);
        let growth = growth_limit
            .powf(1.0 / n_ring as f64)
            .clamp(1.05, 1.6);

        let mut rings = Vec::with_capacity(n_ring);
        let mut ax = ax0;
        let mut ay = ay0;
        for _ in 0..n_ring {
            rings.push(Ring { a_x: ax, a_y: ay });
            ax *= growth;
            ay *= growth;
        }

        let (members, areas) = Self::map_to_mesh(&rings, mesh);
        debug!(
            n_ring,
            growth,
            outer_ax = rings.last().map(|r| r.a_x),
            "ring cluster built"
        );
        Self {
            rings,
            members,
            areas,
        }
    }

    /// Assign every cell inside the outermost ellipse to its innermost
    /// containing ring.
    fn map_to_mesh(rings: &[Ring], mesh: &Mesh) -> (Vec<Vec<(usize, usize)>>, Vec<f64>) {
        let mut members = vec![Vec::new(); rings.len()];
        for j in 0..mesh.ny() {
            for i in 0..mesh.nx() {
                let x = mesh.x()[i];
                let y = mesh.y()[j];
                for (r, ring) in rings.iter().enumerate() {
                    let e = (x / ring.a_x).powi(2) + (y / ring.a_y).powi(2);
                    if e <= 1.0 {
                        members[r].push((i, j));
                        break;
                    }
                }
            }
        }
        let areas = members
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .map(|&(i, j)| mesh.areas().get(i, j))
                    .sum::<f64>()
            })
            .collect();
        (members, areas)
    }

    /// Recompute the membership map for new semi-axes, keeping ring count
    /// and growth structure. Called when the plume axes drift past the
    /// remap threshold.
    pub fn remap(&mut self, semi_x: f64, semi_y: f64, is_contrail: bool, mesh: &Mesh) {
        *self = Self::new(self.rings.len(), is_contrail, semi_x, semi_y, mesh);
    }

    #[must_use]
    pub fn n_ring(&self) -> usize {
        self.rings.len()
    }

    #[must_use]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Cells of ring `r`, innermost first.
    #[must_use]
    pub fn members(&self, r: usize) -> &[(usize, usize)] {
        &self.members[r]
    }

    /// Physical ring areas [m^2].
    #[must_use]
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mesh() -> Mesh {
        Mesh::new(32, 32, 3200.0, 1600.0)
    }

    #[test]
    fn mapping_is_a_partition() {
        let m = mesh();
        let cluster = RingCluster::new(5, false, 100.0, 50.0, &m);
        let mut seen = std::collections::HashSet::new();
        for r in 0..cluster.n_ring() {
            for &cell in cluster.members(r) {
                assert!(seen.insert(cell), "cell {cell:?} in two rings");
            }
        }
        // Every counted cell sits inside the outermost ellipse and ring
        // areas sum to the contained-cell area.
        let outer = cluster.rings().last().unwrap();
        let mut contained_area = 0.0;
        for j in 0..m.ny() {
            for i in 0..m.nx() {
                let inside = (m.x()[i] / outer.a_x).powi(2) + (m.y()[j] / outer.a_y).powi(2) <= 1.0;
                assert_eq!(inside, seen.contains(&(i, j)), "cell ({i}, {j})");
                if inside {
                    contained_area += m.areas().get(i, j);
                }
            }
        }
        let ring_total: f64 = cluster.areas().iter().sum();
        assert!((ring_total - contained_area).abs() < 1e-9);
    }

    #[test]
    fn inner_rings_are_nested() {
        let cluster = RingCluster::new(4, false, 80.0, 40.0, &mesh());
        for pair in cluster.rings().windows(2) {
            assert!(pair[0].a_x < pair[1].a_x);
            assert!(pair[0].a_y < pair[1].a_y);
        }
        // Aspect ratio is shared.
        let ratio0 = cluster.rings()[0].a_x / cluster.rings()[0].a_y;
        for ring in cluster.rings() {
            assert!((ring.a_x / ring.a_y - ratio0).abs() < 1e-9);
        }
    }

    #[test]
    fn contrail_flag_shrinks_core() {
        let m = mesh();
        let plain = RingCluster::new(3, false, 100.0, 50.0, &m);
        let contrail = RingCluster::new(3, true, 100.0, 50.0, &m);
        assert!(contrail.rings()[0].a_x < plain.rings()[0].a_x);
    }
}
