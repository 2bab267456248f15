//! Physical boundary conditions on the walls of the global domain.
//!
//! Both stencils are driven by a `GlobalBoundaryIterator`, which hands
//! them the boundary interior cell of each wall. The normal component on
//! the wall face lives in the ghost cell for a low wall and in the
//! interior cell for a high wall.

use eddy_core::{Face, Real};
use eddy_grid::{Cell, FlowField};
use eddy_stencil::{BoundaryStencil, Wall};

/// Velocity condition on one wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WallCondition {
    /// Prescribed wall velocity: no-slip for zero, a moving lid or an inflow
    /// otherwise.
    Dirichlet([Real; 3]),
    /// Zero-gradient outflow.
    Outflow,
}

impl Default for WallCondition {
    fn default() -> Self {
        Self::Dirichlet([0.0; 3])
    }
}

/// The ghost cell across `wall` from `cell` and the cell whose component
/// along the wall normal sits on the wall face.
fn wall_cells(wall: Wall, cell: Cell) -> (Cell, Cell) {
    let axis = wall.axis();
    if wall.face.is_low() {
        let ghost = cell.minus(axis);
        (ghost, ghost)
    } else {
        (cell.plus(axis), cell)
    }
}

// ── VelocityBoundaryStencil ────────────────────────────────────────

/// Writes the ghost velocities next to every global wall.
///
/// For a Dirichlet wall the normal component on the wall face is set to
/// the wall velocity and each tangential ghost component is mirrored so
/// the face average equals it. Where the boundary cell is an obstacle the
/// wall velocity is taken as zero. An outflow wall copies the adjacent
/// interior values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VelocityBoundaryStencil {
    walls: [WallCondition; 6],
}

impl VelocityBoundaryStencil {
    /// Conditions indexed by [`Face::index`].
    pub fn new(walls: [WallCondition; 6]) -> Self {
        Self { walls }
    }

    /// Condition on `face`.
    pub fn condition(&self, face: Face) -> WallCondition {
        self.walls[face.index()]
    }
}

impl BoundaryStencil for VelocityBoundaryStencil {
    fn apply_wall(&mut self, flow: &mut FlowField, wall: Wall, cell: Cell) {
        let axis = wall.axis();
        let a = axis.index();
        let (ghost, normal_at) = wall_cells(wall, cell);
        let u = &mut flow.velocity;
        match self.walls[wall.face.index()] {
            WallCondition::Dirichlet(w) => {
                let w = if flow.flags.is_fluid(cell.i, cell.j, cell.k) {
                    w
                } else {
                    [0.0; 3]
                };
                u[(normal_at, a)] = w[a];
                for &d in wall.dim.axes() {
                    if d != axis {
                        let dd = d.index();
                        u[(ghost, dd)] = 2.0 * w[dd] - u[(cell, dd)];
                    }
                }
            }
            WallCondition::Outflow => {
                let inner = if wall.face.is_low() {
                    cell
                } else {
                    cell.minus(axis)
                };
                u[(normal_at, a)] = u[(inner, a)];
                for &d in wall.dim.axes() {
                    if d != axis {
                        let dd = d.index();
                        u[(ghost, dd)] = u[(cell, dd)];
                    }
                }
            }
        }
    }
}

// ── FghBoundaryStencil ─────────────────────────────────────────────

/// Sets the intermediate momentum on every global wall face to the wall
/// velocity, so the pressure equation sees a homogeneous Neumann condition.
#[derive(Clone, Copy, Debug, Default)]
pub struct FghBoundaryStencil;

impl BoundaryStencil for FghBoundaryStencil {
    fn apply_wall(&mut self, flow: &mut FlowField, wall: Wall, cell: Cell) {
        let a = wall.axis().index();
        let (_, normal_at) = wall_cells(wall, cell);
        flow.fgh[(normal_at, a)] = flow.velocity[(normal_at, a)];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::Dim;
    use eddy_grid::{FlagField, ParallelTopology, Subdomain};
    use eddy_stencil::GlobalBoundaryIterator;

    fn cavity(lid: Real) -> VelocityBoundaryStencil {
        let mut walls = [WallCondition::default(); 6];
        walls[Face::Top.index()] = WallCondition::Dirichlet([lid, 0.0, 0.0]);
        VelocityBoundaryStencil::new(walls)
    }

    #[test]
    fn moving_lid_mirrors_tangential_ghost() {
        let sd = Subdomain::whole(Dim::Two, [4, 4, 1]).unwrap();
        let mut flow = FlowField::new(sd);
        flow.velocity.set(3, 5, 0, 0, 0.25);
        flow.velocity.set(3, 2, 0, 0, 0.5);
        let walls = GlobalBoundaryIterator::new(Dim::Two, &ParallelTopology::serial());
        walls.iterate(&mut cavity(1.0), &mut flow);
        // Top: ghost row 6 mirrors around the lid velocity.
        assert_eq!(flow.velocity.get(3, 6, 0, 0), 1.75);
        // Top wall face is v at the last interior row.
        assert_eq!(flow.velocity.get(3, 5, 0, 1), 0.0);
        // Bottom: no-slip ghost row 1.
        assert_eq!(flow.velocity.get(3, 1, 0, 0), -0.5);
    }

    #[test]
    fn inflow_sets_normal_component_on_low_wall() {
        let sd = Subdomain::whole(Dim::Two, [4, 4, 1]).unwrap();
        let mut flow = FlowField::new(sd);
        let mut walls = [WallCondition::default(); 6];
        walls[Face::Left.index()] = WallCondition::Dirichlet([1.0, 0.0, 0.0]);
        walls[Face::Right.index()] = WallCondition::Outflow;
        let mut s = VelocityBoundaryStencil::new(walls);
        assert_eq!(s.condition(Face::Right), WallCondition::Outflow);
        flow.velocity.set(4, 3, 0, 0, 0.75);
        flow.velocity.set(5, 3, 0, 1, 0.125);
        let it = GlobalBoundaryIterator::new(Dim::Two, &ParallelTopology::serial());
        it.iterate(&mut s, &mut flow);
        assert_eq!(flow.velocity.get(1, 3, 0, 0), 1.0);
        // Outflow copies the last interior face and the tangential value.
        assert_eq!(flow.velocity.get(5, 3, 0, 0), 0.75);
        assert_eq!(flow.velocity.get(6, 3, 0, 1), 0.125);
    }

    #[test]
    fn obstacle_cells_see_a_resting_wall() {
        let sd = Subdomain::whole(Dim::Two, [4, 4, 1]).unwrap();
        let flags = FlagField::from_geometry(&sd, |g| g[0] < 2 && g[1] < 2);
        let mut flow = FlowField::with_flags(sd, flags);
        let mut walls = [WallCondition::default(); 6];
        walls[Face::Left.index()] = WallCondition::Dirichlet([1.0, 0.0, 0.0]);
        let it = GlobalBoundaryIterator::new(Dim::Two, &ParallelTopology::serial());
        it.iterate(&mut VelocityBoundaryStencil::new(walls), &mut flow);
        assert_eq!(flow.velocity.get(1, 2, 0, 0), 0.0);
        assert_eq!(flow.velocity.get(1, 4, 0, 0), 1.0);
    }

    #[test]
    fn fgh_takes_wall_velocity() {
        let sd = Subdomain::whole(Dim::Three, [3, 3, 3]).unwrap();
        let mut flow = FlowField::new(sd);
        flow.velocity.fill(0.5);
        flow.fgh.fill(2.0);
        let it = GlobalBoundaryIterator::new(Dim::Three, &ParallelTopology::serial());
        it.iterate(&mut FghBoundaryStencil, &mut flow);
        assert_eq!(flow.fgh.get(1, 3, 3, 0), 0.5);
        assert_eq!(flow.fgh.get(4, 3, 3, 0), 0.5);
        assert_eq!(flow.fgh.get(3, 3, 4, 2), 0.5);
        assert_eq!(flow.fgh.get(3, 3, 3, 0), 2.0);
    }
}
