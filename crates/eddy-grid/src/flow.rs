//! The aggregate of every field one rank owns.

use crate::field::{ScalarField, VectorField};
use crate::flags::FlagField;
use crate::subdomain::Subdomain;

/// All same-shaped fields of one subdomain.
///
/// Fields are public so a stencil can read one field while writing
/// another. Ghost cells hold copies of neighbouring ranks' values and are
/// only current right after the matching exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    subdomain: Subdomain,
    /// Staggered velocity, one component per axis.
    pub velocity: VectorField,
    /// Cell-centred pressure.
    pub pressure: ScalarField,
    /// Intermediate momentum (F, G, H), staggered like velocity.
    pub fgh: VectorField,
    /// Right-hand side of the pressure Poisson equation.
    pub rhs: ScalarField,
    /// Obstacle flags.
    pub flags: FlagField,
    /// Eddy viscosity of the turbulence closure.
    pub viscosity: ScalarField,
    /// Prandtl mixing length.
    pub mixing_length: ScalarField,
    /// Distance to the nearest wall.
    pub wall_distance: ScalarField,
}

impl FlowField {
    /// Zero-initialised fields over `subdomain`, all cells fluid.
    pub fn new(subdomain: Subdomain) -> Self {
        let shape = subdomain.shape();
        Self::with_flags(subdomain, FlagField::fluid(shape))
    }

    /// Zero-initialised fields with precomputed obstacle flags.
    pub fn with_flags(subdomain: Subdomain, flags: FlagField) -> Self {
        let shape = subdomain.shape();
        let comps = subdomain.dim().count();
        Self {
            subdomain,
            velocity: VectorField::new(shape, comps),
            pressure: ScalarField::new(shape),
            fgh: VectorField::new(shape, comps),
            rhs: ScalarField::new(shape),
            flags,
            viscosity: ScalarField::new(shape),
            mixing_length: ScalarField::new(shape),
            wall_distance: ScalarField::new(shape),
        }
    }

    /// The subdomain these fields cover.
    pub fn subdomain(&self) -> &Subdomain {
        &self.subdomain
    }

    /// Padded extent along x.
    pub fn nx(&self) -> usize {
        self.pressure.nx()
    }

    /// Padded extent along y.
    pub fn ny(&self) -> usize {
        self.pressure.ny()
    }

    /// Padded extent along z.
    pub fn nz(&self) -> usize {
        self.pressure.nz()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::Dim;

    #[test]
    fn fields_share_shape() {
        let sd = Subdomain::whole(Dim::Three, [4, 5, 6]).unwrap();
        let flow = FlowField::new(sd);
        assert_eq!(flow.velocity.shape(), flow.pressure.shape());
        assert_eq!(flow.velocity.components(), 3);
        assert_eq!((flow.nx(), flow.ny(), flow.nz()), (7, 8, 9));
        assert_eq!(flow.flags.shape(), flow.rhs.shape());
    }
}
