//! The quantities whose ghost layers are exchanged.

use std::fmt;

use eddy_core::{Dim, Face};

/// A field with ghost layers kept in sync across ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HaloKind {
    /// Cell-centred pressure.
    Pressure,
    /// Staggered velocity.
    Velocity,
    /// Cell-centred eddy viscosity of the turbulence closure.
    Viscosity,
}

impl HaloKind {
    /// Every kind, in index order.
    pub const ALL: [HaloKind; 3] = [Self::Pressure, Self::Velocity, Self::Viscosity];

    /// Stable lowercase name, used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pressure => "pressure",
            Self::Velocity => "velocity",
            Self::Viscosity => "viscosity",
        }
    }

    /// Position in [`ALL`](Self::ALL).
    pub fn index(self) -> usize {
        match self {
            Self::Pressure => 0,
            Self::Velocity => 1,
            Self::Viscosity => 2,
        }
    }

    /// Whether the field lives on cell faces rather than cell centres.
    pub fn is_staggered(self) -> bool {
        matches!(self, Self::Velocity)
    }

    /// Values per cell in a run of dimension `dim`.
    pub fn components(self, dim: Dim) -> usize {
        if self.is_staggered() {
            dim.count()
        } else {
            1
        }
    }

    /// Message tag of a buffer sent from `face`.
    ///
    /// Kinds occupy disjoint tag ranges and every face its own tag, so a
    /// receiver can never confuse two in-flight messages from one peer.
    pub fn tag(self, face: Face) -> u32 {
        (self.index() as u32 + 1) * 100 + face.index() as u32
    }
}

impl fmt::Display for HaloKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tags_are_unique_per_kind_and_face() {
        let mut seen = HashSet::new();
        for kind in HaloKind::ALL {
            for face in Face::ALL {
                assert!(seen.insert(kind.tag(face)));
            }
        }
        assert_eq!(HaloKind::Velocity.tag(Face::Top), 203);
    }

    #[test]
    fn component_counts() {
        assert_eq!(HaloKind::Pressure.components(Dim::Three), 1);
        assert_eq!(HaloKind::Velocity.components(Dim::Two), 2);
        assert_eq!(HaloKind::Velocity.components(Dim::Three), 3);
        assert_eq!(HaloKind::Viscosity.to_string(), "viscosity");
    }
}
