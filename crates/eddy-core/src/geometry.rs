//! Spatial vocabulary: [`Dim`], [`Axis`] and [`Face`].

use std::fmt;

/// Spatial dimension of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dim {
    /// Two-dimensional grid; the z extent is a single plane.
    Two,
    /// Three-dimensional grid.
    Three,
}

impl Dim {
    /// Number of spatial axes (2 or 3).
    pub fn count(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Build from an axis count, returning `None` for anything but 2 or 3.
    pub fn from_count(n: usize) -> Option<Self> {
        match n {
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }

    /// The axes present in this dimension, in x, y, z order.
    pub fn axes(self) -> &'static [Axis] {
        match self {
            Self::Two => &[Axis::X, Axis::Y],
            Self::Three => &[Axis::X, Axis::Y, Axis::Z],
        }
    }

    /// The faces present in this dimension, in exchange order.
    ///
    /// Faces are grouped by axis pair: left/right, bottom/top, front/back.
    pub fn faces(self) -> &'static [Face] {
        match self {
            Self::Two => &Face::ALL[..4],
            Self::Three => &Face::ALL,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.count())
    }
}

/// A coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis (left/right faces).
    X,
    /// The y axis (bottom/top faces).
    Y,
    /// The z axis (front/back faces).
    Z,
}

impl Axis {
    /// Zero-based index of the axis (x = 0).
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The face on the low side of this axis.
    pub fn low_face(self) -> Face {
        match self {
            Self::X => Face::Left,
            Self::Y => Face::Bottom,
            Self::Z => Face::Front,
        }
    }

    /// The face on the high side of this axis.
    pub fn high_face(self) -> Face {
        self.low_face().opposite()
    }
}

/// One of the six named walls of a box-shaped subdomain.
///
/// Left/right bound the x axis, bottom/top the y axis, front/back the z
/// axis. The low face of each axis comes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    /// Low x.
    Left,
    /// High x.
    Right,
    /// Low y.
    Bottom,
    /// High y.
    Top,
    /// Low z.
    Front,
    /// High z.
    Back,
}

impl Face {
    /// All six faces in exchange order.
    pub const ALL: [Face; 6] = [
        Face::Left,
        Face::Right,
        Face::Bottom,
        Face::Top,
        Face::Front,
        Face::Back,
    ];

    /// Axis normal to this face.
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Bottom | Self::Top => Axis::Y,
            Self::Front | Self::Back => Axis::Z,
        }
    }

    /// Whether this face bounds the low end of its axis.
    pub fn is_low(self) -> bool {
        matches!(self, Self::Left | Self::Bottom | Self::Front)
    }

    /// The face on the other side of the same axis.
    pub fn opposite(self) -> Face {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }

    /// Stable index in [`Face::ALL`] (0..6).
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Bottom => 2,
            Self::Top => 3,
            Self::Front => 4,
            Self::Back => 5,
        }
    }

    /// Whether the face exists in the given dimension.
    pub fn exists_in(self, dim: Dim) -> bool {
        dim == Dim::Three || self.axis() != Axis::Z
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Top => "top",
            Self::Front => "front",
            Self::Back => "back",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involution() {
        for face in Face::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.opposite(), face);
            assert_eq!(face.opposite().axis(), face.axis());
            assert_ne!(face.opposite().is_low(), face.is_low());
        }
    }

    #[test]
    fn faces_per_dimension() {
        assert_eq!(Dim::Two.faces().len(), 4);
        assert_eq!(Dim::Three.faces().len(), 6);
        assert!(Dim::Two.faces().iter().all(|f| f.axis() != Axis::Z));
        assert!(!Face::Front.exists_in(Dim::Two));
        assert!(Face::Back.exists_in(Dim::Three));
    }

    #[test]
    fn face_index_matches_all_order() {
        for (i, face) in Face::ALL.iter().enumerate() {
            assert_eq!(face.index(), i);
        }
    }

    #[test]
    fn axis_low_high_faces() {
        assert_eq!(Axis::X.low_face(), Face::Left);
        assert_eq!(Axis::X.high_face(), Face::Right);
        assert_eq!(Axis::Y.high_face(), Face::Top);
        assert_eq!(Axis::Z.low_face(), Face::Front);
    }

    #[test]
    fn dim_from_count() {
        assert_eq!(Dim::from_count(2), Some(Dim::Two));
        assert_eq!(Dim::from_count(3), Some(Dim::Three));
        assert_eq!(Dim::from_count(1), None);
        assert_eq!(Dim::Three.to_string(), "3D");
    }
}
