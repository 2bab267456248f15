//! Core types and errors for the Eddy flow solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! floating-point precision alias, the spatial vocabulary shared by every
//! layer (dimension, axis, face), rank and step identifiers, and the error
//! taxonomy of the solver core.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod geometry;
pub mod id;
pub mod phase;

pub use error::{CommError, HaloError, SolverError, StepError};
pub use geometry::{Axis, Dim, Face};
pub use id::{Rank, StepId};
pub use phase::Phase;

/// Floating-point type used for every field value and every message.
///
/// Selected at build time: `f64` by default, `f32` with the
/// `single-precision` feature.
#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

/// Floating-point type used for every field value and every message.
///
/// Selected at build time: `f64` by default, `f32` with the
/// `single-precision` feature.
#[cfg(feature = "single-precision")]
pub type Real = f32;

/// Ghost layers below the interior on every axis.
///
/// The staggered layout keeps two cells on the low side: index 1 holds the
/// face shared with the low neighbour, index 0 the face behind it.
pub const GHOST_LOW: usize = 2;

/// Ghost layers above the interior on every axis.
pub const GHOST_HIGH: usize = 1;
