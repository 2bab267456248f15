//! Padded structured-grid storage for Eddy.
//!
//! A rank owns one [`Subdomain`] of the global grid. Every field over that
//! subdomain is stored densely over the padded extent: the interior plus
//! [`GHOST_LOW`](eddy_core::GHOST_LOW) ghost layers below and
//! [`GHOST_HIGH`](eddy_core::GHOST_HIGH) above on each active axis.
//!
//! # Layout
//!
//! - [`GridShape`]: padded extents and the x-fastest linear index
//! - [`ScalarField`] / [`VectorField`]: dense value arrays
//! - [`FlagField`]: per-cell obstacle bits
//! - [`FlowField`]: every field a rank needs for one simulation
//!
//! [`Decomposition`] splits the global grid into subdomains and yields the
//! [`ParallelTopology`] of each rank.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod decomposition;
pub mod error;
pub mod field;
pub mod flags;
pub mod flow;
pub mod meshsize;
pub mod subdomain;
pub mod topology;

pub use decomposition::Decomposition;
pub use error::GridError;
pub use field::{Cell, GridShape, ScalarField, VectorField};
pub use flags::FlagField;
pub use flow::FlowField;
pub use meshsize::{Meshsize, UniformMeshsize};
pub use subdomain::Subdomain;
pub use topology::ParallelTopology;
